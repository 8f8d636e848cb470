use axum::{Json, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::core::errors::LedgerViewError;
use crate::core::models::{AccountBalanceSheet, AccountId, GroupId};

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BalanceSheetResponse {
    pub group_id: GroupId,
    /// Net balance per account id; positive means the account is owed money
    #[schema(value_type = Object)]
    pub balances: BTreeMap<AccountId, Decimal>,
}

impl BalanceSheetResponse {
    pub fn new(group_id: GroupId, sheet: AccountBalanceSheet) -> Self {
        BalanceSheetResponse {
            group_id,
            balances: sheet.into_inner(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct WatchResponse {
    pub group_id: GroupId,
    pub handle_id: u64,
    pub holders: usize,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub group_id: GroupId,
    pub version: u64,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PublishResponse {
    pub delivered: usize,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub struct ApiError(pub LedgerViewError);

impl From<LedgerViewError> for ApiError {
    fn from(err: LedgerViewError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            LedgerViewError::Transport(_) => StatusCode::BAD_GATEWAY,
            LedgerViewError::TransactionNotFound { .. } | LedgerViewError::UnknownInterest { .. } => {
                StatusCode::NOT_FOUND
            }
            LedgerViewError::RefreshSuperseded(_) => StatusCode::CONFLICT,
            LedgerViewError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LedgerViewError::MalformedRecord(_) | LedgerViewError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
