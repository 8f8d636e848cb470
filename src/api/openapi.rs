use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    api::models::{BalanceSheetResponse, ErrorResponse, PublishResponse, RefreshResponse, WatchResponse},
    core::models::{
        Account, AccountBalance, AccountType, BilledTransaction, EffectiveTransaction, InterestHandle, Notification,
        PurchaseItem,
        RefreshEntry, TransactionState, TransactionType,
    },
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::list_transactions,
        super::handlers::get_transaction,
        super::handlers::get_balances,
        super::handlers::watch_group,
        super::handlers::unwatch_group,
        super::handlers::refresh_group,
        super::handlers::get_refresh_log,
        super::handlers::publish_notification
    ),
    components(schemas(
        BalanceSheetResponse,
        WatchResponse,
        RefreshResponse,
        PublishResponse,
        ErrorResponse,
        Account,
        AccountType,
        AccountBalance,
        TransactionType,
        TransactionState,
        PurchaseItem,
        EffectiveTransaction,
        BilledTransaction,
        Notification,
        InterestHandle,
        RefreshEntry
    )),
    modifiers(&BearerAuth),
    info(
        title = "Splitbook API",
        description = "Per-viewer transaction views and account balances of shared expense groups",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
