use crate::{
    api::models::*,
    auth::jwt::{Claims, JwtService},
    core::{
        errors::LedgerViewError,
        models::{
            BilledTransaction, CurrentUser, GroupId, InterestHandle, Notification, RefreshEntry, TransactionId, UserId,
        },
        services::LedgerViewService,
    },
    infrastructure::{
        cache::in_memory::InMemoryCache, ledger::in_memory::InMemoryLedger, logging::in_memory::InMemoryJournal,
        push::in_memory::InMemoryPushChannel,
    },
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Request, State},
    middleware::{self, Next},
    response::IntoResponse,
};
use http::header;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SplitbookService = LedgerViewService<InMemoryLedger, InMemoryPushChannel, InMemoryCache, InMemoryJournal>;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SplitbookService>,
    pub push: InMemoryPushChannel,
    pub jwt: JwtService,
    /// Owner of every interest handle issued through the API
    watchers: Arc<Mutex<HashMap<u64, UserId>>>,
}

impl AppState {
    pub fn new(service: Arc<SplitbookService>, push: InMemoryPushChannel, jwt: JwtService) -> Self {
        AppState {
            service,
            push,
            jwt,
            watchers: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

// Middleware to validate JWT
async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| LedgerViewError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| LedgerViewError::Unauthorized("Invalid Authorization header".to_string()))?;

    let claims = state.jwt.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/groups/{group_id}/transactions", axum::routing::get(list_transactions))
        .route(
            "/groups/{group_id}/transactions/{transaction_id}",
            axum::routing::get(get_transaction),
        )
        .route("/groups/{group_id}/balances", axum::routing::get(get_balances))
        .route("/groups/{group_id}/watch", axum::routing::post(watch_group))
        .route(
            "/groups/{group_id}/watch/{handle_id}",
            axum::routing::delete(unwatch_group),
        )
        .route("/groups/{group_id}/refresh", axum::routing::post(refresh_group))
        .route("/groups/{group_id}/refresh_log", axum::routing::get(get_refresh_log))
        .route("/notifications", axum::routing::post(publish_notification))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/transactions",
    params(("group_id" = i64, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Transactions seen by the caller, oldest first", body = [BilledTransaction]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 502, description = "Ledger unreachable", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Vec<BilledTransaction>>, ApiError> {
    let view = state.service.transactions_seen_by_user(group_id, &claims).await?;
    Ok(Json(view.transactions().to_vec()))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/transactions/{transaction_id}",
    params(
        ("group_id" = i64, Path, description = "Group ID"),
        ("transaction_id" = i64, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Transaction as seen by the caller", body = BilledTransaction),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Transaction not visible", body = ErrorResponse),
        (status = 502, description = "Ledger unreachable", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((group_id, transaction_id)): Path<(GroupId, TransactionId)>,
) -> Result<Json<BilledTransaction>, ApiError> {
    let transaction = state
        .service
        .transaction_by_id(group_id, &claims, transaction_id)
        .await?
        .ok_or(LedgerViewError::TransactionNotFound {
            group_id,
            transaction_id,
        })?;
    Ok(Json(transaction))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/balances",
    params(("group_id" = i64, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Net balance per account", body = BalanceSheetResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 502, description = "Ledger unreachable", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_balances(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<BalanceSheetResponse>, ApiError> {
    let sheet = state.service.account_balances(group_id, &claims).await?;
    Ok(Json(BalanceSheetResponse::new(group_id, sheet)))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/watch",
    params(("group_id" = i64, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Live updates enabled; keep the handle to stop them", body = WatchResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 502, description = "Subscription failed", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn watch_group(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<WatchResponse>, ApiError> {
    let user = claims.current_user()?;
    let mut watchers = state.watchers.lock().await;
    let handle = state.service.watch_group(group_id).await?;
    watchers.insert(handle.id, user.id);
    let holders = state.service.router().holders(group_id).await;
    Ok(Json(WatchResponse {
        group_id,
        handle_id: handle.id,
        holders,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{group_id}/watch/{handle_id}",
    params(
        ("group_id" = i64, Path, description = "Group ID"),
        ("handle_id" = u64, Path, description = "Handle returned when the group was watched")
    ),
    responses(
        (status = 200, description = "Interest released", body = WatchResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No such handle held by the caller", body = ErrorResponse),
        (status = 502, description = "Unsubscription failed", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn unwatch_group(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((group_id, handle_id)): Path<(GroupId, u64)>,
) -> Result<Json<WatchResponse>, ApiError> {
    let user = claims.current_user()?;
    let mut watchers = state.watchers.lock().await;
    if watchers.get(&handle_id) != Some(&user.id) {
        return Err(LedgerViewError::UnknownInterest { group_id, handle_id }.into());
    }
    let holders = state
        .service
        .unwatch_group(InterestHandle { group_id, id: handle_id })
        .await?;
    watchers.remove(&handle_id);
    Ok(Json(WatchResponse {
        group_id,
        handle_id,
        holders,
    }))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/refresh",
    params(("group_id" = i64, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Snapshot refreshed", body = RefreshResponse),
        (status = 409, description = "Refresh superseded", body = ErrorResponse),
        (status = 502, description = "Ledger unreachable", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn refresh_group(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let version = state.service.refresh_group(group_id).await?;
    Ok(Json(RefreshResponse { group_id, version }))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/refresh_log",
    params(("group_id" = i64, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Refresh journal of the group", body = [RefreshEntry])
    ),
    security(("Bearer" = []))
)]
pub async fn get_refresh_log(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Vec<RefreshEntry>>, ApiError> {
    let entries = state.service.refresh_log(group_id).await?;
    Ok(Json(entries))
}

#[utoipa::path(
    post,
    path = "/api/notifications",
    request_body = Notification,
    responses(
        (status = 200, description = "Notification delivered", body = PublishResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn publish_notification(
    State(state): State<AppState>,
    Json(notification): Json<Notification>,
) -> Result<Json<PublishResponse>, ApiError> {
    let delivered = state.push.publish(notification).await;
    Ok(Json(PublishResponse { delivered }))
}
