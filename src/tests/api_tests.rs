use super::*;
use crate::api::handlers::{AppState, api_routes};
use crate::auth::jwt::JwtService;
use crate::core::models::User;
use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "test-secret";

async fn test_app() -> (Router, String) {
    let (service, ledger, push) = create_test_service();
    for (id, name) in [(ALICE, "Alice"), (BOB, "Bob"), (CAROL, "Carol")] {
        ledger.put_account(1, account(id, name)).await;
    }
    ledger
        .put_transaction(1, committed(1, TransactionType::Purchase, shopping_state()))
        .await;
    ledger
        .put_transaction(1, committed(2, TransactionType::Transfer, transfer_state(dec!(10), date(2024, 2, 1))))
        .await;

    let state = AppState::new(Arc::new(service), push, JwtService::new(SECRET.to_string()));
    (api_routes(state), token_for(7, "alice"))
}

fn token_for(id: i64, username: &str) -> String {
    JwtService::new(SECRET.to_string())
        .generate_token(
            &User {
                id,
                username: username.to_string(),
            },
            3600,
        )
        .unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_list_transactions_in_presentation_order() {
    let (app, token) = test_app().await;

    let (status, body) = send(&app, request(Method::GET, "/groups/1/transactions", Some(&token), None)).await;

    assert_eq!(status, StatusCode::OK);
    let transactions = body.as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["id"], 2);
    assert_eq!(transactions[0]["type"], "transfer");
    assert_eq!(transactions[1]["id"], 1);
    assert_eq!(transactions[1]["is_wip"], false);
    assert_eq!(transactions[1]["billed_at"], "2024-03-01");
    assert_eq!(decimal(&transactions[1]["account_balances"]["3"]["common_creditors"]), dec!(90));
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let (app, _token) = test_app().await;

    let (status, body) = send(&app, request(Method::GET, "/groups/1/transactions", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("Authorization"));
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let (app, _token) = test_app().await;
    let forged = JwtService::new("other-secret".to_string())
        .generate_token(
            &User {
                id: 7,
                username: "mallory".to_string(),
            },
            3600,
        )
        .unwrap();

    let (status, _) = send(&app, request(Method::GET, "/groups/1/balances", Some(&forged), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_transaction_by_id() {
    let (app, token) = test_app().await;

    let (status, body) = send(&app, request(Method::GET, "/groups/1/transactions/1", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "shopping");

    let (status, _) = send(&app, request(Method::GET, "/groups/1/transactions/42", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_balances() {
    let (app, token) = test_app().await;

    let (status, body) = send(&app, request(Method::GET, "/groups/1/balances", Some(&token), None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["group_id"], 1);
    assert_eq!(decimal(&body["balances"]["1"]), dec!(-23.75));
    assert_eq!(decimal(&body["balances"]["2"]), dec!(-66.25));
    assert_eq!(decimal(&body["balances"]["3"]), dec!(90));
}

#[tokio::test]
async fn test_watch_refresh_and_log() {
    let (app, token) = test_app().await;

    let (status, body) = send(&app, request(Method::POST, "/groups/1/watch", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["holders"], 1);
    let handle_id = body["handle_id"].as_u64().unwrap();

    let (status, body) = send(&app, request(Method::POST, "/groups/1/refresh", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], 1);

    let notification = json!({ "subscription_type": "transaction", "transaction_id": 2, "element_id": 1 });
    let (status, body) = send(
        &app,
        request(Method::POST, "/notifications", Some(&token), Some(notification)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], 1);

    let uri = format!("/groups/1/watch/{}", handle_id);
    let (status, body) = send(&app, request(Method::DELETE, &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["holders"], 0);

    let (status, body) = send(&app, request(Method::GET, "/groups/1/refresh_log", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions.first(), Some(&"SUBSCRIBED"));
    assert!(actions.contains(&"UNSUBSCRIBED"));
    assert!(actions.contains(&"SNAPSHOT_REPLACED"));
}

#[tokio::test]
async fn test_only_the_watcher_can_release_a_handle() {
    let (app, token) = test_app().await;
    let other = token_for(8, "bob");

    let (_, body) = send(&app, request(Method::POST, "/groups/1/watch", Some(&token), None)).await;
    let handle_id = body["handle_id"].as_u64().unwrap();
    let uri = format!("/groups/1/watch/{}", handle_id);

    let (status, body) = send(&app, request(Method::DELETE, &uri, Some(&other), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("No interest"));

    let unknown = format!("/groups/1/watch/{}", handle_id + 1);
    let (status, _) = send(&app, request(Method::DELETE, &unknown, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, request(Method::POST, "/groups/1/watch", Some(&other), None)).await;
    assert_eq!(body["holders"], 2);

    let (status, body) = send(&app, request(Method::DELETE, &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["holders"], 1);

    let (status, _) = send(&app, request(Method::DELETE, &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
