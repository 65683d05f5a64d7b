//! Order status machine over HTTP: the forward path, rejected edges,
//! cancellation, and the race between two concurrent transitions.

mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tanepro_api::{entities::order::OrderStatus, errors::ServiceError};
use uuid::Uuid;

/// Seeds a customer with one product in the cart and commits it.
async fn seed_pending_order(app: &TestApp) -> Uuid {
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    let customer_id = app.seed_customer("Acme Market").await;
    let product = app.seed_product(supplier_id, "Zeytinyağı 5L", dec!(10)).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{customer_id}/items"),
            Some(json!({"product_id": product.id, "quantity": 2})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({"customer_id": customer_id})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    Uuid::parse_str(body["data"]["id"].as_str().unwrap()).unwrap()
}

async fn transition(app: &TestApp, order_id: Uuid, status: &str) -> (StatusCode, Value) {
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/orders/{order_id}/status"),
            Some(json!({"status": status})),
        )
        .await;
    let status_code = response.status();
    (status_code, read_json(response).await)
}

#[tokio::test]
async fn forward_path_walks_pending_to_completed() {
    let app = TestApp::new().await;
    let order_id = seed_pending_order(&app).await;

    let (status, body) = transition(&app, order_id, "confirmed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["old_status"], "pending");
    assert_eq!(body["data"]["new_status"], "confirmed");
    assert_eq!(body["data"]["version"], 2);

    let (status, body) = transition(&app, order_id, "preparing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], 3);

    let (status, body) = transition(&app, order_id, "completed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["new_status"], "completed");
    assert_eq!(body["data"]["version"], 4);
    // Terminal: nothing reachable from here.
    assert!(body["data"]["next_statuses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn skipping_a_stage_is_a_conflict_and_changes_nothing() {
    let app = TestApp::new().await;
    let order_id = seed_pending_order(&app).await;

    let (status, body) = transition(&app, order_id, "completed").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("pending"), "{message}");
    assert!(message.contains("completed"), "{message}");

    let response = app
        .request(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["version"], 1);
}

#[tokio::test]
async fn completed_orders_reject_all_transitions() {
    let app = TestApp::new().await;
    let order_id = seed_pending_order(&app).await;

    for status in ["confirmed", "preparing", "completed"] {
        let (code, _) = transition(&app, order_id, status).await;
        assert_eq!(code, StatusCode::OK);
    }

    let (code, _) = transition(&app, order_id, "pending").await;
    assert_eq!(code, StatusCode::CONFLICT);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/cancel"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn cancel_is_allowed_from_every_active_stage() {
    let app = TestApp::new().await;

    // Straight from pending.
    let order_id = seed_pending_order(&app).await;
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/cancel"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["new_status"], "cancelled");

    // From confirmed.
    let order_id = seed_pending_order(&app).await;
    transition(&app, order_id, "confirmed").await;
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/cancel"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // From preparing.
    let order_id = seed_pending_order(&app).await;
    transition(&app, order_id, "confirmed").await;
    transition(&app, order_id, "preparing").await;
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/cancel"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn cancelled_orders_are_terminal() {
    let app = TestApp::new().await;
    let order_id = seed_pending_order(&app).await;

    app.request(
        Method::POST,
        &format!("/api/v1/orders/{order_id}/cancel"),
        None,
    )
    .await;

    let (code, _) = transition(&app, order_id, "confirmed").await;
    assert_eq!(code, StatusCode::CONFLICT);
}

#[tokio::test]
async fn racing_transitions_have_exactly_one_winner() {
    let app = TestApp::new().await;
    let order_id = seed_pending_order(&app).await;
    let service = app.state.services.order_status.clone();

    let (first, second) = tokio::join!(
        service.transition_order(order_id, OrderStatus::Confirmed),
        service.transition_order(order_id, OrderStatus::Confirmed),
    );

    let (winner, loser) = match (first, second) {
        (Ok(win), Err(lose)) => (win, lose),
        (Err(lose), Ok(win)) => (win, lose),
        other => panic!("expected one winner and one loser, got {other:?}"),
    };

    assert_eq!(winner.new_status, OrderStatus::Confirmed);
    assert_eq!(winner.version, 2);
    // The loser's error names the status that actually won.
    assert_matches!(
        loser,
        ServiceError::InvalidTransition {
            from: OrderStatus::Confirmed,
            to: OrderStatus::Confirmed,
        }
    );

    let response = app
        .request(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["status"], "confirmed");
    assert_eq!(body["data"]["version"], 2);
}

#[tokio::test]
async fn transition_on_unknown_order_is_not_found() {
    let app = TestApp::new().await;

    let (code, _) = transition(&app, Uuid::new_v4(), "confirmed").await;
    assert_eq!(code, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_status_value_is_rejected_at_the_edge() {
    let app = TestApp::new().await;
    let order_id = seed_pending_order(&app).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/orders/{order_id}/status"),
            Some(json!({"status": "teleported"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
