//! Cart-to-order commit path: atomic placement, cart drainage, and the
//! order list filters.

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal_field, read_json, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

async fn add_to_cart(app: &TestApp, customer_id: Uuid, product_id: Uuid, quantity: i32) {
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{customer_id}/items"),
            Some(json!({"product_id": product_id, "quantity": quantity})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Commits the customer's current cart and returns the order payload.
async fn place_order(app: &TestApp, customer_id: Uuid) -> Value {
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({"customer_id": customer_id})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await["data"].take()
}

#[tokio::test]
async fn placing_an_order_commits_the_cart_and_clears_it() {
    let app = TestApp::new().await;
    let supplier_one = app.seed_supplier("Ege Gıda").await;
    let supplier_two = app.seed_supplier("Marmara Un").await;
    let customer_id = app.seed_customer("Acme Market").await;
    let product_a = app.seed_product(supplier_one, "Zeytinyağı 5L", dec!(10)).await;
    let product_b = app.seed_product(supplier_two, "Un 25kg", dec!(5)).await;

    add_to_cart(&app, customer_id, product_a.id, 3).await;
    add_to_cart(&app, customer_id, product_b.id, 2).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": customer_id,
                "notes": "Sabah teslimatı",
                "delivery_address": "Depo 4, Bornova",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    let order = &body["data"];
    assert_eq!(order["status"], "pending");
    assert_eq!(order["customer_id"], customer_id.to_string());
    assert_eq!(decimal_field(&order["total_amount"]), dec!(40));
    assert_eq!(order["version"], 1);
    let order_number = order["order_number"].as_str().unwrap();
    assert!(order_number.starts_with("ORD-"), "{order_number}");
    assert_eq!(order_number.len(), 12);
    assert_eq!(order_number, order_number.to_uppercase());
    assert_eq!(order["delivery_address"], "Depo 4, Bornova");

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let line_a = items
        .iter()
        .find(|i| i["product_id"] == product_a.id.to_string())
        .expect("line for product A");
    assert_eq!(line_a["quantity"], 3);
    assert_eq!(decimal_field(&line_a["total_price"]), dec!(30));

    // The session cart is drained once the order is durable.
    let response = app
        .request(Method::GET, &format!("/api/v1/carts/{customer_id}"), None)
        .await;
    let cart = read_json(response).await;
    assert!(cart["data"]["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn committing_an_empty_cart_is_rejected() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Acme Market").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({"customer_id": customer_id})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert!(
        body["message"].as_str().unwrap().contains("Cart is empty"),
        "{body}"
    );
}

#[tokio::test]
async fn failed_commit_writes_nothing_and_keeps_the_cart() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    let product = app.seed_product(supplier_id, "Zeytinyağı 5L", dec!(10)).await;

    // A session cart can exist for an id with no customer row behind it;
    // the commit is where that gets caught.
    let ghost_customer = Uuid::new_v4();
    add_to_cart(&app, ghost_customer, product.id, 2).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({"customer_id": ghost_customer})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Nothing was persisted.
    let response = app.request(Method::GET, "/api/v1/orders", None).await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["total"], 0);

    // The cart survives the failure for another attempt.
    let response = app
        .request(Method::GET, &format!("/api/v1/carts/{ghost_customer}"), None)
        .await;
    let cart = read_json(response).await;
    assert_eq!(cart["data"]["total_items"], 2);
}

#[tokio::test]
async fn fetching_an_order_returns_its_lines() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    let customer_id = app.seed_customer("Acme Market").await;
    let product = app.seed_product(supplier_id, "Çay 1kg", dec!(15)).await;

    add_to_cart(&app, customer_id, product.id, 4).await;
    let order = place_order(&app, customer_id).await;
    let order_id = order["id"].as_str().unwrap();

    let response = app
        .request(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["data"]["id"], *order_id);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_name"], "Çay 1kg");
    assert_eq!(decimal_field(&body["data"]["total_amount"]), dec!(60));
}

#[tokio::test]
async fn fetching_an_unknown_order_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{}", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_list_filters_by_customer_status_and_scope() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    let buyer_one = app.seed_customer("Acme Market").await;
    let buyer_two = app.seed_customer("Bravo Bakkal").await;
    let product = app.seed_product(supplier_id, "Un 25kg", dec!(5)).await;

    add_to_cart(&app, buyer_one, product.id, 1).await;
    let first = place_order(&app, buyer_one).await;
    add_to_cart(&app, buyer_one, product.id, 2).await;
    place_order(&app, buyer_one).await;
    add_to_cart(&app, buyer_two, product.id, 3).await;
    place_order(&app, buyer_two).await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/orders?customer_id={buyer_one}"),
            None,
        )
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["total"], 2);

    // Walk buyer_one's first order to completion; it becomes "past".
    let order_id = first["id"].as_str().unwrap();
    for status in ["confirmed", "preparing", "completed"] {
        let response = app
            .request(
                Method::PUT,
                &format!("/api/v1/orders/{order_id}/status"),
                Some(json!({"status": status})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/orders?customer_id={buyer_one}&scope=past"),
            None,
        )
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["orders"][0]["status"], "completed");

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/orders?customer_id={buyer_one}&scope=current"),
            None,
        )
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["orders"][0]["status"], "pending");

    let response = app
        .request(Method::GET, "/api/v1/orders?status=pending", None)
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn order_list_paginates_newest_first() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    let customer_id = app.seed_customer("Acme Market").await;
    let product = app.seed_product(supplier_id, "Şeker 50kg", dec!(20)).await;

    for quantity in 1..=3 {
        add_to_cart(&app, customer_id, product.id, quantity).await;
        place_order(&app, customer_id).await;
    }

    let response = app
        .request(Method::GET, "/api/v1/orders?limit=2&page=1", None)
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["per_page"], 2);
    assert_eq!(body["data"]["orders"].as_array().unwrap().len(), 2);

    let response = app
        .request(Method::GET, "/api/v1/orders?limit=2&page=2", None)
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["orders"].as_array().unwrap().len(), 1);

    // The order total is computed server-side from the lines.
    let totals: Vec<Decimal> = body["data"]["orders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| decimal_field(&o["total_amount"]))
        .collect();
    assert_eq!(totals, vec![dec!(20)]);
}
