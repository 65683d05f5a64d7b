//! Session cart behavior over HTTP: adding and merging lines, quantity
//! updates, clearing, and the catalog checks performed at add time.

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal_field, read_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn untouched_cart_is_empty() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Acme Market").await;

    let response = app
        .request(Method::GET, &format!("/api/v1/carts/{customer_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["customer_id"], customer_id.to_string());
    assert!(body["data"]["lines"].as_array().unwrap().is_empty());
    assert_eq!(body["data"]["total_items"], 0);
    assert_eq!(decimal_field(&body["data"]["total"]), dec!(0));
}

#[tokio::test]
async fn adding_merges_lines_and_keeps_the_price_snapshot() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    let customer_id = app.seed_customer("Acme Market").await;
    let product = app
        .seed_product(supplier_id, "Zeytinyağı 5L", dec!(10))
        .await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{customer_id}/items"),
            Some(json!({"product_id": product.id, "quantity": 3})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Quantity defaults to 1 when omitted; the add merges into the line.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{customer_id}/items"),
            Some(json!({"product_id": product.id})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let lines = body["data"]["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 4);
    assert_eq!(lines[0]["product_name"], "Zeytinyağı 5L");
    assert_eq!(decimal_field(&body["data"]["total"]), dec!(40));

    // A later catalog price change never reaches lines already in the cart.
    app.state
        .services
        .catalog
        .update_product(
            product.id,
            tanepro_api::services::catalog::UpdateProductInput {
                sale_price: Some(dec!(99)),
                ..Default::default()
            },
        )
        .await
        .expect("price update");

    let response = app
        .request(Method::GET, &format!("/api/v1/carts/{customer_id}"), None)
        .await;
    let body = read_json(response).await;
    assert_eq!(decimal_field(&body["data"]["total"]), dec!(40));
}

#[tokio::test]
async fn adding_unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Acme Market").await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{customer_id}/items"),
            Some(json!({"product_id": Uuid::new_v4(), "quantity": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn adding_inactive_product_is_rejected() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    let customer_id = app.seed_customer("Acme Market").await;
    let product = app.seed_product(supplier_id, "Eski Ürün", dec!(5)).await;

    app.state
        .services
        .catalog
        .update_product(
            product.id,
            tanepro_api::services::catalog::UpdateProductInput {
                status: Some(tanepro_api::entities::product::ProductStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .expect("status update");

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{customer_id}/items"),
            Some(json!({"product_id": product.id, "quantity": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("not available for ordering"),
        "{body}"
    );
}

#[tokio::test]
async fn adding_zero_quantity_is_rejected() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    let customer_id = app.seed_customer("Acme Market").await;
    let product = app.seed_product(supplier_id, "Un 25kg", dec!(8)).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{customer_id}/items"),
            Some(json!({"product_id": product.id, "quantity": 0})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn set_quantity_updates_removes_and_clamps() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    let customer_id = app.seed_customer("Acme Market").await;
    let product = app.seed_product(supplier_id, "Şeker 50kg", dec!(20)).await;

    app.request(
        Method::POST,
        &format!("/api/v1/carts/{customer_id}/items"),
        Some(json!({"product_id": product.id, "quantity": 3})),
    )
    .await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/carts/{customer_id}/items/{}", product.id),
            Some(json!({"quantity": 2})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["lines"][0]["quantity"], 2);

    // Quantities above the product's order cap are clamped, not rejected.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/carts/{customer_id}/items/{}", product.id),
            Some(json!({"quantity": 500})),
        )
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["lines"][0]["quantity"], 100);

    // Zero removes the line entirely.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/carts/{customer_id}/items/{}", product.id),
            Some(json!({"quantity": 0})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["data"]["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn set_quantity_for_a_product_not_in_the_cart_is_not_found() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    let customer_id = app.seed_customer("Acme Market").await;
    let product = app.seed_product(supplier_id, "Pirinç 10kg", dec!(12)).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/carts/{customer_id}/items/{}", product.id),
            Some(json!({"quantity": 2})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn clearing_drops_the_whole_cart() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    let customer_id = app.seed_customer("Acme Market").await;
    let product = app.seed_product(supplier_id, "Çay 1kg", dec!(15)).await;

    app.request(
        Method::POST,
        &format!("/api/v1/carts/{customer_id}/items"),
        Some(json!({"product_id": product.id, "quantity": 2})),
    )
    .await;

    let response = app
        .request(Method::DELETE, &format!("/api/v1/carts/{customer_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(Method::GET, &format!("/api/v1/carts/{customer_id}"), None)
        .await;
    let body = read_json(response).await;
    assert!(body["data"]["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn carts_are_isolated_per_customer() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    let buyer_one = app.seed_customer("Acme Market").await;
    let buyer_two = app.seed_customer("Bravo Bakkal").await;
    let product = app.seed_product(supplier_id, "Bal 1kg", dec!(30)).await;

    app.request(
        Method::POST,
        &format!("/api/v1/carts/{buyer_one}/items"),
        Some(json!({"product_id": product.id, "quantity": 2})),
    )
    .await;

    let response = app
        .request(Method::GET, &format!("/api/v1/carts/{buyer_two}"), None)
        .await;
    let body = read_json(response).await;
    assert!(body["data"]["lines"].as_array().unwrap().is_empty());
}
