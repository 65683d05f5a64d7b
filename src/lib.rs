//! TanePro API Library
//!
//! Core functionality for the TanePro wholesale portal backend: catalog,
//! session carts, order transactions, per-supplier fulfillment views, and
//! account provisioning.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
    pub carts: services::cart::SessionCarts,
}

// Common response wrappers
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// Full v1 API route map. Route groups mirror the handler modules; the
// assembled router is nested under /api/v1 by the binary.
pub fn api_v1_routes() -> Router<AppState> {
    let cart_routes = Router::new()
        .route(
            "/carts/:customer_id",
            get(handlers::carts::get_cart).delete(handlers::carts::clear_cart),
        )
        .route(
            "/carts/:customer_id/items",
            post(handlers::carts::add_cart_item),
        )
        .route(
            "/carts/:customer_id/items/:product_id",
            put(handlers::carts::set_cart_item_quantity),
        );

    let order_routes = Router::new()
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::commit_order),
        )
        .route("/orders/:id", get(handlers::orders::get_order))
        .route(
            "/orders/:id/status",
            put(handlers::orders::update_order_status),
        )
        .route("/orders/:id/cancel", post(handlers::orders::cancel_order));

    let fulfillment_routes = Router::new()
        .route(
            "/suppliers/:supplier_id/orders",
            get(handlers::fulfillment::list_supplier_orders),
        )
        .route(
            "/suppliers/:supplier_id/orders/:order_id",
            get(handlers::fulfillment::get_supplier_order),
        );

    let catalog_routes = Router::new()
        .route(
            "/products",
            get(handlers::catalog::list_products).post(handlers::catalog::create_product),
        )
        .route(
            "/products/:id",
            get(handlers::catalog::get_product).put(handlers::catalog::update_product),
        )
        .route(
            "/categories",
            get(handlers::catalog::list_categories).post(handlers::catalog::create_category),
        )
        .route("/brands", get(handlers::catalog::list_brands));

    let directory_routes = Router::new()
        .route("/profiles", get(handlers::directory::list_profiles))
        .route(
            "/profiles/:id",
            get(handlers::directory::get_profile).put(handlers::directory::update_profile),
        )
        .route("/suppliers", get(handlers::directory::list_suppliers))
        .route("/customers", get(handlers::directory::list_customers));

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(cart_routes)
        .merge(order_routes)
        .merge(fulfillment_routes)
        .merge(catalog_routes)
        .merge(directory_routes)
}

async fn api_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tanepro-api",
        "environment": state.config.environment,
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

/// Readiness probe: reports overall health from a live database ping.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn success_response_carries_data_and_timestamp() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, Some("ok"));

        let meta = response.meta.expect("metadata expected");
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn error_response_has_no_data() {
        let response = ApiResponse::<()>::error("oops".into());
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.message.as_deref(), Some("oops"));
    }
}
