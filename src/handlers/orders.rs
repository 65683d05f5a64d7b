use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::entities::order::OrderStatus;
use crate::errors::ServiceError;
use crate::services::order_status::OrderStatusResponse;
use crate::services::orders::{
    CommitOrderRequest, OrderFilter, OrderLineInput, OrderListResponse, OrderResponse, OrderScope,
};
use crate::{ApiResponse, AppState};

/// Order placement payload. The lines come from the buyer's session cart,
/// never from the request body.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_id: Uuid,
    pub notes: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_phone: Option<String>,
    pub delivery_email: Option<String>,
}

/// Query parameters for listing orders
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    pub limit: Option<u64>,
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub scope: Option<OrderScope>,
}

fn default_page() -> u64 {
    1
}

/// Status transition request
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Commit the buyer's session cart as a durable order.
///
/// Drains the cart: on success the session cart is dropped and the
/// response carries the committed order. An empty cart is rejected before
/// anything touches the database.
pub async fn commit_order(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ServiceError> {
    let cart = state.carts.snapshot(request.customer_id);
    if cart.is_empty() {
        return Err(ServiceError::ValidationError(
            "Cart is empty; add at least one product before placing an order".to_string(),
        ));
    }

    let lines: Vec<OrderLineInput> = cart
        .lines()
        .iter()
        .map(|line| OrderLineInput {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
        })
        .collect();

    let order = state
        .services
        .orders
        .commit_order(CommitOrderRequest {
            customer_id: request.customer_id,
            lines,
            notes: request.notes,
            delivery_address: request.delivery_address,
            delivery_phone: request.delivery_phone,
            delivery_email: request.delivery_email,
        })
        .await?;

    // The cart is only dropped once the order is durable; a failed commit
    // leaves the cart intact for another attempt.
    state.carts.clear(request.customer_id);

    info!(order_id = %order.id, customer_id = %request.customer_id, "Order placed from session cart");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// List orders with pagination and filtering
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<OrderListResponse>>, ServiceError> {
    let per_page = query
        .limit
        .unwrap_or(state.config.api_default_page_size as u64)
        .clamp(1, state.config.api_max_page_size as u64);

    let filter = OrderFilter {
        customer_id: query.customer_id,
        status: query.status,
        scope: query.scope,
    };

    let result = state
        .services
        .orders
        .list_orders(filter, query.page, per_page)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// Get a single order with its items
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Transition an order to the requested status.
///
/// Illegal edges and lost races both come back as a 409 conflict naming
/// the stored status.
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<OrderStatusResponse>>, ServiceError> {
    let transition = state
        .services
        .order_status
        .transition_order(id, request.status)
        .await?;

    Ok(Json(ApiResponse::success(transition)))
}

/// Cancel an order (allowed from any non-terminal status)
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderStatusResponse>>, ServiceError> {
    let transition = state.services.order_status.cancel_order(id).await?;
    Ok(Json(ApiResponse::success(transition)))
}
