use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::product::ProductStatus;
use crate::errors::ServiceError;
use crate::events::Event;
use crate::services::cart::{Cart, CartLine};
use crate::{ApiResponse, AppState};

fn default_quantity() -> i32 {
    1
}

/// Add-to-cart request payload
#[derive(Debug, Deserialize, Validate)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Quantity update for one cart line; `0` removes the line.
#[derive(Debug, Deserialize, Validate)]
pub struct SetCartQuantityRequest {
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
}

/// Aggregate view of one buyer's session cart.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub customer_id: Uuid,
    pub lines: Vec<CartLine>,
    pub total: Decimal,
    pub total_items: i32,
}

impl CartResponse {
    fn from_cart(customer_id: Uuid, cart: Cart) -> Self {
        Self {
            customer_id,
            total: cart.total(),
            total_items: cart.total_items(),
            lines: cart.lines().to_vec(),
        }
    }
}

/// Get the current session cart for a buyer
pub async fn get_cart(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CartResponse>>, ServiceError> {
    let cart = state.carts.snapshot(customer_id);
    Ok(Json(ApiResponse::success(CartResponse::from_cart(
        customer_id,
        cart,
    ))))
}

/// Add a product to the session cart, merging into an existing line.
///
/// The product must exist and be active; the snapshot taken here (name,
/// sale price, order cap) is what the cart keeps from now on.
pub async fn add_cart_item(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Json(request): Json<AddCartItemRequest>,
) -> Result<Json<ApiResponse<CartResponse>>, ServiceError> {
    request.validate()?;

    let product = state.services.catalog.get_product(request.product_id).await?;
    if product.status != ProductStatus::Active {
        return Err(ServiceError::ValidationError(format!(
            "Product '{}' is not available for ordering",
            product.name
        )));
    }

    let cart = state.carts.with_cart(customer_id, |cart| {
        cart.add(&product, request.quantity);
        cart.clone()
    });

    state
        .event_sender
        .send_or_log(Event::CartItemAdded {
            customer_id,
            product_id: product.id,
        })
        .await;

    Ok(Json(ApiResponse::success(CartResponse::from_cart(
        customer_id,
        cart,
    ))))
}

/// Set the quantity of a line already in the cart; `0` removes it
pub async fn set_cart_item_quantity(
    State(state): State<AppState>,
    Path((customer_id, product_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<SetCartQuantityRequest>,
) -> Result<Json<ApiResponse<CartResponse>>, ServiceError> {
    request.validate()?;

    // Existence is checked under the same cart lock as the write, so a
    // concurrent removal cannot slip between check and update.
    let cart = state.carts.with_cart(customer_id, |cart| {
        if cart.lines().iter().all(|l| l.product_id != product_id) {
            return None;
        }
        cart.set_quantity(product_id, request.quantity);
        Some(cart.clone())
    });

    let Some(cart) = cart else {
        return Err(ServiceError::NotFound(format!(
            "Product {} is not in the cart",
            product_id
        )));
    };

    if request.quantity == 0 {
        state
            .event_sender
            .send_or_log(Event::CartItemRemoved {
                customer_id,
                product_id,
            })
            .await;
    }

    Ok(Json(ApiResponse::success(CartResponse::from_cart(
        customer_id,
        cart,
    ))))
}

/// Drop the buyer's session cart entirely
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.carts.clear(customer_id);

    state
        .event_sender
        .send_or_log(Event::CartCleared(customer_id))
        .await;

    Ok(StatusCode::NO_CONTENT)
}
