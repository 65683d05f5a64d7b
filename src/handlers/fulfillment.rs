use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::fulfillment::SupplierOrderView;
use crate::{ApiResponse, AppState};

/// List every order carrying lines for this supplier, newest first
pub async fn list_supplier_orders(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<SupplierOrderView>>>, ServiceError> {
    let views = state
        .services
        .fulfillment
        .list_for_supplier(supplier_id)
        .await?;

    Ok(Json(ApiResponse::success(views)))
}

/// Project one order for one supplier.
///
/// An order that exists but has nothing for this supplier is a 404, same
/// as a missing order; the projection never shows another supplier's
/// lines or the order-wide total.
pub async fn get_supplier_order(
    State(state): State<AppState>,
    Path((supplier_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<SupplierOrderView>>, ServiceError> {
    let view = state
        .services
        .fulfillment
        .project_for_supplier(order_id, supplier_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Order {} has no lines for supplier {}",
                order_id, supplier_id
            ))
        })?;

    Ok(Json(ApiResponse::success(view)))
}
