use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::customer::Model as CustomerModel;
use crate::entities::profile::{Model as ProfileModel, ProfileRole};
use crate::entities::supplier::Model as SupplierModel;
use crate::errors::ServiceError;
use crate::services::directory::UpdateProfileRequest;
use crate::{ApiResponse, AppState};

/// Query parameters for listing profiles
#[derive(Debug, Deserialize)]
pub struct ProfileListQuery {
    pub role: Option<ProfileRole>,
}

/// List profiles, optionally filtered by role
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ProfileListQuery>,
) -> Result<Json<ApiResponse<Vec<ProfileModel>>>, ServiceError> {
    let profiles = state.services.directory.list_profiles(query.role).await?;
    Ok(Json(ApiResponse::success(profiles)))
}

/// Get a single profile
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProfileModel>>, ServiceError> {
    let profile = state.services.directory.get_profile(id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Update a profile's contact fields; role and email are immutable here
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileModel>>, ServiceError> {
    let profile = state.services.directory.update_profile(id, request).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// List active suppliers ordered by company name
pub async fn list_suppliers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SupplierModel>>>, ServiceError> {
    let suppliers = state.services.directory.list_suppliers().await?;
    Ok(Json(ApiResponse::success(suppliers)))
}

/// List active customers ordered by company name
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CustomerModel>>>, ServiceError> {
    let customers = state.services.directory.list_customers().await?;
    Ok(Json(ApiResponse::success(customers)))
}
