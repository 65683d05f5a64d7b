use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::brand::Model as BrandModel;
use crate::entities::category::Model as CategoryModel;
use crate::entities::product::{Model as ProductModel, ProductStatus};
use crate::errors::ServiceError;
use crate::services::catalog::{
    CreateCategoryInput, CreateProductInput, ProductFilter, ProductListResponse,
    UpdateProductInput,
};
use crate::{ApiResponse, AppState};

/// Query parameters for listing products
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    pub limit: Option<u64>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub search: Option<String>,
    pub status: Option<ProductStatus>,
}

fn default_page() -> u64 {
    1
}

/// List products newest first, with optional filters
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<ProductListResponse>>, ServiceError> {
    let per_page = query
        .limit
        .unwrap_or(state.config.api_default_page_size as u64)
        .clamp(1, state.config.api_max_page_size as u64);

    let filter = ProductFilter {
        category_id: query.category_id,
        supplier_id: query.supplier_id,
        search: query.search,
        status: query.status,
    };

    let result = state
        .services
        .catalog
        .list_products(filter, query.page, per_page)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// Get a single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductModel>>, ServiceError> {
    let product = state.services.catalog.get_product(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> Result<(StatusCode, Json<ApiResponse<ProductModel>>), ServiceError> {
    let product = state.services.catalog.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

/// Update a product; absent fields are left untouched
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> Result<Json<ApiResponse<ProductModel>>, ServiceError> {
    let product = state.services.catalog.update_product(id, input).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// List active categories in display order
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryModel>>>, ServiceError> {
    let categories = state.services.catalog.list_categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryModel>>), ServiceError> {
    let category = state.services.catalog.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(category))))
}

/// List active brands alphabetically
pub async fn list_brands(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BrandModel>>>, ServiceError> {
    let brands = state.services.catalog.list_brands().await?;
    Ok(Json(ApiResponse::success(brands)))
}
