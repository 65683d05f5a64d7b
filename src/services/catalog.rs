use crate::{
    db::DbPool,
    entities::brand::{self, Entity as BrandEntity, Model as BrandModel},
    entities::category::{self, Entity as CategoryEntity, Model as CategoryModel},
    entities::product::{self, Entity as ProductEntity, Model as ProductModel, ProductStatus},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Input for creating a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProductInput {
    pub supplier_id: Uuid,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub shelf_price: Decimal,
    pub sale_price: Decimal,
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: i32,
    pub min_order_quantity: Option<i32>,
    pub max_order_quantity: Option<i32>,
    pub status: Option<ProductStatus>,
}

/// Input for updating a product. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductInput {
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub shelf_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub min_order_quantity: Option<i32>,
    pub max_order_quantity: Option<i32>,
    pub status: Option<ProductStatus>,
}

/// Filter applied when listing products.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub search: Option<String>,
    pub status: Option<ProductStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Input for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: Option<i32>,
}

/// Product/category/brand store. Suppliers write their own products through
/// here; buyers and the fulfillment projection only read.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Lists products newest first, with optional filters. Search matches
    /// name or description, contains-style.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        page: u64,
        per_page: u64,
    ) -> Result<ProductListResponse, ServiceError> {
        let db = &*self.db_pool;
        let page = page.max(1);

        let mut query = ProductEntity::find();
        if let Some(category_id) = filter.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(product::Column::SupplierId.eq(supplier_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(product::Column::Status.eq(status));
        }
        if let Some(ref search) = filter.search {
            query = query.filter(
                product::Column::Name
                    .contains(search)
                    .or(product::Column::Description.contains(search)),
            );
        }

        let paginator = query
            .order_by_desc(product::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page - 1).await?;

        Ok(ProductListResponse {
            products,
            total,
            page,
            per_page,
        })
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductModel, ServiceError> {
        ProductEntity::find_by_id(product_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Resolves a batch of product ids in one query. Ids that no longer
    /// exist are simply absent from the map; callers decide what a missing
    /// product means.
    #[instrument(skip(self, product_ids), fields(count = product_ids.len()))]
    pub async fn products_by_ids(
        &self,
        product_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ProductModel>, ServiceError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let products = ProductEntity::find()
            .filter(product::Column::Id.is_in(product_ids.iter().copied()))
            .all(&*self.db_pool)
            .await?;

        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(supplier_id = %input.supplier_id))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        input.validate()?;
        if input.sale_price < Decimal::ZERO || input.shelf_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Product prices cannot be negative".to_string(),
            ));
        }

        let min_order = input.min_order_quantity.unwrap_or(1);
        let max_order = input.max_order_quantity.unwrap_or(100);
        if min_order < 1 || max_order < min_order {
            return Err(ServiceError::ValidationError(
                "Order quantity bounds must satisfy 1 <= min <= max".to_string(),
            ));
        }

        let product_id = Uuid::new_v4();
        let now = Utc::now();

        let product = product::ActiveModel {
            id: Set(product_id),
            supplier_id: Set(input.supplier_id),
            category_id: Set(input.category_id),
            brand_id: Set(input.brand_id),
            name: Set(input.name),
            description: Set(input.description),
            shelf_price: Set(input.shelf_price),
            sale_price: Set(input.sale_price),
            stock_quantity: Set(input.stock_quantity),
            min_order_quantity: Set(min_order),
            max_order_quantity: Set(max_order),
            status: Set(input.status.unwrap_or(ProductStatus::Active)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let product = product.insert(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product_id))
            .await;

        info!("Created product: {}", product_id);
        Ok(product)
    }

    /// Update an existing product
    #[instrument(skip(self, input), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        if let Some(price) = input.sale_price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Product prices cannot be negative".to_string(),
                ));
            }
        }
        if let Some(price) = input.shelf_price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Product prices cannot be negative".to_string(),
                ));
            }
        }

        let product = self.get_product(product_id).await?;
        let mut active: product::ActiveModel = product.into();

        if let Some(category_id) = input.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(brand_id) = input.brand_id {
            active.brand_id = Set(Some(brand_id));
        }
        if let Some(name) = input.name {
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Product name is required".to_string(),
                ));
            }
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(shelf_price) = input.shelf_price {
            active.shelf_price = Set(shelf_price);
        }
        if let Some(sale_price) = input.sale_price {
            active.sale_price = Set(sale_price);
        }
        if let Some(stock_quantity) = input.stock_quantity {
            active.stock_quantity = Set(stock_quantity);
        }
        if let Some(min_order_quantity) = input.min_order_quantity {
            active.min_order_quantity = Set(min_order_quantity);
        }
        if let Some(max_order_quantity) = input.max_order_quantity {
            active.max_order_quantity = Set(max_order_quantity);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }

        active.updated_at = Set(Utc::now());

        let product = active.update(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(product_id))
            .await;

        info!("Updated product: {}", product_id);
        Ok(product)
    }

    /// Lists active categories in their configured display order.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        CategoryEntity::find()
            .filter(category::Column::IsActive.eq(true))
            .order_by_asc(category::Column::SortOrder)
            .all(&*self.db_pool)
            .await
            .map_err(Into::into)
    }

    /// Create a new category
    #[instrument(skip(self, input))]
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        input.validate()?;

        let category_id = Uuid::new_v4();
        let now = Utc::now();

        let cat = category::ActiveModel {
            id: Set(category_id),
            name: Set(input.name),
            description: Set(input.description),
            parent_id: Set(input.parent_id),
            sort_order: Set(input.sort_order.unwrap_or(0)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let category = cat.insert(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::CategoryCreated(category_id))
            .await;

        info!("Created category: {}", category_id);
        Ok(category)
    }

    /// Lists active brands alphabetically.
    #[instrument(skip(self))]
    pub async fn list_brands(&self) -> Result<Vec<BrandModel>, ServiceError> {
        BrandEntity::find()
            .filter(brand::Column::IsActive.eq(true))
            .order_by_asc(brand::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn create_input() -> CreateProductInput {
        CreateProductInput {
            supplier_id: Uuid::new_v4(),
            category_id: None,
            brand_id: None,
            name: "Sunflower oil 1L".to_string(),
            description: None,
            shelf_price: dec!(12.50),
            sale_price: dec!(9.90),
            stock_quantity: 200,
            min_order_quantity: None,
            max_order_quantity: None,
            status: None,
        }
    }

    #[test]
    fn create_input_accepts_minimal_fields() {
        assert!(create_input().validate().is_ok());
    }

    #[test]
    fn create_input_rejects_empty_name() {
        let input = CreateProductInput {
            name: String::new(),
            ..create_input()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn create_input_rejects_negative_stock() {
        let input = CreateProductInput {
            stock_quantity: -5,
            ..create_input()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn update_input_defaults_to_no_changes() {
        let input = UpdateProductInput::default();
        assert!(input.name.is_none());
        assert!(input.sale_price.is_none());
        assert!(input.status.is_none());
    }

    #[test]
    fn product_filter_defaults_to_unfiltered() {
        let filter = ProductFilter::default();
        assert!(filter.category_id.is_none());
        assert!(filter.supplier_id.is_none());
        assert!(filter.search.is_none());
        assert!(filter.status.is_none());
    }
}
