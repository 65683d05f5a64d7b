use crate::{
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity},
    entities::order::{self, Entity as OrderEntity, Model as OrderModel, OrderStatus},
    entities::order_item::{self, Entity as OrderItemEntity, Model as OrderItemModel},
    entities::product::Model as ProductModel,
    errors::ServiceError,
    services::catalog::CatalogService,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// One order as a single supplier sees it: only that supplier's lines, with
/// a subtotal over those lines alone. An owned read-side projection; editing
/// it cannot reach the stored order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierOrderView {
    pub order_id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub customer_id: Uuid,
    pub customer_company: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_phone: Option<String>,
    pub delivery_email: Option<String>,
    /// Sum over this supplier's lines only. Deliberately not the order's
    /// total_amount, which spans all suppliers.
    pub supplier_subtotal: Decimal,
    pub items: Vec<SupplierOrderItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierOrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Projects committed orders onto supplier-sided views.
///
/// Product ownership is resolved through the catalog at read time; an item
/// whose product has since vanished matches no supplier and silently drops
/// out of every projection.
#[derive(Clone)]
pub struct FulfillmentService {
    db_pool: Arc<DbPool>,
    catalog: Arc<CatalogService>,
}

impl FulfillmentService {
    pub fn new(db_pool: Arc<DbPool>, catalog: Arc<CatalogService>) -> Self {
        Self { db_pool, catalog }
    }

    /// Projects one order for one supplier.
    ///
    /// Returns `Ok(None)` when the order exists but carries no lines for
    /// this supplier; a missing order is `NotFound`.
    #[instrument(skip(self), fields(order_id = %order_id, supplier_id = %supplier_id))]
    pub async fn project_for_supplier(
        &self,
        order_id: Uuid,
        supplier_id: Uuid,
    ) -> Result<Option<SupplierOrderView>, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items = order.find_related(OrderItemEntity).all(db).await?;

        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let products = self.catalog.products_by_ids(&product_ids).await?;

        let customer_company = CustomerEntity::find_by_id(order.customer_id)
            .one(db)
            .await?
            .map(|c| c.company_name);

        Ok(project(
            &order,
            items,
            &products,
            customer_company,
            supplier_id,
        ))
    }

    /// Every order carrying lines for this supplier, newest first. Orders
    /// with nothing for the supplier are skipped, not shown empty.
    #[instrument(skip(self), fields(supplier_id = %supplier_id))]
    pub async fn list_for_supplier(
        &self,
        supplier_id: Uuid,
    ) -> Result<Vec<SupplierOrderView>, ServiceError> {
        let db = &*self.db_pool;

        let orders = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(db)
            .await?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .all(db)
            .await?;

        let mut product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        let products = self.catalog.products_by_ids(&product_ids).await?;

        let customer_ids: Vec<Uuid> = orders.iter().map(|o| o.customer_id).collect();
        let companies: HashMap<Uuid, String> = CustomerEntity::find()
            .filter(customer::Column::Id.is_in(customer_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.company_name))
            .collect();

        let mut items_by_order: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
        for item in items {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        let views = orders
            .iter()
            .filter_map(|o| {
                let order_items = items_by_order.remove(&o.id).unwrap_or_default();
                let company = companies.get(&o.customer_id).cloned();
                project(o, order_items, &products, company, supplier_id)
            })
            .collect();

        Ok(views)
    }
}

/// Filters an order's items down to one supplier's lines and builds the
/// view. `None` when nothing remains after filtering.
fn project(
    order: &OrderModel,
    items: Vec<OrderItemModel>,
    products: &HashMap<Uuid, ProductModel>,
    customer_company: Option<String>,
    supplier_id: Uuid,
) -> Option<SupplierOrderView> {
    let supplier_items: Vec<SupplierOrderItem> = items
        .into_iter()
        .filter(|item| {
            products
                .get(&item.product_id)
                .map(|p| p.supplier_id == supplier_id)
                .unwrap_or(false)
        })
        .map(|item| SupplierOrderItem {
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
        })
        .collect();

    if supplier_items.is_empty() {
        return None;
    }

    let supplier_subtotal = supplier_items.iter().map(|i| i.total_price).sum();

    Some(SupplierOrderView {
        order_id: order.id,
        order_number: order.order_number.clone(),
        status: order.status,
        customer_id: order.customer_id,
        customer_company,
        delivery_address: order.delivery_address.clone(),
        delivery_phone: order.delivery_phone.clone(),
        delivery_email: order.delivery_email.clone(),
        supplier_subtotal,
        items: supplier_items,
        created_at: order.created_at,
    })
}
