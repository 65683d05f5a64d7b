use crate::{
    db::DbPool,
    entities::customer::Entity as CustomerEntity,
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
        OrderStatus,
    },
    entities::order_item::{
        self, ActiveModel as OrderItemActiveModel, Entity as OrderItemEntity,
        Model as OrderItemModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

/// One order line as submitted for commit.
///
/// Carries the cart-time snapshot; the committed item stores exactly these
/// values. Prices are not re-checked against the live catalog at commit,
/// so a price drift between add-to-cart and commit is honored as quoted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "Product name is required"))]
    pub product_name: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Request/Response types for the order service
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommitOrderRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1, message = "Order must contain at least one line"))]
    pub lines: Vec<OrderLineInput>,
    pub notes: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_phone: Option<String>,
    pub delivery_email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_phone: Option<String>,
    pub delivery_email: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Bucket derived from order status: non-terminal orders are current,
/// terminal ones are past. Never stored, always computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderScope {
    Current,
    Past,
}

impl OrderScope {
    pub fn statuses(self) -> &'static [OrderStatus] {
        match self {
            OrderScope::Current => &[
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Preparing,
            ],
            OrderScope::Past => &[OrderStatus::Completed, OrderStatus::Cancelled],
        }
    }
}

/// Filter applied when listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub scope: Option<OrderScope>,
}

fn compute_total(lines: &[OrderLineInput]) -> Decimal {
    lines
        .iter()
        .map(|l| l.unit_price * Decimal::from(l.quantity))
        .sum()
}

/// Service committing carts as durable orders and reading them back.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    /// Creates a new order service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Commits a set of lines as an order header plus items in one
    /// transaction. Either the full order lands or nothing does; a failed
    /// item insert rolls the header back too.
    ///
    /// The total is computed here from the lines, never taken from the
    /// caller.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, line_count = request.lines.len()))]
    pub async fn commit_order(
        &self,
        request: CommitOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;

        for line in &request.lines {
            line.validate()?;
            if line.unit_price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Unit price for product {} cannot be negative",
                    line.product_id
                )));
            }
        }

        let db = &*self.db_pool;
        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let order_number = format!("ORD-{}", order_id.to_string()[..8].to_uppercase());
        let total_amount = compute_total(&request.lines);

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order commit");
            ServiceError::DatabaseError(e)
        })?;

        CustomerEntity::find_by_id(request.customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer {} not found", request.customer_id))
            })?;

        let order_active_model = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(order_number),
            customer_id: Set(request.customer_id),
            status: Set(OrderStatus::Pending),
            total_amount: Set(total_amount),
            notes: Set(request.notes),
            delivery_address: Set(request.delivery_address),
            delivery_phone: Set(request.delivery_phone),
            delivery_email: Set(request.delivery_email),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let order_model = order_active_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to insert order header");
            ServiceError::DatabaseError(e)
        })?;

        let mut item_models = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            let item = OrderItemActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(line.product_id),
                product_name: Set(line.product_name.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                total_price: Set(line.unit_price * Decimal::from(line.quantity)),
                created_at: Set(now),
            };

            let item_model = item.insert(&txn).await.map_err(|e| {
                error!(error = %e, order_id = %order_id, product_id = %line.product_id, "Failed to insert order item");
                ServiceError::DatabaseError(e)
            })?;
            item_models.push(item_model);
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            order_id = %order_id,
            customer_id = %request.customer_id,
            total_amount = %total_amount,
            "Order committed successfully"
        );

        self.event_sender.send_or_log(Event::OrderCreated(order_id)).await;

        Ok(self.model_to_response(order_model, item_models))
    }

    /// Retrieves an order with its items
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items = order
            .find_related(OrderItemEntity)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to fetch order items");
                ServiceError::DatabaseError(e)
            })?;

        Ok(self.model_to_response(order, items))
    }

    /// Lists orders with pagination, newest first
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let db = &*self.db_pool;
        let page = page.max(1);

        let mut query = OrderEntity::find();
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(order::Column::CustomerId.eq(customer_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status));
        }
        if let Some(scope) = filter.scope {
            query = query.filter(order::Column::Status.is_in(scope.statuses().iter().copied()));
        }

        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count orders");
            ServiceError::DatabaseError(e)
        })?;

        let orders = paginator.fetch_page(page - 1).await.map_err(|e| {
            error!(error = %e, page = page, per_page = per_page, "Failed to fetch orders page");
            ServiceError::DatabaseError(e)
        })?;

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let mut items_by_order: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
        if !order_ids.is_empty() {
            let items = OrderItemEntity::find()
                .filter(order_item::Column::OrderId.is_in(order_ids))
                .all(db)
                .await?;
            for item in items {
                items_by_order.entry(item.order_id).or_default().push(item);
            }
        }

        let order_responses: Vec<OrderResponse> = orders
            .into_iter()
            .map(|o| {
                let items = items_by_order.remove(&o.id).unwrap_or_default();
                self.model_to_response(o, items)
            })
            .collect();

        Ok(OrderListResponse {
            orders: order_responses,
            total,
            page,
            per_page,
        })
    }

    /// Converts an order model and its items to response format
    fn model_to_response(&self, model: OrderModel, items: Vec<OrderItemModel>) -> OrderResponse {
        OrderResponse {
            id: model.id,
            order_number: model.order_number,
            customer_id: model.customer_id,
            status: model.status,
            total_amount: model.total_amount,
            notes: model.notes,
            delivery_address: model.delivery_address,
            delivery_phone: model.delivery_phone,
            delivery_email: model.delivery_email,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
            items: items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    total_price: item.total_price,
                })
                .collect(),
        }
    }
}
