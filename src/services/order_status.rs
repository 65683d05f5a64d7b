use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{sea_query::Expr, ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::order::{self, Entity as OrderEntity, OrderStatus},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Result of a status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusResponse {
    pub order_id: Uuid,
    pub order_number: String,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub version: i32,
    pub updated_at: DateTime<Utc>,
    /// Statuses the order can move to from here.
    pub next_statuses: Vec<OrderStatus>,
}

/// Drives orders along the status graph.
///
/// Every write is guarded on (id, status, version): two racing transitions
/// serialize at the database, and the loser sees zero affected rows and gets
/// an `InvalidTransition` against the status that actually won. A transition
/// is never silently overwritten.
#[derive(Clone)]
pub struct OrderStatusService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl OrderStatusService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Moves an order to `next`, checking the transition graph first.
    ///
    /// Terminal orders (completed, cancelled) reject every transition.
    #[instrument(skip(self), fields(order_id = %order_id, next = %next))]
    pub async fn transition_order(
        &self,
        order_id: Uuid,
        next: OrderStatus,
    ) -> Result<OrderStatusResponse, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let current = order.status;
        if !current.can_transition_to(next) {
            warn!(
                order_id = %order_id,
                from = %current,
                to = %next,
                "Rejected order status transition"
            );
            return Err(ServiceError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        let now = Utc::now();
        let result = OrderEntity::update_many()
            .col_expr(order::Column::Status, Expr::value(next))
            .col_expr(order::Column::Version, Expr::value(order.version + 1))
            .col_expr(order::Column::UpdatedAt, Expr::value(now))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::Status.eq(current))
            .filter(order::Column::Version.eq(order.version))
            .exec(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to apply status transition");
                ServiceError::DatabaseError(e)
            })?;

        if result.rows_affected == 0 {
            // Someone else moved the order between our read and our write.
            // Re-read and report the attempt against the status that won.
            let reloaded = OrderEntity::find_by_id(order_id)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
            warn!(
                order_id = %order_id,
                stored = %reloaded.status,
                attempted = %next,
                "Lost a racing status transition"
            );
            return Err(ServiceError::InvalidTransition {
                from: reloaded.status,
                to: next,
            });
        }

        info!(
            order_id = %order_id,
            from = %current,
            to = %next,
            "Order status updated"
        );

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id,
                old_status: current,
                new_status: next,
            })
            .await;

        Ok(OrderStatusResponse {
            order_id,
            order_number: order.order_number,
            old_status: current,
            new_status: next,
            version: order.version + 1,
            updated_at: now,
            next_statuses: next.next_statuses().to_vec(),
        })
    }

    /// Cancels an order. Allowed from any non-terminal status.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel_order(&self, order_id: Uuid) -> Result<OrderStatusResponse, ServiceError> {
        let response = self
            .transition_order(order_id, OrderStatus::Cancelled)
            .await?;

        self.event_sender
            .send_or_log(Event::OrderCancelled(order_id))
            .await;

        Ok(response)
    }
}
