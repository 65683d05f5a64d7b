pub mod auth;
pub mod carts;
pub mod catalog;
pub mod directory;
pub mod fulfillment;
pub mod orders;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    catalog::CatalogService, directory::DirectoryService, fulfillment::FulfillmentService,
    identity::IdentityStore, order_status::OrderStatusService, orders::OrderService,
    provisioning::ProvisioningService,
};
use std::sync::Arc;
use std::time::Duration;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub directory: Arc<DirectoryService>,
    pub orders: Arc<OrderService>,
    pub order_status: Arc<OrderStatusService>,
    pub fulfillment: Arc<FulfillmentService>,
    pub provisioning: Arc<ProvisioningService>,
    pub identity: Arc<dyn IdentityStore>,
}

impl AppServices {
    /// Wires every service against one pool and one event channel.
    ///
    /// The identity store is passed in rather than built here so the
    /// binary can hand over a trigger-emulating store while tests plug in
    /// whatever store the scenario needs.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        identity_store: Arc<dyn IdentityStore>,
        reconcile_wait: Duration,
        reconcile_poll: Duration,
    ) -> Self {
        let catalog = Arc::new(CatalogService::new(db_pool.clone(), event_sender.clone()));
        let directory = Arc::new(DirectoryService::new(db_pool.clone(), event_sender.clone()));
        let orders = Arc::new(OrderService::new(db_pool.clone(), event_sender.clone()));
        let order_status = Arc::new(OrderStatusService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let fulfillment = Arc::new(FulfillmentService::new(db_pool.clone(), catalog.clone()));
        let provisioning = Arc::new(ProvisioningService::new(
            db_pool,
            identity_store.clone(),
            event_sender,
            reconcile_wait,
            reconcile_poll,
        ));

        Self {
            catalog,
            directory,
            orders,
            order_status,
            fulfillment,
            provisioning,
            identity: identity_store,
        }
    }
}
