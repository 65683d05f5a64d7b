use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::entities::order::OrderStatus;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event and logs instead of failing when the processing
    /// loop is gone. Events are advisory; no request outcome depends on
    /// one being delivered.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Account events
    AccountRegistered(Uuid),
    ProfileReconciled {
        identity_id: Uuid,
        fallback: bool,
    },
    ProfileUpdated(Uuid),

    // Cart events
    CartItemAdded {
        customer_id: Uuid,
        product_id: Uuid,
    },
    CartItemRemoved {
        customer_id: Uuid,
        product_id: Uuid,
    },
    CartCleared(Uuid),

    // Order events
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
    OrderCancelled(Uuid),

    // Catalog events
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    CategoryCreated(Uuid),

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

// Define a trait for handling events. Handlers implementing this trait will process events asynchronously.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: Event) -> Result<(), String>;
}

// Function to process incoming events and distribute them to registered event handlers.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        info!("Received event: {:?}", event);

        match event {
            Event::OrderCreated(order_id) => {
                if let Err(e) = handle_order_created(order_id).await {
                    error!(
                        "Failed to handle order created event: order_id={}, error={}",
                        order_id, e
                    );
                }
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(
                    "Order {} moved from '{}' to '{}'",
                    order_id, old_status, new_status
                );
            }
            Event::OrderCancelled(order_id) => {
                info!("Order cancelled: {}", order_id);
            }
            Event::ProfileReconciled {
                identity_id,
                fallback,
            } => {
                if fallback {
                    // The provisioning trigger missed its window; the
                    // fallback write covered for it. Worth surfacing.
                    warn!(
                        "Profile for identity {} was reconciled via fallback",
                        identity_id
                    );
                } else {
                    info!("Profile for identity {} reconciled", identity_id);
                }
            }
            _ => {
                info!("No specific handler for event: {:?}", event);
            }
        }
    }

    warn!("Event processing loop has ended");
}

// Handler functions for specific events
async fn handle_order_created(order_id: Uuid) -> Result<(), String> {
    // When an order lands, each supplier with lines in it needs to be
    // told. Delivery channels (mail, webhooks) hang off this point.
    info!("Processing order created event for order {}", order_id);

    Ok(())
}
