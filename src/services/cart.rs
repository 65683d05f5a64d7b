use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::product;

/// One cart line holding a product snapshot taken at add time.
///
/// `unit_price` and `max_order_quantity` are frozen copies of the product
/// fields; later catalog edits do not reach lines already in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub max_order_quantity: i32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// In-memory line-item accumulator for a single buyer session.
///
/// Never persisted: the cart lives for one session and is dropped on
/// commit or explicit clear. Lines keep insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` units of `product`, merging into an existing line.
    ///
    /// The merged quantity is capped at the product's `max_order_quantity`;
    /// adding past the cap silently keeps the line at the cap. Non-positive
    /// quantities are ignored.
    pub fn add(&mut self, product: &product::Model, quantity: i32) {
        if quantity <= 0 {
            return;
        }

        let cap = product.max_order_quantity;
        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => {
                line.quantity = (line.quantity + quantity).min(cap);
            }
            None => {
                self.lines.push(CartLine {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    unit_price: product.sale_price,
                    quantity: quantity.min(cap),
                    max_order_quantity: cap,
                });
            }
        }
    }

    /// Sets the quantity of an existing line; `0` removes the line.
    ///
    /// Quantities above the line's cap are clamped; a line never stores a
    /// zero or out-of-range quantity. Unknown products are ignored.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: i32) {
        if quantity <= 0 {
            self.lines.retain(|l| l.product_id != product_id);
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity.min(line.max_order_quantity);
        }
    }

    /// Removes a line regardless of quantity.
    pub fn remove(&mut self, product_id: Uuid) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total number of units across all lines.
    pub fn total_items(&self) -> i32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// All live session carts, keyed by customer id.
///
/// Each entry belongs to one buyer's session. Nothing here is persisted;
/// a restart or an explicit clear simply drops the cart.
#[derive(Clone, Default)]
pub struct SessionCarts {
    carts: Arc<DashMap<Uuid, Cart>>,
}

impl SessionCarts {
    pub fn new() -> Self {
        Self {
            carts: Arc::new(DashMap::new()),
        }
    }

    /// Runs `f` against the customer's cart, creating an empty one on the
    /// session's first touch. The entry stays locked for the duration.
    pub fn with_cart<T>(&self, customer_id: Uuid, f: impl FnOnce(&mut Cart) -> T) -> T {
        let mut entry = self.carts.entry(customer_id).or_default();
        f(entry.value_mut())
    }

    /// Owned copy of the customer's cart; empty for untouched sessions.
    pub fn snapshot(&self, customer_id: Uuid) -> Cart {
        self.carts
            .get(&customer_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Drops the session cart entirely.
    pub fn clear(&self, customer_id: Uuid) {
        self.carts.remove(&customer_id);
    }
}
