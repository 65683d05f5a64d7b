// Ordering core
pub mod cart;
pub mod fulfillment;
pub mod order_status;
pub mod orders;

// Accounts and provisioning
pub mod identity;
pub mod provisioning;

// Catalog and account directory
pub mod catalog;
pub mod directory;
