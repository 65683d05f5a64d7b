//! Sea-ORM entities backing the portal's relational schema.
//!
//! `identity` belongs to the SQL-backed identity store; `profile` plus the
//! `supplier`/`customer` role records form the account triple the provisioner
//! reconciles. Catalog tables (`category`, `brand`, `product`) feed the order
//! tables (`order`, `order_item`).

pub mod brand;
pub mod category;
pub mod customer;
pub mod identity;
pub mod order;
pub mod order_item;
pub mod product;
pub mod profile;
pub mod supplier;
