//! Domain models for the storefront tables.
//!
//! These are validated domain types, separate from the raw rows the
//! repositories read. Conversion failures surface as
//! `RepositoryError::DataCorruption`.

pub mod catalog;
pub mod order;
pub mod session;
pub mod user;

pub use catalog::{Category, Product};
pub use order::{NewOrderItem, Order, OrderItem};
pub use session::Session;
pub use user::{NewUser, User};
