//! Shared types for the storefront backend.

pub mod ids;
pub mod money;

pub use ids::{CustomerId, OrderId, OrderItemId, ProductId};
pub use money::{Money, ParseMoneyError};
