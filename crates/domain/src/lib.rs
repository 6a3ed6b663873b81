//! Checkout core for the storefront.
//!
//! This crate provides:
//! - `CheckoutService`, which prices a cart from the live catalog and persists
//!   a confirmed order with its line items in one transaction
//! - `OrderNumberGenerator` for human-facing order numbers
//! - The best-effort notification boundary (`OrderNotifier`, `NotificationDispatcher`)
//! - `OrderStatusReader` for read-only order projections

pub mod checkout;
pub mod error;
pub mod notification;
pub mod order_number;
pub mod schema;
pub mod status;

pub use checkout::CheckoutService;
pub use error::CheckoutError;
pub use notification::{
    Channel, DispatchMode, InMemoryNotifier, NotificationDispatcher, NotificationError,
    OrderNotifier,
};
pub use order_number::{ORDER_NUMBER_PREFIX, OrderNumberGenerator, RandomOrderNumberGenerator};
pub use schema::{
    CheckoutItem, CheckoutRequest, OrderDetails, OrderItemResponse, OrderResponse,
    OrderStatusResponse,
};
pub use status::OrderStatusReader;
