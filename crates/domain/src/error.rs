//! Checkout error types.

use common::{CustomerId, OrderId, ProductId};
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by checkout and order reads.
///
/// Notification failures never appear here; they are logged by the
/// dispatcher and dropped.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request contained no items.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// A line asked for less than one unit.
    #[error("Invalid quantity {quantity} for product {product_id} (must be at least 1)")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    /// A line or order total does not fit in the money representation.
    #[error("Order total overflows at product {product_id}")]
    AmountOverflow { product_id: ProductId },

    /// The purchasing customer does not exist. Nothing was persisted.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// A requested product does not exist or is not for sale. Nothing was persisted.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The order store rejected the order header.
    #[error("Failed to create order: {0}")]
    OrderPersistenceFailure(#[source] StoreError),

    /// The order store rejected an order item; the whole order was rolled back.
    #[error("Failed to create order item {index}: {source}")]
    OrderItemPersistenceFailure {
        index: usize,
        #[source]
        source: StoreError,
    },

    /// No non-deleted order has this ID.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A store failed for a reason other than a missing record.
    #[error("{operation} failed: {source}")]
    StoreUnavailable {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl CheckoutError {
    /// Short, stable label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            CheckoutError::EmptyOrder => "empty_order",
            CheckoutError::InvalidQuantity { .. } => "invalid_quantity",
            CheckoutError::AmountOverflow { .. } => "amount_overflow",
            CheckoutError::CustomerNotFound(_) => "customer_not_found",
            CheckoutError::ProductNotFound(_) => "product_not_found",
            CheckoutError::OrderPersistenceFailure(_) => "order_persistence",
            CheckoutError::OrderItemPersistenceFailure { .. } => "order_item_persistence",
            CheckoutError::OrderNotFound(_) => "order_not_found",
            CheckoutError::StoreUnavailable { .. } => "store_unavailable",
        }
    }

    pub(crate) fn store(operation: &'static str) -> impl FnOnce(StoreError) -> CheckoutError {
        move |source| CheckoutError::StoreUnavailable { operation, source }
    }
}
