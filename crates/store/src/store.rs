use std::sync::Arc;

use async_trait::async_trait;
use common::{CustomerId, Money, OrderId, ProductId};

use crate::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewProduct, Order, OrderItem, PlaceOrderError,
    PlacedOrder, Product, Result,
};

/// Resolves customers by ID.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Returns the customer, or `NotFound` if it is absent or soft-deleted.
    async fn get_customer(&self, customer_id: CustomerId) -> Result<Customer>;

    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer>;
}

/// Read access to the product catalog and its live prices.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Returns the product, or `NotFound` if it is absent or soft-deleted.
    async fn get_product(&self, product_id: ProductId) -> Result<Product>;

    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    /// Changes the live price. Existing order items keep the price they were sold at.
    async fn update_price(&self, product_id: ProductId, price: Money) -> Result<Product>;
}

/// Durable storage for order headers and their items.
///
/// `create_order` and `create_order_item` are independent writes with no
/// transaction spanning them. `place_order` writes a header and all of its
/// items atomically and is what checkout uses.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> Result<Order>;

    async fn create_order_item(&self, item: NewOrderItem) -> Result<OrderItem>;

    /// Writes the header and items in one transaction.
    ///
    /// Items are written in the order given. On any failure the whole
    /// aggregate is rolled back.
    async fn place_order(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> std::result::Result<PlacedOrder, PlaceOrderError>;

    /// Returns the order, or `NotFound` if it is absent or soft-deleted.
    async fn get_order(&self, order_id: OrderId) -> Result<Order>;

    /// Returns the order's items in the order they were written.
    async fn list_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>>;

    /// Returns the customer's non-deleted orders, newest first.
    async fn list_orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>>;
}

pub type DynCustomerDirectory = Arc<dyn CustomerDirectory>;
pub type DynCatalog = Arc<dyn Catalog>;
pub type DynOrderStore = Arc<dyn OrderStore>;

/// Rejects an item set whose lines do not all belong to `order`.
pub(crate) fn validate_items_for_order(
    order: &NewOrder,
    items: &[NewOrderItem],
) -> std::result::Result<(), PlaceOrderError> {
    for (index, item) in items.iter().enumerate() {
        if item.order_id != order.order_id {
            return Err(PlaceOrderError::Item {
                index,
                source: crate::StoreError::Conflict(format!(
                    "item {} belongs to order {}, not {}",
                    item.order_item_id, item.order_id, order.order_id
                )),
            });
        }
    }
    Ok(())
}
