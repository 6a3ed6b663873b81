use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CustomerId, Money, OrderId, ProductId};
use tokio::sync::RwLock;

use crate::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewProduct, Order, OrderItem, PlaceOrderError,
    PlacedOrder, Product, Result, StoreError,
    store::{Catalog, CustomerDirectory, OrderStore, validate_items_for_order},
};

/// In-memory customer directory for testing and local runs.
#[derive(Clone, Default)]
pub struct InMemoryCustomerDirectory {
    customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
}

impl InMemoryCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a customer record as-is.
    pub async fn insert(&self, customer: Customer) {
        self.customers
            .write()
            .await
            .insert(customer.customer_id, customer);
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn get_customer(&self, customer_id: CustomerId) -> Result<Customer> {
        self.customers
            .read()
            .await
            .get(&customer_id)
            .filter(|c| !c.is_deleted)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Customer", customer_id))
    }

    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer> {
        let mut customers = self.customers.write().await;

        if customers.values().any(|c| c.email == customer.email) {
            return Err(StoreError::Conflict(format!(
                "customer email {} already registered",
                customer.email
            )));
        }

        let record = Customer {
            customer_id: CustomerId::new(),
            email: customer.email,
            first_name: customer.first_name,
            last_name: customer.last_name,
            phone: customer.phone,
            created_at: Utc::now(),
            updated_at: None,
            is_deleted: false,
        };
        customers.insert(record.customer_id, record.clone());
        Ok(record)
    }
}

/// In-memory product catalog for testing and local runs.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a product record as-is.
    pub async fn insert(&self, product: Product) {
        self.products
            .write()
            .await
            .insert(product.product_id, product);
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn get_product(&self, product_id: ProductId) -> Result<Product> {
        self.products
            .read()
            .await
            .get(&product_id)
            .filter(|p| !p.is_deleted)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Product", product_id))
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let mut products = self.products.write().await;

        if products.values().any(|p| p.sku == product.sku) {
            return Err(StoreError::Conflict(format!(
                "product sku {} already exists",
                product.sku
            )));
        }

        let record = Product {
            product_id: ProductId::new(),
            product_name: product.product_name,
            description: product.description,
            price: product.price,
            sku: product.sku,
            stock_quantity: product.stock_quantity,
            is_active: product.is_active,
            created_at: Utc::now(),
            updated_at: None,
            is_deleted: false,
        };
        products.insert(record.product_id, record.clone());
        Ok(record)
    }

    async fn update_price(&self, product_id: ProductId, price: Money) -> Result<Product> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&product_id)
            .filter(|p| !p.is_deleted)
            .ok_or_else(|| StoreError::not_found("Product", product_id))?;

        product.price = price;
        product.updated_at = Some(Utc::now());
        Ok(product.clone())
    }
}

#[derive(Default)]
struct OrderTables {
    orders: HashMap<OrderId, Order>,
    /// Insertion ordered.
    items: Vec<OrderItem>,
    fail_on_create_order: bool,
    fail_on_item_write: Option<usize>,
}

impl OrderTables {
    fn check_header(&self, order: &NewOrder) -> Result<()> {
        if self.fail_on_create_order {
            return Err(StoreError::Unavailable(
                "order header write rejected".to_string(),
            ));
        }
        if self.orders.contains_key(&order.order_id) {
            return Err(StoreError::Conflict(format!(
                "order {} already exists",
                order.order_id
            )));
        }
        if self
            .orders
            .values()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(StoreError::Conflict(format!(
                "order number {} already exists",
                order.order_number
            )));
        }
        Ok(())
    }

    fn check_item(&self, index: usize) -> Result<()> {
        match self.fail_on_item_write {
            Some(fail_at) if index >= fail_at => Err(StoreError::Unavailable(format!(
                "order item write {index} rejected"
            ))),
            _ => Ok(()),
        }
    }
}

fn header_record(order: NewOrder) -> Order {
    Order {
        order_id: order.order_id,
        customer_id: order.customer_id,
        order_number: order.order_number,
        status: order.status,
        total_amount: order.total_amount,
        created_at: Utc::now(),
        updated_at: None,
        is_deleted: false,
    }
}

fn item_record(item: NewOrderItem) -> OrderItem {
    OrderItem {
        order_item_id: item.order_item_id,
        order_id: item.order_id,
        product_id: item.product_id,
        quantity: item.quantity,
        unit_price: item.unit_price,
        total_price: item.total_price,
        created_at: Utc::now(),
        is_deleted: false,
    }
}

/// In-memory order store for testing and local runs.
///
/// Failure switches let tests exercise each persistence failure path.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    tables: Arc<RwLock<OrderTables>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every header write fail.
    pub async fn set_fail_on_create_order(&self, fail: bool) {
        self.tables.write().await.fail_on_create_order = fail;
    }

    /// Makes item writes fail.
    ///
    /// With `Some(n)`, `place_order` fails on the item at index `n` and
    /// `create_order_item` fails once `n` standalone items exist.
    pub async fn set_fail_on_item_write(&self, index: Option<usize>) {
        self.tables.write().await.fail_on_item_write = index;
    }

    /// Inserts or replaces an order header directly, bypassing validation.
    pub async fn insert(&self, order: Order) {
        self.tables
            .write()
            .await
            .orders
            .insert(order.order_id, order);
    }

    /// Returns the number of stored order headers.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }

    /// Returns the number of stored order items.
    pub async fn item_count(&self) -> usize {
        self.tables.read().await.items.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let mut tables = self.tables.write().await;
        tables.check_header(&order)?;

        let record = header_record(order);
        tables.orders.insert(record.order_id, record.clone());
        Ok(record)
    }

    async fn create_order_item(&self, item: NewOrderItem) -> Result<OrderItem> {
        let mut tables = self.tables.write().await;
        let index = tables.items.len();
        tables.check_item(index)?;

        if !tables.orders.contains_key(&item.order_id) {
            return Err(StoreError::not_found("Order", item.order_id));
        }

        let record = item_record(item);
        tables.items.push(record.clone());
        Ok(record)
    }

    async fn place_order(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> std::result::Result<PlacedOrder, PlaceOrderError> {
        validate_items_for_order(&order, &items)?;

        // Stage everything under one write lock; nothing is visible until all rows pass.
        let mut tables = self.tables.write().await;
        tables.check_header(&order).map_err(PlaceOrderError::Header)?;
        for index in 0..items.len() {
            tables
                .check_item(index)
                .map_err(|source| PlaceOrderError::Item { index, source })?;
        }

        let header = header_record(order);
        let written: Vec<OrderItem> = items.into_iter().map(item_record).collect();

        tables.orders.insert(header.order_id, header.clone());
        tables.items.extend(written.iter().cloned());

        Ok(PlacedOrder {
            order: header,
            items: written,
        })
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.tables
            .read()
            .await
            .orders
            .get(&order_id)
            .filter(|o| !o.is_deleted)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Order", order_id))
    }

    async fn list_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        Ok(self
            .tables
            .read()
            .await
            .items
            .iter()
            .filter(|i| i.order_id == order_id && !i.is_deleted)
            .cloned()
            .collect())
    }

    async fn list_orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id && !o.is_deleted)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}
