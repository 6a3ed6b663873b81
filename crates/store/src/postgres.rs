use async_trait::async_trait;
use common::{CustomerId, Money, OrderId, OrderItemId, ProductId};
use sqlx::{PgExecutor, PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewProduct, Order, OrderItem, PlaceOrderError,
    PlacedOrder, Product, Result, StoreError,
    store::{Catalog, CustomerDirectory, OrderStore, validate_items_for_order},
};

const ORDER_COLUMNS: &str =
    "order_id, customer_id, order_number, status, total_amount_cents, created_at, updated_at, is_deleted";
const ORDER_ITEM_COLUMNS: &str = "order_item_id, order_id, product_id, quantity, unit_price_cents, total_price_cents, created_at, is_deleted";
const PRODUCT_COLUMNS: &str = "product_id, product_name, description, price_cents, sku, stock_quantity, is_active, created_at, updated_at, is_deleted";
const CUSTOMER_COLUMNS: &str =
    "customer_id, email, first_name, last_name, phone, created_at, updated_at, is_deleted";

/// PostgreSQL-backed implementation of every store trait over one pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_customer(row: PgRow) -> Result<Customer> {
        Ok(Customer {
            customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            phone: row.try_get("phone")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            is_deleted: row.try_get("is_deleted")?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            product_name: row.try_get("product_name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            sku: row.try_get("sku")?,
            stock_quantity: row.try_get("stock_quantity")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            is_deleted: row.try_get("is_deleted")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        Ok(Order {
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
            order_number: row.try_get("order_number")?,
            status: status.parse().map_err(StoreError::Decode)?,
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            is_deleted: row.try_get("is_deleted")?,
        })
    }

    fn row_to_order_item(row: PgRow) -> Result<OrderItem> {
        let quantity: i64 = row.try_get("quantity")?;
        Ok(OrderItem {
            order_item_id: OrderItemId::from_uuid(row.try_get::<Uuid, _>("order_item_id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            quantity: u32::try_from(quantity)
                .map_err(|_| StoreError::Decode(format!("quantity out of range: {quantity}")))?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            total_price: Money::from_cents(row.try_get("total_price_cents")?),
            created_at: row.try_get("created_at")?,
            is_deleted: row.try_get("is_deleted")?,
        })
    }

    async fn insert_order<'e, E: PgExecutor<'e>>(executor: E, order: &NewOrder) -> Result<Order> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (order_id, customer_id, order_number, status, total_amount_cents)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.order_id.as_uuid())
        .bind(order.customer_id.as_uuid())
        .bind(&order.order_number)
        .bind(order.status.as_str())
        .bind(order.total_amount.cents())
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Check if this is the order number uniqueness constraint
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_order_number_key")
            {
                return StoreError::Conflict(format!(
                    "order number {} already exists",
                    order.order_number
                ));
            }
            StoreError::Database(e)
        })?;

        Self::row_to_order(row)
    }

    async fn insert_order_item<'e, E: PgExecutor<'e>>(
        executor: E,
        item: &NewOrderItem,
    ) -> Result<OrderItem> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO order_items (order_item_id, order_id, product_id, quantity, unit_price_cents, total_price_cents)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORDER_ITEM_COLUMNS}
            "#
        ))
        .bind(item.order_item_id.as_uuid())
        .bind(item.order_id.as_uuid())
        .bind(item.product_id.as_uuid())
        .bind(i64::from(item.quantity))
        .bind(item.unit_price.cents())
        .bind(item.total_price.cents())
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return StoreError::not_found("Order", item.order_id);
            }
            StoreError::Database(e)
        })?;

        Self::row_to_order_item(row)
    }
}

fn unique_violation(entity: &'static str, value: &str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return StoreError::Conflict(format!("{entity} {value} already exists"));
        }
        StoreError::Database(e)
    }
}

#[async_trait]
impl CustomerDirectory for PostgresStore {
    async fn get_customer(&self, customer_id: CustomerId) -> Result<Customer> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE customer_id = $1 AND NOT is_deleted"
        ))
        .bind(customer_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_customer(row),
            None => Err(StoreError::not_found("Customer", customer_id)),
        }
    }

    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO customers (customer_id, email, first_name, last_name, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&customer.email)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_violation("customer email", &customer.email))?;

        Self::row_to_customer(row)
    }
}

#[async_trait]
impl Catalog for PostgresStore {
    async fn get_product(&self, product_id: ProductId) -> Result<Product> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1 AND NOT is_deleted"
        ))
        .bind(product_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_product(row),
            None => Err(StoreError::not_found("Product", product_id)),
        }
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (product_id, product_name, description, price_cents, sku, stock_quantity, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&product.product_name)
        .bind(&product.description)
        .bind(product.price.cents())
        .bind(&product.sku)
        .bind(product.stock_quantity)
        .bind(product.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_violation("product sku", &product.sku))?;

        Self::row_to_product(row)
    }

    async fn update_price(&self, product_id: ProductId, price: Money) -> Result<Product> {
        let row: Option<PgRow> = sqlx::query(&format!(
            r#"
            UPDATE products SET price_cents = $2, updated_at = now()
            WHERE product_id = $1 AND NOT is_deleted
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product_id.as_uuid())
        .bind(price.cents())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_product(row),
            None => Err(StoreError::not_found("Product", product_id)),
        }
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        Self::insert_order(&self.pool, &order).await
    }

    async fn create_order_item(&self, item: NewOrderItem) -> Result<OrderItem> {
        Self::insert_order_item(&self.pool, &item).await
    }

    async fn place_order(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> std::result::Result<PlacedOrder, PlaceOrderError> {
        validate_items_for_order(&order, &items)?;

        // Dropping the transaction without commit rolls it back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PlaceOrderError::Header(StoreError::Database(e)))?;

        let header = Self::insert_order(&mut *tx, &order)
            .await
            .map_err(PlaceOrderError::Header)?;

        let mut written = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let row = Self::insert_order_item(&mut *tx, item)
                .await
                .map_err(|source| PlaceOrderError::Item { index, source })?;
            written.push(row);
        }

        tx.commit()
            .await
            .map_err(|e| PlaceOrderError::Commit(StoreError::Database(e)))?;

        tracing::debug!(
            order_id = %header.order_id,
            items = written.len(),
            "order aggregate committed"
        );

        Ok(PlacedOrder {
            order: header,
            items: written,
        })
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1 AND NOT is_deleted"
        ))
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => Err(StoreError::not_found("Order", order_id)),
        }
    }

    async fn list_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_ITEM_COLUMNS} FROM order_items
            WHERE order_id = $1 AND NOT is_deleted
            ORDER BY item_seq ASC
            "#
        ))
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order_item).collect()
    }

    async fn list_orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE customer_id = $1 AND NOT is_deleted
            ORDER BY created_at DESC
            "#
        ))
        .bind(customer_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }
}
