//! Data stores consumed by checkout: the customer directory, the product
//! catalog and the order store.
//!
//! Each store is an async trait with an in-memory implementation (tests,
//! local runs) and a PostgreSQL implementation.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use error::{PlaceOrderError, Result, StoreError};
pub use memory::{InMemoryCatalog, InMemoryCustomerDirectory, InMemoryOrderStore};
pub use model::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewProduct, Order, OrderItem, OrderStatus,
    PlacedOrder, Product,
};
pub use postgres::PostgresStore;
pub use store::{
    Catalog, CustomerDirectory, DynCatalog, DynCustomerDirectory, DynOrderStore, OrderStore,
};
