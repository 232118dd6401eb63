//! Durable persistence for the commerce backend: the product catalog and
//! the order collection.
//!
//! Both collections are exposed through async traits so the checkout
//! pipeline and the settlement worker stay independent of the backing
//! store. Two implementations are provided: an in-memory store used by the
//! default deployment and the test suites, and a PostgreSQL store.

pub mod error;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod product;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{InMemoryCatalog, InMemoryOrders};
pub use order::{Order, OrderItem, OrderStatus};
pub use postgres::{PostgresCatalog, PostgresOrders, run_migrations};
pub use product::Product;
pub use store::{OrderStore, ProductStore};
