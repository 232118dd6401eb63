use async_trait::async_trait;
use common::{OrderId, ProductId, TenantId};

use crate::{Order, Product, Result};

/// Read/write access to product records.
///
/// All implementations must be thread-safe (Send + Sync). Tenancy is
/// carried by the product's own `tenant_id` field; lookups by id are not
/// additionally tenant-filtered.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Retrieves a product by id.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>>;

    /// Retrieves all products matching the given ids, in one batch.
    ///
    /// Ids with no matching product are simply absent from the result;
    /// the caller decides whether that is an error.
    async fn find_many_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>>;

    /// Lists all products belonging to a tenant.
    async fn list(&self, tenant_id: TenantId) -> Result<Vec<Product>>;

    /// Saves a product, overwriting the full document.
    async fn save(&self, product: &Product) -> Result<()>;

    /// Atomically decrements a product's stock, failing with
    /// `InsufficientStock` if the result would go negative.
    ///
    /// This is a single conditional write, not read-check-then-write, so
    /// concurrent checkouts against the same product cannot overdraw
    /// stock together. Returns the remaining stock after the decrement.
    async fn decrement_stock(&self, id: ProductId, quantity: i64) -> Result<i64>;
}

/// Persistence for orders: create once, point-read, and the single
/// conditional status transition used by settlement.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order.
    async fn create(&self, order: &Order) -> Result<()>;

    /// Retrieves an order by id.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Transitions an order to PAID unless it already is.
    ///
    /// Returns true if the write modified the order, false if the order
    /// does not exist or was already PAID (modified-count semantics, so
    /// repeated settlement of the same order is a no-op).
    async fn mark_paid(&self, id: OrderId) -> Result<bool>;
}
