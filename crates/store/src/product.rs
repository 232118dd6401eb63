//! Product records owned by the catalog.

use common::{Money, ProductId, TenantId};
use serde::{Deserialize, Serialize};

/// A sellable product with its authoritative price and stock count.
///
/// Stock is non-negative by invariant; it is only lowered through the
/// store's conditional decrement, never by arithmetic on a stale read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub tenant_id: TenantId,
    pub name: String,
    pub price: Money,
    pub stock: i64,
}

impl Product {
    /// Creates a product with a fresh ID.
    pub fn new(tenant_id: TenantId, name: impl Into<String>, price: Money, stock: i64) -> Self {
        Self {
            id: ProductId::new(),
            tenant_id,
            name: name.into(),
            price,
            stock,
        }
    }

    /// Returns true if the requested quantity can be fulfilled from stock.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}
