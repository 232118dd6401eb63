use std::collections::BTreeMap;

use async_trait::async_trait;
use common::SessionId;

use crate::Result;

/// The full contents of one cart: raw product-id string to quantity.
///
/// Ordered so checkout enumerates entries deterministically.
pub type CartContents = BTreeMap<String, i64>;

/// Keyed ephemeral cart storage.
///
/// Every operation is scoped by the composite `(tenant_slug, session_id)`
/// key. Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Increments the quantity for `product_id` in the session's cart
    /// (hash-increment semantics: the delta may be negative in principle)
    /// and returns the full cart contents afterward.
    ///
    /// The product id is not checked against the catalog here.
    async fn add_item(
        &self,
        tenant_slug: &str,
        session: &SessionId,
        product_id: &str,
        quantity: i64,
    ) -> Result<CartContents>;

    /// Returns the full cart mapping, or an empty mapping if the session
    /// has no cart.
    async fn get(&self, tenant_slug: &str, session: &SessionId) -> Result<CartContents>;

    /// Deletes the cart entirely. Clearing an absent cart is a no-op.
    async fn clear(&self, tenant_slug: &str, session: &SessionId) -> Result<()>;
}
