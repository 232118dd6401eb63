use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::SessionId;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::{
    Result,
    store::{CartContents, CartStore},
};

/// Default idle TTL for abandoned carts.
pub const DEFAULT_CART_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CartKey {
    tenant: String,
    session: String,
}

impl CartKey {
    fn new(tenant_slug: &str, session: &SessionId) -> Self {
        Self {
            tenant: tenant_slug.to_string(),
            session: session.as_str().to_string(),
        }
    }
}

#[derive(Debug)]
struct CartEntry {
    items: CartContents,
    expires_at: Instant,
}

/// In-memory cart store with idle-TTL expiry.
///
/// Entries expire lazily: reads evict a stale cart instead of running a
/// background sweeper, and every write refreshes the expiry.
#[derive(Debug, Clone)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<CartKey, CartEntry>>>,
    ttl: Duration,
}

impl Default for InMemoryCartStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_CART_TTL)
    }
}

impl InMemoryCartStore {
    /// Creates a cart store with the default TTL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cart store whose entries expire after `ttl` of inactivity.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            carts: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns the number of live (unexpired) carts.
    pub async fn cart_count(&self) -> usize {
        let now = Instant::now();
        self.carts
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn add_item(
        &self,
        tenant_slug: &str,
        session: &SessionId,
        product_id: &str,
        quantity: i64,
    ) -> Result<CartContents> {
        let key = CartKey::new(tenant_slug, session);
        let now = Instant::now();
        let mut carts = self.carts.write().await;

        let entry = carts.entry(key).or_insert_with(|| CartEntry {
            items: CartContents::new(),
            expires_at: now + self.ttl,
        });

        // A cart that sat idle past its TTL starts over.
        if entry.expires_at <= now {
            entry.items.clear();
        }

        *entry.items.entry(product_id.to_string()).or_insert(0) += quantity;
        entry.expires_at = now + self.ttl;

        Ok(entry.items.clone())
    }

    async fn get(&self, tenant_slug: &str, session: &SessionId) -> Result<CartContents> {
        let key = CartKey::new(tenant_slug, session);
        // Write lock so expired entries can be evicted on read.
        let mut carts = self.carts.write().await;

        match carts.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(entry.items.clone()),
            Some(_) => {
                tracing::debug!(tenant = tenant_slug, session = %session, "evicting expired cart");
                carts.remove(&key);
                Ok(CartContents::new())
            }
            None => Ok(CartContents::new()),
        }
    }

    async fn clear(&self, tenant_slug: &str, session: &SessionId) -> Result<()> {
        let key = CartKey::new(tenant_slug, session);
        self.carts.write().await.remove(&key);
        Ok(())
    }
}
