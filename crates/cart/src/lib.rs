//! Ephemeral session-scoped shopping carts.
//!
//! A cart is a mapping of raw product-id strings to quantities, keyed by
//! `(tenant_slug, session_id)` so carts never leak across tenants or
//! sessions. Contents are never validated against the catalog here; bad
//! ids are only caught at checkout. Carts are a pure cache: entries expire
//! after a configurable idle TTL and no durability is promised.

pub mod error;
pub mod memory;
pub mod store;

pub use error::{CartError, Result};
pub use memory::InMemoryCartStore;
pub use store::{CartContents, CartStore};
