use thiserror::Error;

/// Errors that can occur when interacting with the cart cache.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cache backend rejected the operation.
    #[error("Cart backend error: {0}")]
    Backend(String),
}

/// Result type for cart operations.
pub type Result<T> = std::result::Result<T, CartError>;
