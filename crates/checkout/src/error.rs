//! Checkout error taxonomy.

use cart::CartError;
use common::ProductId;
use store::StoreError;
use thiserror::Error;

/// A stock decrement that was already committed when a later pipeline
/// step failed. Carried on consistency errors so the reconciliation path
/// knows exactly what to undo.
#[derive(Debug, Clone)]
pub struct AppliedDecrement {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
}

/// Errors that can occur during checkout.
///
/// Display strings for the client-facing variants are part of the HTTP
/// contract; the storefront parses the insufficient-stock message to
/// adjust the cart.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No session identifier was supplied with the request.
    #[error("Missing Session ID")]
    MissingSession,

    /// The session has no cart, or its cart has no entries.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart entry's product id does not parse as a valid identifier.
    #[error("Invalid Product IDs in cart")]
    MalformedProductId(String),

    /// Every cart entry resolved to a product that no longer exists.
    #[error("No valid items found")]
    NoValidItems,

    /// A cart entry asks for more units than the product has in stock.
    #[error("Insufficient stock for {product_name}. Available: {available}")]
    InsufficientStock {
        product_name: String,
        available: i64,
    },

    /// The payment gateway declined the charge. Nothing was written.
    #[error("Payment Failed")]
    PaymentDeclined,

    /// A stock decrement failed after earlier decrements had already been
    /// committed. Not retriable: the decrements in `applied` are live and
    /// there is no order to match them.
    #[error("Stock commit failed at product {product_id} after {} decrement(s): {source}", applied.len())]
    StockCommitFailed {
        applied: Vec<AppliedDecrement>,
        product_id: ProductId,
        #[source]
        source: StoreError,
    },

    /// The order insert failed after every stock decrement succeeded.
    /// Not retriable for the same reason as `StockCommitFailed`.
    #[error("Order persist failed after stock was decremented: {source}")]
    OrderPersistFailed {
        applied: Vec<AppliedDecrement>,
        #[source]
        source: StoreError,
    },

    /// The catalog could not be read.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The cart cache failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
}

impl CheckoutError {
    /// Machine-checkable error kind, stable across message changes.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::MissingSession => "missing_session",
            CheckoutError::EmptyCart => "empty_cart",
            CheckoutError::MalformedProductId(_) => "malformed_product_id",
            CheckoutError::NoValidItems => "no_valid_items",
            CheckoutError::InsufficientStock { .. } => "insufficient_stock",
            CheckoutError::PaymentDeclined => "payment_declined",
            CheckoutError::StockCommitFailed { .. } => "stock_commit_failed",
            CheckoutError::OrderPersistFailed { .. } => "order_persist_failed",
            CheckoutError::Store(_) => "store_error",
            CheckoutError::Cart(_) => "cart_error",
        }
    }

    /// True when the client can correct the request and retry safely:
    /// nothing durable was written before the failure.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            CheckoutError::MissingSession
                | CheckoutError::EmptyCart
                | CheckoutError::MalformedProductId(_)
                | CheckoutError::NoValidItems
                | CheckoutError::InsufficientStock { .. }
                | CheckoutError::PaymentDeclined
        )
    }

    /// True for the mid-pipeline failures that leave stores disagreeing
    /// and need an operator or reconciliation pass.
    pub fn is_consistency_failure(&self) -> bool {
        matches!(
            self,
            CheckoutError::StockCommitFailed { .. } | CheckoutError::OrderPersistFailed { .. }
        )
    }
}
