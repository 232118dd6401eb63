//! Checkout orchestration for the order-fulfillment pipeline.
//!
//! A checkout is one synchronous pass over several stores: validate the
//! session's cart against live stock, price it from authoritative catalog
//! data, run the simulated payment, commit the stock decrements, persist
//! the order, and clear the cart. Validation and payment are free of side
//! effects; everything after the payment step writes durably, and a
//! failure in that window is surfaced as a distinct consistency error
//! rather than retried or hidden.

pub mod error;
pub mod payment;
pub mod service;

pub use error::{AppliedDecrement, CheckoutError};
pub use payment::{FAIL_TEST_PAYMENT_METHOD, PaymentGateway, SimulatedGateway};
pub use service::{CheckoutReceipt, CheckoutRequest, CheckoutService};
