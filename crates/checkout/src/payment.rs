//! Payment gateway trait and simulated implementation.

use std::time::Duration;

use async_trait::async_trait;
use common::Money;

use crate::error::CheckoutError;

/// Payment method reserved for failure-path testing: the simulated
/// gateway always declines it. The value is part of the HTTP contract.
pub const FAIL_TEST_PAYMENT_METHOD: &str = "fail_test";

/// Trait for authorizing a charge during checkout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Authorizes a charge for the given amount.
    ///
    /// Must perform no durable writes; checkout relies on a declined
    /// payment leaving stock, cart, and orders untouched.
    async fn authorize(&self, payment_method: &str, amount: Money) -> Result<(), CheckoutError>;
}

/// Simulated gateway: a fixed processing delay, then a deterministic
/// accept for every method except the reserved failing one.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    /// Creates a gateway with the given artificial processing delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn authorize(&self, payment_method: &str, amount: Money) -> Result<(), CheckoutError> {
        tokio::time::sleep(self.delay).await;

        if payment_method == FAIL_TEST_PAYMENT_METHOD {
            tracing::info!(%amount, "simulated payment declined");
            return Err(CheckoutError::PaymentDeclined);
        }

        tracing::debug!(%amount, payment_method, "simulated payment authorized");
        Ok(())
    }
}
