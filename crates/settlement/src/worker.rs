//! The settlement unit of work.

use std::sync::Arc;
use std::time::Duration;

use common::OrderId;
use realtime::StatusChannel;
use store::{OrderStatus, OrderStore};

/// What one settlement invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// The order transitioned to PAID and the update was published.
    Settled,
    /// The order was missing or already settled; nothing was modified
    /// and nothing was published.
    Skipped,
}

/// Processes settlement for one order id at a time.
///
/// Best-effort by design: every outcome is logged and none is retried
/// here. Idempotency comes from the store's conditional transition, not
/// from any bookkeeping in the worker.
pub struct SettlementWorker<O: OrderStore> {
    orders: Arc<O>,
    channel: StatusChannel,
    processing_delay: Duration,
}

impl<O: OrderStore> SettlementWorker<O> {
    /// Creates a worker with the given simulated processing interval.
    pub fn new(orders: Arc<O>, channel: StatusChannel, processing_delay: Duration) -> Self {
        Self {
            orders,
            channel,
            processing_delay,
        }
    }

    /// Settles one order: wait, conditionally mark PAID, publish.
    #[tracing::instrument(skip(self))]
    pub async fn settle(&self, order_id: OrderId) -> SettlementOutcome {
        tokio::time::sleep(self.processing_delay).await;

        match self.orders.mark_paid(order_id).await {
            Ok(true) => {
                let reached = self.channel.publish(order_id, OrderStatus::Paid.as_str());
                metrics::counter!("settlements_processed").increment(1);
                tracing::info!(%order_id, reached, "order settled as PAID");
                SettlementOutcome::Settled
            }
            Ok(false) => {
                metrics::counter!("settlements_skipped").increment(1);
                tracing::info!(%order_id, "order not found or already paid");
                SettlementOutcome::Skipped
            }
            Err(err) => {
                metrics::counter!("settlements_skipped").increment(1);
                tracing::error!(%order_id, error = %err, "settlement write failed; not retrying");
                SettlementOutcome::Skipped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, ProductId, TenantId};
    use store::{InMemoryOrders, Order, OrderItem};

    fn pending_order() -> Order {
        Order::new(
            TenantId::new(),
            vec![OrderItem::new(
                ProductId::new(),
                "Widget",
                Money::from_cents(1000),
                1,
            )],
            Money::from_cents(1000),
            OrderStatus::Pending,
            "1 Main St",
            "bank_transfer",
        )
    }

    fn worker(orders: Arc<InMemoryOrders>, channel: StatusChannel) -> SettlementWorker<InMemoryOrders> {
        SettlementWorker::new(orders, channel, Duration::ZERO)
    }

    #[tokio::test]
    async fn settles_pending_order_and_publishes() {
        let orders = Arc::new(InMemoryOrders::new());
        let channel = StatusChannel::new();
        let order = pending_order();
        orders.create(&order).await.unwrap();

        let mut sub = channel.subscribe(order.id);
        let outcome = worker(orders.clone(), channel).settle(order.id).await;

        assert_eq!(outcome, SettlementOutcome::Settled);
        assert_eq!(sub.next().await.as_deref(), Some("PAID"));

        let loaded = orders.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn second_settlement_is_a_noop_without_a_duplicate_publish() {
        let orders = Arc::new(InMemoryOrders::new());
        let channel = StatusChannel::new();
        let order = pending_order();
        orders.create(&order).await.unwrap();

        let w = worker(orders.clone(), channel.clone());
        let mut sub = channel.subscribe(order.id);

        assert_eq!(w.settle(order.id).await, SettlementOutcome::Settled);
        assert_eq!(w.settle(order.id).await, SettlementOutcome::Skipped);

        assert_eq!(sub.next().await.as_deref(), Some("PAID"));
        let extra = tokio::time::timeout(Duration::from_millis(50), sub.next()).await;
        assert!(extra.is_err(), "no duplicate status event may be published");
    }

    #[tokio::test]
    async fn unknown_order_is_skipped_quietly() {
        let orders = Arc::new(InMemoryOrders::new());
        let channel = StatusChannel::new();

        let outcome = worker(orders, channel).settle(OrderId::new()).await;
        assert_eq!(outcome, SettlementOutcome::Skipped);
    }
}
