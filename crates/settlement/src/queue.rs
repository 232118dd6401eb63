//! In-process settlement task queue.

use common::OrderId;
use store::OrderStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::worker::SettlementWorker;

/// Handle used to enqueue settlement work.
///
/// Cheap to clone; enqueueing returns immediately. The queue closes when
/// every handle has been dropped, which is what lets the worker loop
/// drain and exit on shutdown.
#[derive(Debug, Clone)]
pub struct SettlementQueue {
    tx: mpsc::UnboundedSender<OrderId>,
}

impl SettlementQueue {
    /// Spawns the worker loop and returns the queue plus its join handle.
    pub fn spawn<O>(worker: SettlementWorker<O>) -> (Self, SettlementQueueHandle)
    where
        O: OrderStore + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<OrderId>();

        let join = tokio::spawn(async move {
            while let Some(order_id) = rx.recv().await {
                worker.settle(order_id).await;
            }
            tracing::info!("settlement queue closed; worker exiting");
        });

        (Self { tx }, SettlementQueueHandle { join })
    }

    /// Enqueues settlement for an order. Returns false (and logs) if the
    /// worker is no longer running.
    pub fn enqueue(&self, order_id: OrderId) -> bool {
        match self.tx.send(order_id) {
            Ok(()) => {
                metrics::counter!("settlements_enqueued").increment(1);
                tracing::debug!(%order_id, "settlement enqueued");
                true
            }
            Err(_) => {
                tracing::warn!(%order_id, "settlement worker gone; enqueue dropped");
                false
            }
        }
    }
}

/// Join handle for the worker loop, for graceful shutdown.
#[derive(Debug)]
pub struct SettlementQueueHandle {
    join: JoinHandle<()>,
}

impl SettlementQueueHandle {
    /// Waits for the worker loop to finish draining.
    ///
    /// Only returns once every `SettlementQueue` clone has been dropped.
    pub async fn wait(self) {
        if let Err(err) = self.join.await {
            tracing::error!(error = %err, "settlement worker task panicked");
        }
    }

    /// Aborts the worker loop without draining.
    pub fn abort(&self) {
        self.join.abort();
    }
}
