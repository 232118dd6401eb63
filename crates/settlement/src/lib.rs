//! Asynchronous order settlement.
//!
//! Settlement finalizes an order's payment outcome outside the request
//! that created it: wait out the simulated processing interval, flip the
//! order to PAID with a single conditional write, and publish the new
//! status to whoever is watching. The conditional write makes the whole
//! unit idempotent, so the worker tolerates being invoked any number of
//! times for the same order.
//!
//! The synchronous checkout path does not use this today (it creates
//! orders already PAID); the queue is the designed seam for a future
//! asynchronous payment gateway.

pub mod queue;
pub mod worker;

pub use queue::{SettlementQueue, SettlementQueueHandle};
pub use worker::{SettlementOutcome, SettlementWorker};
