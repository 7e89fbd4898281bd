//! The producing half of a pipeline.
//!
//! Callers hand payloads to a [Producer], which admits or rejects them immediately. The
//! provided implementation, [BoundedQueueProducer], queues admitted items in a bounded queue
//! and runs a pool of workers that drain the queue into a [Consumer](crate::consumer::Consumer).

mod backoff;
mod bounded;
mod worker;

pub use bounded::BoundedQueueProducer;

use crate::work_item::WorkItem;

/// Non-blocking admission of work into a pipeline.
pub trait Producer<T>: Send + Sync {
    /// Attempts to enqueue `item` without blocking.
    ///
    /// Returns `false` if the item was rejected and dropped, e.g. because the producer is
    /// disabled, its queue is at capacity, or it has been stopped.
    fn try_enqueue(&self, item: WorkItem<T>) -> bool;

    /// Wraps `payload` in a [WorkItem] and attempts to enqueue it.
    fn try_enqueue_payload(&self, payload: T) -> bool {
        self.try_enqueue(WorkItem::Payload(payload))
    }
}
