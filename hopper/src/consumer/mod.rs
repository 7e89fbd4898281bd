//! The consuming half of a pipeline.
//!
//! A [Consumer] receives every [WorkItem] dequeued by a producer's workers. The provided
//! implementation, [BatchConsumer], accumulates payloads into a [Buffer](crate::buffer::Buffer)
//! and hands completed batches to a [Publish] implementation.

mod batch;

pub use batch::BatchConsumer;

use crate::work_item::WorkItem;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Handles work items dequeued by a producer.
#[async_trait]
pub trait Consumer<T>: Send + Sync {
    /// Handles a single work item.
    ///
    /// # Errors
    ///
    /// Returned errors are logged and counted by the calling worker, and never stop the worker.
    async fn consume(&self, item: WorkItem<T>) -> Result<()>;
}

#[async_trait]
impl<T, C> Consumer<T> for Arc<C>
where
    T: Send + 'static,
    C: Consumer<T> + ?Sized,
{
    async fn consume(&self, item: WorkItem<T>) -> Result<()> {
        (**self).consume(item).await
    }
}

/// The sink-facing extension point of a [BatchConsumer].
///
/// A batch either succeeds as a whole or is discarded as a whole: there is no partial success,
/// and failed batches are never retried.
#[async_trait]
pub trait Publish<T>: Send + Sync {
    /// Publishes a completed batch.
    ///
    /// Returns `Ok(true)` if the batch was delivered. Both `Ok(false)` and `Err` are treated as
    /// a failed delivery.
    async fn publish(&self, batch: Vec<T>) -> Result<bool>;
}

#[async_trait]
impl<T, P> Publish<T> for Arc<P>
where
    T: Send + 'static,
    P: Publish<T> + ?Sized,
{
    async fn publish(&self, batch: Vec<T>) -> Result<bool> {
        (**self).publish(batch).await
    }
}
