use super::backoff::Backoff;
use super::bounded::Shared;
use crate::consumer::Consumer;
use crate::logging;
use crate::work_item::WorkItem;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::time::Instant;

/// A single queue-draining loop of a [BoundedQueueProducer](super::BoundedQueueProducer).
pub(crate) struct Worker<T, C> {
    id: usize,
    shared: Arc<Shared<T, C>>,
}

impl<T, C> Worker<T, C>
where
    T: Send + 'static,
    C: Consumer<T> + 'static,
{
    pub fn new(id: usize, shared: Arc<Shared<T, C>>) -> Self {
        Self { id, shared }
    }

    pub async fn run(self) {
        let mut backoff = Backoff::default();
        let mut last_flush = Instant::now();

        while !self.shared.cancellation_token.is_cancelled() {
            while let Some(item) = self.shared.try_dequeue() {
                if item.is_flush() {
                    last_flush = Instant::now();
                }

                self.deliver(item).await;
                backoff.reset();
            }

            let flush_timeout = self.shared.config.current().flush_timeout;

            if let Some(timeout) = flush_timeout {
                if last_flush.elapsed() >= timeout {
                    logging::producer::synthetic_flush(self.shared.name, self.id);
                    self.shared.stats.record_synthetic_flush();
                    self.deliver(WorkItem::Flush).await;
                    last_flush = Instant::now();
                }
            }

            let delay = backoff.next_delay(&self.shared.config.current().incremental_wait);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {},
                _ = self.shared.cancellation_token.cancelled() => break,
            }
        }

        self.drain().await;
        logging::producer::worker_exited(self.shared.name, self.id);
    }

    /// Delivers every item left in the closed queue, followed by a flush signal so that a
    /// partially filled batch is not stranded.
    async fn drain(&self) {
        while let Some(item) = self.shared.try_dequeue() {
            self.deliver(item).await;
        }

        self.deliver(WorkItem::Flush).await;
    }

    async fn deliver(&self, item: WorkItem<T>) {
        let is_payload = !item.is_flush();

        let result = AssertUnwindSafe(self.shared.consumer.consume(item))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(())) => {
                if is_payload {
                    self.shared.stats.record_delivered();
                }
            }
            Ok(Err(err)) => {
                self.shared.stats.record_delivery_failure();
                logging::producer::delivery_failed(self.shared.name, self.id, &err);
            }
            Err(_) => {
                self.shared.stats.record_delivery_failure();
                logging::producer::delivery_panicked(self.shared.name, self.id);
            }
        }
    }
}
