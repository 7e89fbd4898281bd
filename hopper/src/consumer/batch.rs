use super::{Consumer, Publish};
use crate::buffer::Buffer;
use crate::config::{ConfigHandle, ConsumerConfig};
use crate::logging;
use crate::stats::{ConsumerStats, ConsumerStatsSnapshot};
use crate::work_item::WorkItem;
use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use std::ops::{Deref, DerefMut};
use std::panic::AssertUnwindSafe;
use tokio::sync::Mutex;

/// Orchestrates a single [Buffer], deciding when to accumulate, when to publish and when to
/// start a new batch.
///
/// Every producer worker shares the same `BatchConsumer`, so the whole
/// push, check, pop, publish and clear sequence runs under one exclusive lock. This
/// guarantees that no push is lost to a concurrent clear, and that a batch is never published
/// twice.
///
/// The buffer is cleared after every publish attempt, whether the publisher succeeded,
/// reported a failure, returned an error or panicked. Failed batches are logged and dropped.
#[derive(Debug)]
pub struct BatchConsumer<B, P> {
    name: &'static str,
    buffer: Mutex<B>,
    publisher: P,
    config: ConfigHandle<ConsumerConfig>,
    stats: ConsumerStats,
}

impl<B, P> BatchConsumer<B, P>
where
    B: Buffer,
    P: Publish<B::Output>,
{
    pub fn new(buffer: B, publisher: P, config: impl Into<ConfigHandle<ConsumerConfig>>) -> Self {
        Self {
            name: std::any::type_name::<B::Item>(),
            buffer: Mutex::new(buffer),
            publisher,
            config: config.into(),
            stats: ConsumerStats::default(),
        }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn stats(&self) -> ConsumerStatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns `true` if the buffer holds items that have not been published yet.
    pub async fn has_pending(&self) -> bool {
        self.buffer.lock().await.any()
    }

    async fn publish(&self, batch: Vec<B::Output>, flush: bool) {
        let size = batch.len();
        logging::consumer::publishing_batch(self.name, size, flush);

        let result = AssertUnwindSafe(self.publisher.publish(batch))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(true)) => {
                self.stats.record_published(size);
                logging::consumer::batch_published(self.name, size);
            }
            Ok(Ok(false)) => {
                self.stats.record_failed();
                logging::consumer::publish_rejected(self.name, size);
            }
            Ok(Err(err)) => {
                self.stats.record_failed();
                logging::consumer::publish_error(self.name, size, &err);
            }
            Err(_) => {
                self.stats.record_failed();
                logging::consumer::publish_panicked(self.name, size);
            }
        }
    }
}

#[async_trait]
impl<B, P> Consumer<B::Item> for BatchConsumer<B, P>
where
    B: Buffer + 'static,
    B::Item: Send + 'static,
    B::Output: Send + 'static,
    P: Publish<B::Output> + 'static,
{
    async fn consume(&self, item: WorkItem<B::Item>) -> Result<()> {
        let enabled = self.config.current().enabled;
        if !enabled {
            return Ok(());
        }

        let mut buffer = self.buffer.lock().await;

        let flush = match item {
            WorkItem::Flush if !buffer.any() => return Ok(()),
            WorkItem::Flush => true,
            WorkItem::Payload(payload) => {
                if !buffer.try_push(payload) {
                    self.stats.record_push_rejected();
                    logging::consumer::push_rejected(self.name);
                }

                if !buffer.is_full() || !buffer.any() {
                    return Ok(());
                }

                false
            }
        };

        let mut buffer = ClearOnDrop(&mut *buffer);
        let batch = buffer.pop();
        self.publish(batch, flush).await;

        Ok(())
    }
}

/// Clears the wrapped buffer when dropped, on every exit path.
struct ClearOnDrop<'a, B: Buffer>(&'a mut B);

impl<B: Buffer> Deref for ClearOnDrop<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.0
    }
}

impl<B: Buffer> DerefMut for ClearOnDrop<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.0
    }
}

impl<B: Buffer> Drop for ClearOnDrop<'_, B> {
    fn drop(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{EncodedBuffer, SizedBuffer};
    use crate::codecs::StringEncoder;
    use crate::config;
    use anyhow::bail;
    use parking_lot::Mutex as SyncMutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy)]
    enum Outcome {
        Succeed,
        Reject,
        Fail,
        Panic,
    }

    struct RecordingPublisher {
        batches: SyncMutex<Vec<Vec<&'static str>>>,
        outcome: SyncMutex<Outcome>,
    }

    impl RecordingPublisher {
        fn new(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                batches: SyncMutex::new(vec![]),
                outcome: SyncMutex::new(outcome),
            })
        }

        fn set_outcome(&self, outcome: Outcome) {
            *self.outcome.lock() = outcome;
        }

        fn batches(&self) -> Vec<Vec<&'static str>> {
            self.batches.lock().clone()
        }
    }

    #[async_trait]
    impl Publish<&'static str> for RecordingPublisher {
        async fn publish(&self, batch: Vec<&'static str>) -> Result<bool> {
            self.batches.lock().push(batch);
            let outcome = *self.outcome.lock();

            match outcome {
                Outcome::Succeed => Ok(true),
                Outcome::Reject => Ok(false),
                Outcome::Fail => bail!("sink unavailable"),
                Outcome::Panic => panic!("sink exploded"),
            }
        }
    }

    #[derive(Default)]
    struct BytesPublisher {
        sizes: SyncMutex<Vec<usize>>,
    }

    #[async_trait]
    impl Publish<bytes::Bytes> for BytesPublisher {
        async fn publish(&self, batch: Vec<bytes::Bytes>) -> Result<bool> {
            self.sizes.lock().push(batch.len());
            Ok(true)
        }
    }

    fn consumer(
        publisher: Arc<RecordingPublisher>,
    ) -> BatchConsumer<SizedBuffer<&'static str>, Arc<RecordingPublisher>> {
        BatchConsumer::new(SizedBuffer::new(3), publisher, ConsumerConfig::new())
    }

    async fn push_all<B, P>(consumer: &BatchConsumer<B, P>, items: &[&'static str])
    where
        B: Buffer<Item = &'static str> + 'static,
        B::Output: Send + 'static,
        P: Publish<B::Output> + 'static,
    {
        for item in items {
            consumer.consume(WorkItem::Payload(*item)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn publishes_once_buffer_is_full() {
        let publisher = RecordingPublisher::new(Outcome::Succeed);
        let consumer = consumer(publisher.clone());

        push_all(&consumer, &["a", "b"]).await;
        assert!(publisher.batches().is_empty());

        push_all(&consumer, &["c"]).await;
        assert_eq!(publisher.batches(), vec![vec!["a", "b", "c"]]);
        assert!(!consumer.has_pending().await);

        push_all(&consumer, &["d"]).await;
        assert_eq!(publisher.batches().len(), 1);
        assert!(consumer.has_pending().await);
    }

    #[tokio::test]
    async fn flush_publishes_partial_batch() {
        let publisher = RecordingPublisher::new(Outcome::Succeed);
        let consumer = consumer(publisher.clone());

        push_all(&consumer, &["a", "b"]).await;
        consumer.consume(WorkItem::Flush).await.unwrap();

        assert_eq!(publisher.batches(), vec![vec!["a", "b"]]);
        assert!(!consumer.has_pending().await);
    }

    #[tokio::test]
    async fn flush_on_empty_buffer_is_a_noop() {
        let publisher = RecordingPublisher::new(Outcome::Succeed);
        let consumer = consumer(publisher.clone());

        consumer.consume(WorkItem::Flush).await.unwrap();

        assert!(publisher.batches().is_empty());
        assert_eq!(consumer.stats(), ConsumerStatsSnapshot::default());
    }

    #[tokio::test]
    async fn clears_buffer_after_failed_publish() {
        for outcome in [Outcome::Reject, Outcome::Fail, Outcome::Panic] {
            let publisher = RecordingPublisher::new(outcome);
            let consumer = consumer(publisher.clone());

            push_all(&consumer, &["a", "b", "c"]).await;
            assert!(!consumer.has_pending().await, "{outcome:?}");

            publisher.set_outcome(Outcome::Succeed);
            push_all(&consumer, &["d"]).await;
            consumer.consume(WorkItem::Flush).await.unwrap();

            assert_eq!(
                publisher.batches(),
                vec![vec!["a", "b", "c"], vec!["d"]],
                "{outcome:?}"
            );

            let stats = consumer.stats();
            assert_eq!(stats.batches_failed, 1, "{outcome:?}");
            assert_eq!(stats.batches_published, 1, "{outcome:?}");
            assert_eq!(stats.items_published, 1, "{outcome:?}");
        }
    }

    #[tokio::test]
    async fn disabled_consumer_ignores_payloads_and_flushes() {
        let publisher = RecordingPublisher::new(Outcome::Succeed);
        let (updater, handle) = config::channel(ConsumerConfig::new());
        let consumer = BatchConsumer::new(SizedBuffer::new(3), publisher.clone(), handle);

        push_all(&consumer, &["a"]).await;
        updater.update(|config| config.enabled = false);

        push_all(&consumer, &["b", "c", "d"]).await;
        consumer.consume(WorkItem::Flush).await.unwrap();
        assert!(publisher.batches().is_empty());

        updater.update(|config| config.enabled = true);
        consumer.consume(WorkItem::Flush).await.unwrap();
        assert_eq!(publisher.batches(), vec![vec!["a"]]);
    }

    #[tokio::test]
    async fn counts_rejected_pushes() {
        struct RejectingBuffer;

        impl Buffer for RejectingBuffer {
            type Item = &'static str;
            type Output = &'static str;

            fn try_push(&mut self, _: &'static str) -> bool {
                false
            }

            fn is_full(&self) -> bool {
                false
            }

            fn pop(&mut self) -> Vec<&'static str> {
                vec![]
            }

            fn clear(&mut self) {}

            fn any(&self) -> bool {
                false
            }
        }

        let publisher = RecordingPublisher::new(Outcome::Succeed);
        let consumer = BatchConsumer::new(RejectingBuffer, publisher.clone(), ConsumerConfig::new());

        push_all(&consumer, &["a", "b"]).await;

        assert_eq!(consumer.stats().pushes_rejected, 2);
        assert!(publisher.batches().is_empty());
    }

    #[tokio::test]
    async fn full_but_empty_buffer_is_never_published() {
        struct SaturatedBuffer;

        impl Buffer for SaturatedBuffer {
            type Item = &'static str;
            type Output = &'static str;

            fn try_push(&mut self, _: &'static str) -> bool {
                false
            }

            fn is_full(&self) -> bool {
                true
            }

            fn pop(&mut self) -> Vec<&'static str> {
                vec![]
            }

            fn clear(&mut self) {}

            fn any(&self) -> bool {
                false
            }
        }

        let publisher = RecordingPublisher::new(Outcome::Succeed);
        let consumer = BatchConsumer::new(SaturatedBuffer, publisher.clone(), ConsumerConfig::new());

        push_all(&consumer, &["a", "b"]).await;

        assert!(publisher.batches().is_empty());
        assert_eq!(
            consumer.stats(),
            ConsumerStatsSnapshot {
                pushes_rejected: 2,
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn zero_byte_encoded_buffer_publishes_single_items() {
        let publisher = Arc::new(BytesPublisher::default());
        let consumer = BatchConsumer::new(
            EncodedBuffer::new(StringEncoder, 3).max_bytes(0),
            publisher.clone(),
            ConsumerConfig::new(),
        );

        consumer.consume(WorkItem::Payload("a".to_owned())).await.unwrap();
        consumer.consume(WorkItem::Payload("b".to_owned())).await.unwrap();

        assert_eq!(publisher.sizes.lock().clone(), vec![1, 1]);
        assert_eq!(consumer.stats().items_published, 2);
        assert_eq!(consumer.stats().pushes_rejected, 0);
    }
}
