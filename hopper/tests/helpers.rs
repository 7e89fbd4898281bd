use anyhow::Result;
use async_trait::async_trait;
use hopper::{
    buffer::SizedBuffer,
    config::{ConfigHandle, ConsumerConfig, ProducerConfig},
    consumer::{BatchConsumer, Publish},
    producer::BoundedQueueProducer,
};
use parking_lot::Mutex;
use std::{
    future::Future,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::Instant;

pub type TestConsumer<T> = BatchConsumer<SizedBuffer<T>, Arc<RecordingSink<T>>>;
pub type TestProducer<T> = BoundedQueueProducer<T, TestConsumer<T>>;

/// A sink that records every batch it receives, optionally failing the first few.
pub struct RecordingSink<T> {
    batches: Mutex<Vec<(Instant, Vec<T>)>>,
    failures: AtomicUsize,
}

impl<T: Clone> RecordingSink<T> {
    pub fn new() -> Arc<Self> {
        Self::failing(0)
    }

    pub fn failing(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(vec![]),
            failures: AtomicUsize::new(failures),
        })
    }

    pub fn batches(&self) -> Vec<Vec<T>> {
        self.batches
            .lock()
            .iter()
            .map(|(_, batch)| batch.clone())
            .collect()
    }

    pub fn published_at(&self) -> Vec<Instant> {
        self.batches.lock().iter().map(|(at, _)| *at).collect()
    }

    pub fn items(&self) -> Vec<T> {
        self.batches().into_iter().flatten().collect()
    }
}

#[async_trait]
impl<T> Publish<T> for RecordingSink<T>
where
    T: Clone + Send + 'static,
{
    async fn publish(&self, batch: Vec<T>) -> Result<bool> {
        self.batches.lock().push((Instant::now(), batch));

        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        Ok(!failed)
    }
}

pub struct TestPipeline<T> {
    pub producer: Arc<TestProducer<T>>,
    pub sink: Arc<RecordingSink<T>>,
}

impl<T> TestPipeline<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn build(batch_size: usize, config: impl Into<ConfigHandle<ProducerConfig>>) -> Self {
        Self::with_sink(batch_size, config, RecordingSink::new())
    }

    pub fn with_sink(
        batch_size: usize,
        config: impl Into<ConfigHandle<ProducerConfig>>,
        sink: Arc<RecordingSink<T>>,
    ) -> Self {
        let consumer = BatchConsumer::new(
            SizedBuffer::new(batch_size),
            sink.clone(),
            ConsumerConfig::new(),
        );
        let producer = BoundedQueueProducer::new(consumer, config).unwrap();

        Self {
            producer: Arc::new(producer),
            sink,
        }
    }
}

/// Polls `condition` until it holds, panicking if it does not within five seconds.
pub async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + Duration::from_secs(5);

    while !condition().await {
        assert!(Instant::now() < deadline, "condition not met within 5 seconds");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
