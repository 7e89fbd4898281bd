use super::worker::Worker;
use super::Producer;
use crate::config::{ConfigHandle, ProducerConfig};
use crate::consumer::Consumer;
use crate::error::{PipelineError, Result};
use crate::logging;
use crate::service::Service;
use crate::stats::{ProducerStats, ProducerStatsSnapshot};
use crate::work_item::WorkItem;
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// State shared between a producer and its workers.
#[derive(Debug)]
pub(crate) struct Shared<T, C> {
    pub name: &'static str,
    pub consumer: C,
    pub config: ConfigHandle<ProducerConfig>,
    pub stats: ProducerStats,
    pub cancellation_token: CancellationToken,
    sender: RwLock<Option<mpsc::Sender<WorkItem<T>>>>,
    receiver: Mutex<mpsc::Receiver<WorkItem<T>>>,
    queued: AtomicUsize,
}

impl<T, C> Shared<T, C> {
    /// Dequeues the next immediately available item, if any.
    pub fn try_dequeue(&self) -> Option<WorkItem<T>> {
        let item = self.receiver.lock().try_recv().ok()?;
        self.queued.fetch_sub(1, Ordering::Relaxed);
        Some(item)
    }

    /// Drops the queue's only sender, so that no further items can be admitted. Items that
    /// were already admitted remain available to [try_dequeue](Self::try_dequeue).
    fn close(&self) {
        self.sender.write().take();
    }
}

#[derive(Debug)]
enum Lifecycle {
    Idle,
    Running(Vec<JoinHandle<()>>),
    Stopped,
}

/// A producer that admits work into a fixed-capacity queue, and drains it with a pool of
/// background workers.
///
/// Admission never blocks: [try_enqueue](Producer::try_enqueue) either places the item in the
/// queue or rejects it straight away, which is the only form of backpressure exerted on
/// callers.
///
/// Once [started](Service::start), `parallelism` workers repeatedly drain every available item
/// into the consumer, deliver a flush signal whenever the configured flush timeout elapses,
/// and otherwise sleep according to the configured
/// [IncrementalWait](crate::config::IncrementalWait) schedule.
///
/// [Stopping](Service::stop) the producer closes the queue to new items, lets workers deliver
/// what was already admitted followed by a final flush signal, and waits up to the configured
/// shutdown timeout for them to exit. Concurrent calls to `stop` all return once that shutdown
/// has completed. Dropping the producer signals workers to wind down
/// without waiting for them.
///
/// # Examples
/// ```
/// use anyhow::Result;
/// use async_trait::async_trait;
/// use hopper::{
///     buffer::SizedBuffer,
///     config::{ConsumerConfig, ProducerConfig},
///     consumer::{BatchConsumer, Publish},
///     producer::{BoundedQueueProducer, Producer},
///     Service,
/// };
/// use std::time::Duration;
///
/// struct Stdout;
///
/// #[async_trait]
/// impl Publish<String> for Stdout {
///     async fn publish(&self, batch: Vec<String>) -> Result<bool> {
///         println!("{batch:?}");
///         Ok(true)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let buffer = SizedBuffer::<String>::new(100);
///     let consumer = BatchConsumer::new(buffer, Stdout, ConsumerConfig::new());
///     let config = ProducerConfig::new()
///         .max_queue_size(1_000)
///         .parallelism(2)
///         .flush_timeout(Duration::from_millis(250));
///
///     let producer: BoundedQueueProducer<String, _> = BoundedQueueProducer::new(consumer, config)?;
///     producer.start()?;
///
///     producer.try_enqueue_payload("Hello, world!".to_owned());
///     producer.stop().await;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct BoundedQueueProducer<T, C> {
    shared: Arc<Shared<T, C>>,
    lifecycle: Mutex<Lifecycle>,
    stopped: CancellationToken,
    max_queue_size: usize,
    parallelism: usize,
}

impl<T, C> BoundedQueueProducer<T, C>
where
    T: Send + 'static,
    C: Consumer<T> + 'static,
{
    /// Creates a producer delivering to `consumer`.
    ///
    /// The queue capacity and worker count are taken from the configuration's current value,
    /// and are not affected by later updates.
    ///
    /// # Errors
    ///
    /// Returns [PipelineError::InvalidConfig] if the queue capacity or worker count is zero.
    pub fn new(consumer: C, config: impl Into<ConfigHandle<ProducerConfig>>) -> Result<Self> {
        let config = config.into();
        let (max_queue_size, parallelism) = {
            let current = config.current();
            (current.max_queue_size, current.parallelism)
        };

        if max_queue_size == 0 {
            return Err(PipelineError::InvalidConfig("max_queue_size must be at least 1"));
        }

        if parallelism == 0 {
            return Err(PipelineError::InvalidConfig("parallelism must be at least 1"));
        }

        let (tx, rx) = mpsc::channel(max_queue_size);

        let shared = Arc::new(Shared {
            name: std::any::type_name::<T>(),
            consumer,
            config,
            stats: ProducerStats::default(),
            cancellation_token: CancellationToken::new(),
            sender: RwLock::new(Some(tx)),
            receiver: Mutex::new(rx),
            queued: AtomicUsize::new(0),
        });

        Ok(Self {
            shared,
            lifecycle: Mutex::new(Lifecycle::Idle),
            stopped: CancellationToken::new(),
            max_queue_size,
            parallelism,
        })
    }

    pub fn consumer(&self) -> &C {
        &self.shared.consumer
    }

    pub fn stats(&self) -> ProducerStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Number of admitted items that have not been picked up by a worker yet.
    pub fn queued(&self) -> usize {
        self.shared.queued.load(Ordering::Relaxed)
    }

    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    fn reject(&self, reason: &str) -> bool {
        self.shared.stats.record_rejected();
        logging::producer::enqueue_rejected(self.shared.name, reason);
        false
    }
}

impl<T, C> Producer<T> for BoundedQueueProducer<T, C>
where
    T: Send + 'static,
    C: Consumer<T> + 'static,
{
    fn try_enqueue(&self, item: WorkItem<T>) -> bool {
        let enabled = self.shared.config.current().enabled;

        if !enabled {
            self.shared.stats.record_rejected();
            logging::producer::enqueue_disabled(self.shared.name);
            return false;
        }

        let sender = self.shared.sender.read();

        let Some(tx) = sender.as_ref() else {
            return self.reject("closed");
        };

        // Incremented before sending so a worker dequeuing first never underflows it.
        self.shared.queued.fetch_add(1, Ordering::Relaxed);

        let reason = match tx.try_send(item) {
            Ok(()) => {
                self.shared.stats.record_enqueued();
                return true;
            }
            Err(TrySendError::Full(_)) => "full",
            Err(TrySendError::Closed(_)) => "closed",
        };

        self.shared.queued.fetch_sub(1, Ordering::Relaxed);
        self.reject(reason)
    }
}

#[async_trait]
impl<T, C> Service for BoundedQueueProducer<T, C>
where
    T: Send + 'static,
    C: Consumer<T> + 'static,
{
    fn start(&self) -> Result<()> {
        let runtime = Handle::try_current().map_err(PipelineError::NoRuntime)?;
        let mut lifecycle = self.lifecycle.lock();

        match *lifecycle {
            Lifecycle::Running(_) => return Err(PipelineError::AlreadyStarted),
            Lifecycle::Stopped => return Err(PipelineError::Stopped),
            Lifecycle::Idle => {}
        }

        let handles = (0..self.parallelism)
            .map(|id| runtime.spawn(Worker::new(id, self.shared.clone()).run()))
            .collect();

        *lifecycle = Lifecycle::Running(handles);
        logging::producer::workers_started(self.shared.name, self.parallelism, self.max_queue_size);

        Ok(())
    }

    async fn stop(&self) {
        logging::producer::stopping(self.shared.name);

        self.shared.close();
        self.shared.cancellation_token.cancel();

        let previous = std::mem::replace(&mut *self.lifecycle.lock(), Lifecycle::Stopped);

        let mut handles = match previous {
            Lifecycle::Running(handles) => handles,
            Lifecycle::Idle => {
                self.stopped.cancel();
                return;
            }
            // Another call owns the workers; wait for it to finish with them.
            Lifecycle::Stopped => {
                self.stopped.cancelled().await;
                return;
            }
        };
        let _stopped = self.stopped.clone().drop_guard();

        let shutdown_timeout = self.shared.config.current().shutdown_timeout;
        let drained = tokio::time::timeout(shutdown_timeout, join_all(handles.iter_mut())).await;

        if drained.is_err() {
            let remaining = handles.iter().filter(|handle| !handle.is_finished()).count();
            logging::producer::shutdown_timed_out(self.shared.name, remaining);
            handles.iter().for_each(JoinHandle::abort);
        }

        logging::producer::stopped(self.shared.name);
    }
}

impl<T, C> Drop for BoundedQueueProducer<T, C> {
    /// When the producer is dropped, its queue is closed and a cancel signal is dispatched so
    /// that workers drain what is left and terminate.
    fn drop(&mut self) {
        self.shared.close();
        self.shared.cancellation_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result as AnyResult;
    use parking_lot::Mutex as SyncMutex;

    #[derive(Default)]
    struct Collector(SyncMutex<Vec<WorkItem<u32>>>);

    #[async_trait]
    impl Consumer<u32> for Collector {
        async fn consume(&self, item: WorkItem<u32>) -> AnyResult<()> {
            self.0.lock().push(item);
            Ok(())
        }
    }

    fn producer(config: ProducerConfig) -> BoundedQueueProducer<u32, Collector> {
        BoundedQueueProducer::new(Collector::default(), config).unwrap()
    }

    #[test]
    fn rejects_zero_queue_size() {
        let result = BoundedQueueProducer::new(
            Collector::default(),
            ProducerConfig::new().max_queue_size(0),
        );

        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_parallelism() {
        let result =
            BoundedQueueProducer::new(Collector::default(), ProducerConfig::new().parallelism(0));

        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn start_requires_runtime() {
        let producer = producer(ProducerConfig::new());
        assert!(matches!(producer.start(), Err(PipelineError::NoRuntime(_))));
    }

    #[test]
    fn admits_up_to_queue_capacity() {
        let producer = producer(ProducerConfig::new().max_queue_size(4));

        for i in 0..4 {
            assert!(producer.try_enqueue_payload(i));
        }

        assert!(!producer.try_enqueue_payload(4));
        assert_eq!(producer.queued(), 4);

        let stats = producer.stats();
        assert_eq!(stats.enqueued, 4);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn disabled_producer_leaves_queue_untouched() {
        let (updater, handle) = crate::config::channel(ProducerConfig::new().max_queue_size(2));
        let producer = BoundedQueueProducer::new(Collector::default(), handle).unwrap();

        updater.update(|config| config.enabled = false);
        assert!(!producer.try_enqueue_payload(1));
        assert!(!producer.try_enqueue(WorkItem::Flush));
        assert_eq!(producer.queued(), 0);

        updater.update(|config| config.enabled = true);
        assert!(producer.try_enqueue_payload(1));
        assert!(producer.try_enqueue_payload(2));
        assert!(!producer.try_enqueue_payload(3));
    }

    #[test]
    fn queue_capacity_ignores_later_updates() {
        let (updater, handle) = crate::config::channel(ProducerConfig::new().max_queue_size(1));
        let producer = BoundedQueueProducer::new(Collector::default(), handle).unwrap();

        updater.update(|config| config.max_queue_size = 10);

        assert!(producer.try_enqueue_payload(1));
        assert!(!producer.try_enqueue_payload(2));
        assert_eq!(producer.max_queue_size(), 1);
    }

    #[tokio::test]
    async fn cannot_start_twice_or_after_stop() {
        let producer = producer(ProducerConfig::new());

        producer.start().unwrap();
        assert!(matches!(producer.start(), Err(PipelineError::AlreadyStarted)));

        producer.stop().await;
        assert!(matches!(producer.start(), Err(PipelineError::Stopped)));
    }

    #[tokio::test]
    async fn stop_closes_admission() {
        let producer = producer(ProducerConfig::new());

        producer.start().unwrap();
        producer.stop().await;

        assert!(!producer.try_enqueue_payload(1));
    }
}
