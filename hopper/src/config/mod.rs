mod incremental_wait;

pub use incremental_wait::{IncrementalWait, DEFAULT_IDLE_DELAY};
use std::time::Duration;
use tokio::sync::watch;

const DEFAULT_MAX_QUEUE_SIZE: usize = 10_000;
const DEFAULT_PARALLELISM: usize = 1;
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for a [BoundedQueueProducer](crate::producer::BoundedQueueProducer).
///
/// `max_queue_size` and `parallelism` are captured once, when the producer is constructed.
/// Every other field is read live, so changes published through a [ConfigUpdater] take effect
/// on the next admission or worker iteration.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub(crate) enabled: bool,
    pub(crate) max_queue_size: usize,
    pub(crate) parallelism: usize,
    pub(crate) flush_timeout: Option<Duration>,
    pub(crate) incremental_wait: IncrementalWait,
    pub(crate) shutdown_timeout: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            parallelism: DEFAULT_PARALLELISM,
            flush_timeout: None,
            incremental_wait: IncrementalWait::default(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl ProducerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = size;
        self
    }

    pub fn parallelism(mut self, workers: usize) -> Self {
        self.parallelism = workers;
        self
    }

    pub fn flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = Some(timeout);
        self
    }

    pub fn no_flush_timeout(mut self) -> Self {
        self.flush_timeout = None;
        self
    }

    pub fn incremental_wait(mut self, schedule: impl Into<IncrementalWait>) -> Self {
        self.incremental_wait = schedule.into();
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Settings for a [BatchConsumer](crate::consumer::BatchConsumer).
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub(crate) enabled: bool,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ConsumerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Creates a live configuration pair.
///
/// The [ConfigHandle] is handed to pipeline components, while the [ConfigUpdater] stays with
/// the host so it can change settings at runtime.
pub fn channel<C>(config: C) -> (ConfigUpdater<C>, ConfigHandle<C>) {
    let (tx, rx) = watch::channel(config);
    (ConfigUpdater(tx), ConfigHandle(rx))
}

/// Read side of a live configuration value.
#[derive(Debug, Clone)]
pub struct ConfigHandle<C>(watch::Receiver<C>);

impl<C> ConfigHandle<C> {
    /// Creates a handle whose value never changes.
    pub fn fixed(config: C) -> Self {
        let (_, handle) = channel(config);
        handle
    }

    /// Borrows the current value. The borrow must not be held across an `.await`.
    pub fn current(&self) -> watch::Ref<'_, C> {
        self.0.borrow()
    }
}

impl<C> From<C> for ConfigHandle<C> {
    fn from(config: C) -> Self {
        Self::fixed(config)
    }
}

/// Write side of a live configuration value.
#[derive(Debug)]
pub struct ConfigUpdater<C>(watch::Sender<C>);

impl<C> ConfigUpdater<C> {
    pub fn replace(&self, config: C) -> C {
        self.0.send_replace(config)
    }

    pub fn update(&self, f: impl FnOnce(&mut C)) {
        self.0.send_modify(f);
    }

    pub fn subscribe(&self) -> ConfigHandle<C> {
        ConfigHandle(self.0.subscribe())
    }
}
