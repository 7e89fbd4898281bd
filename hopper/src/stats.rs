//! Lock-free counters describing what a pipeline has done with the items it was handed.
//!
//! Every failure mode in the pipeline degrades to dropped data and a log line. The counters
//! make those drops observable without parsing logs.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ProducerStats {
    enqueued: AtomicU64,
    rejected: AtomicU64,
    delivered: AtomicU64,
    delivery_failures: AtomicU64,
    synthetic_flushes: AtomicU64,
}

/// A point-in-time copy of [ProducerStats].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStatsSnapshot {
    pub enqueued: u64,
    pub rejected: u64,
    pub delivered: u64,
    pub delivery_failures: u64,
    pub synthetic_flushes: u64,
}

impl ProducerStats {
    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_synthetic_flush(&self) {
        self.synthetic_flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProducerStatsSnapshot {
        ProducerStatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            synthetic_flushes: self.synthetic_flushes.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsumerStats {
    batches_published: AtomicU64,
    batches_failed: AtomicU64,
    items_published: AtomicU64,
    pushes_rejected: AtomicU64,
}

/// A point-in-time copy of [ConsumerStats].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStatsSnapshot {
    pub batches_published: u64,
    pub batches_failed: u64,
    pub items_published: u64,
    pub pushes_rejected: u64,
}

impl ConsumerStats {
    pub(crate) fn record_published(&self, items: usize) {
        self.batches_published.fetch_add(1, Ordering::Relaxed);
        self.items_published.fetch_add(items as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_push_rejected(&self) {
        self.pushes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ConsumerStatsSnapshot {
        ConsumerStatsSnapshot {
            batches_published: self.batches_published.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            items_published: self.items_published.load(Ordering::Relaxed),
            pushes_rejected: self.pushes_rejected.load(Ordering::Relaxed),
        }
    }
}
