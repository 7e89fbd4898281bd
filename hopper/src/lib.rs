//! An in-process batching pipeline.
//!
//! Hopper decouples fast producers from slow, batch-oriented sinks. Callers submit items
//! without ever blocking; a pool of background workers accumulates them into batches and
//! forwards each completed batch to a pluggable sink.
//!
//! A pipeline is made up of the following parts:
//!
//! * A [Producer](producer::Producer) admits work. The provided
//!   [BoundedQueueProducer](producer::BoundedQueueProducer) places admitted items in a
//!   fixed-capacity queue, rejecting items outright once the queue is full. Rejection is the
//!   only form of backpressure; callers decide whether to drop or log rejected items.
//! * The producer's workers drain the queue into a [Consumer](consumer::Consumer). When no
//!   work is available, they sleep according to an [IncrementalWait](config::IncrementalWait)
//!   backoff schedule, and deliver a synthetic flush signal once the configured flush timeout
//!   has elapsed.
//! * The provided [BatchConsumer](consumer::BatchConsumer) accumulates payloads into a
//!   [Buffer](buffer::Buffer), and once the buffer is full (or a flush signal arrives),
//!   publishes the batch through a [Publish](consumer::Publish) implementation.
//!
//! Delivery is best-effort. Failed batches are logged, counted and discarded, and are never
//! retried; nothing that goes wrong inside a pipeline is surfaced to callers or crashes the
//! host. Callers needing durability must layer it on top, e.g. with a persistent buffer.

mod service;
mod work_item;

pub mod buffer;
pub mod codecs;
pub mod config;
pub mod consumer;
pub mod error;
pub mod producer;
pub mod registry;
pub mod stats;

pub(crate) mod logging;

pub use registry::Registry;
pub use service::Service;
pub use work_item::WorkItem;
