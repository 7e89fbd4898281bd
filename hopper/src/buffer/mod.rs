//! Accumulators that collect payloads into batches.
//!
//! A [BatchConsumer](crate::consumer::BatchConsumer) owns exactly one [Buffer] for its whole
//! lifetime. Each delivered payload is pushed into it, and once the buffer reports that it is
//! full (or a flush signal arrives), the consumer pops the accumulated batch, publishes it and
//! clears the buffer for the next accumulation cycle.
//!
//! Three buffers are provided:
//!
//! * [SizedBuffer] - full once a fixed number of items has been accumulated.
//! * [TimedBuffer] - full once a fixed number of items has been accumulated, or the oldest item
//!   has waited longer than a maximum age.
//! * [EncodedBuffer] - encodes each item with an [Encoder](crate::codecs::Encoder) as it is
//!   pushed, and is full once an item count or byte size threshold has been reached.

mod encoded;
mod sized;
mod timed;

pub use encoded::EncodedBuffer;
pub use sized::SizedBuffer;
pub use timed::TimedBuffer;

/// The capability set a batching consumer relies on.
pub trait Buffer: Send {
    /// The payload type accepted by the buffer.
    type Item;
    /// The sink-facing representation produced by [pop](Buffer::pop).
    type Output;

    /// Accepts `item` into the current accumulation, returning `false` if it was rejected.
    fn try_push(&mut self, item: Self::Item) -> bool;

    /// Returns `true` once the accumulation has reached the buffer's batch threshold.
    fn is_full(&self) -> bool;

    /// Produces the accumulated batch in its sink-facing representation.
    ///
    /// Implementations may move the accumulated items out, but are not required to reset any
    /// other state: callers must call [clear](Buffer::clear) once they are done with the batch.
    fn pop(&mut self) -> Vec<Self::Output>;

    /// Discards all accumulated state and starts a fresh accumulation cycle.
    fn clear(&mut self);

    /// Returns `true` if at least one item has been accumulated.
    fn any(&self) -> bool;
}
