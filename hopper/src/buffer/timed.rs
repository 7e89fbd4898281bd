use super::Buffer;
use std::time::Duration;
use tokio::time::Instant;

/// A buffer that batches payloads as-is, and is full once `capacity` items are accumulated or
/// the oldest accumulated item has been waiting for at least `max_age`.
///
/// The age is measured from the first push of the current accumulation cycle, and restarts on
/// [clear](Buffer::clear).
#[derive(Debug)]
pub struct TimedBuffer<T> {
    items: Vec<T>,
    capacity: usize,
    max_age: Duration,
    opened_at: Option<Instant>,
}

impl<T> TimedBuffer<T> {
    pub fn new(capacity: usize, max_age: Duration) -> Self {
        let capacity = capacity.max(1);

        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            max_age,
            opened_at: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn exceeded_max_age(&self) -> bool {
        self.opened_at
            .map(|opened_at| opened_at.elapsed() >= self.max_age)
            .unwrap_or(false)
    }
}

impl<T: Send> Buffer for TimedBuffer<T> {
    type Item = T;
    type Output = T;

    fn try_push(&mut self, item: T) -> bool {
        if self.items.len() >= self.capacity {
            return false;
        }

        self.opened_at.get_or_insert_with(Instant::now);
        self.items.push(item);
        true
    }

    fn is_full(&self) -> bool {
        self.items.len() >= self.capacity || self.exceeded_max_age()
    }

    fn pop(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    fn clear(&mut self) {
        self.items.clear();
        self.opened_at = None;
    }

    fn any(&self) -> bool {
        !self.items.is_empty()
    }
}
