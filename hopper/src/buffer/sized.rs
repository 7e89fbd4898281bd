use super::Buffer;

/// A buffer that batches payloads as-is, and is full once `capacity` items are accumulated.
#[derive(Debug)]
pub struct SizedBuffer<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> SizedBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Send> Buffer for SizedBuffer<T> {
    type Item = T;
    type Output = T;

    fn try_push(&mut self, item: T) -> bool {
        if self.is_full() {
            return false;
        }

        self.items.push(item);
        true
    }

    fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    fn pop(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn any(&self) -> bool {
        !self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_full_at_capacity() {
        let mut buffer = SizedBuffer::new(3);

        assert!(buffer.try_push("a"));
        assert!(buffer.try_push("b"));
        assert!(!buffer.is_full());
        assert!(buffer.try_push("c"));
        assert!(buffer.is_full());
    }

    #[test]
    fn rejects_push_when_full() {
        let mut buffer = SizedBuffer::new(1);

        assert!(buffer.try_push(1));
        assert!(!buffer.try_push(2));
        assert_eq!(buffer.pop(), vec![1]);
    }

    #[test]
    fn clear_starts_fresh_accumulation() {
        let mut buffer = SizedBuffer::new(2);
        buffer.try_push(1);
        buffer.try_push(2);

        assert_eq!(buffer.pop(), vec![1, 2]);
        buffer.clear();

        assert!(!buffer.any());
        assert!(buffer.try_push(3));
        assert_eq!(buffer.pop(), vec![3]);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let buffer = SizedBuffer::<u8>::new(0);
        assert_eq!(buffer.capacity(), 1);
    }
}
