use super::Buffer;
use crate::codecs::Encoder;
use crate::logging;
use bytes::Bytes;

/// A format-converting buffer that encodes each payload with an [Encoder] at push time.
///
/// The buffer is full once `capacity` items have been accumulated, or once the total encoded
/// size reaches `max_bytes` (if configured). Payloads that fail to encode are rejected.
#[derive(Debug)]
pub struct EncodedBuffer<E> {
    encoder: E,
    items: Vec<Bytes>,
    capacity: usize,
    max_bytes: Option<usize>,
    size: usize,
}

impl<E> EncodedBuffer<E> {
    pub fn new(encoder: E, capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            encoder,
            items: Vec::with_capacity(capacity),
            capacity,
            max_bytes: None,
            size: 0,
        }
    }

    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes.max(1));
        self
    }

    /// Total number of encoded bytes in the current accumulation.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<E> Buffer for EncodedBuffer<E>
where
    E: Encoder + Send,
{
    type Item = E::Item;
    type Output = Bytes;

    fn try_push(&mut self, item: E::Item) -> bool {
        if self.is_full() {
            return false;
        }

        match self.encoder.encode(item) {
            Ok(bytes) => {
                self.size += bytes.len();
                self.items.push(bytes);
                true
            }
            Err(err) => {
                logging::buffer::encode_failed(&err);
                false
            }
        }
    }

    fn is_full(&self) -> bool {
        let exceeded_size = self
            .max_bytes
            .map(|max_bytes| self.size >= max_bytes)
            .unwrap_or(false);

        self.items.len() >= self.capacity || exceeded_size
    }

    fn pop(&mut self) -> Vec<Bytes> {
        self.items.clone()
    }

    fn clear(&mut self) {
        self.items.clear();
        self.size = 0;
    }

    fn any(&self) -> bool {
        !self.items.is_empty()
    }
}
