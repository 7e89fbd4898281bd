/// The envelope passed from a producer's queue to its consumer.
///
/// A `WorkItem` either carries a payload submitted by a caller, or is a payload-less flush
/// signal that forces the consumer to evaluate its current, possibly partial, batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem<T> {
    Payload(T),
    Flush,
}

impl<T> WorkItem<T> {
    pub fn payload(payload: T) -> Self {
        Self::Payload(payload)
    }

    pub fn flush() -> Self {
        Self::Flush
    }

    pub fn is_flush(&self) -> bool {
        matches!(self, Self::Flush)
    }

    pub fn as_payload(&self) -> Option<&T> {
        match self {
            Self::Payload(payload) => Some(payload),
            Self::Flush => None,
        }
    }

    pub fn into_payload(self) -> Option<T> {
        match self {
            Self::Payload(payload) => Some(payload),
            Self::Flush => None,
        }
    }
}

impl<T> From<T> for WorkItem<T> {
    fn from(payload: T) -> Self {
        Self::Payload(payload)
    }
}
