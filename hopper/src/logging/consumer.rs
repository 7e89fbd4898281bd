pub fn push_rejected(consumer: &str) {
    tracing::warn!(consumer, "Buffer rejected item, discarding.");
}

pub fn publishing_batch(consumer: &str, size: usize, flush: bool) {
    tracing::debug!(consumer, size, flush, "Publishing batch.");
}

pub fn batch_published(consumer: &str, size: usize) {
    tracing::trace!(consumer, size, "Batch published.");
}

pub fn publish_rejected(consumer: &str, size: usize) {
    tracing::error!(consumer, size, "Failed to send messages, publisher reported failure.");
}

pub fn publish_error(consumer: &str, size: usize, err: &anyhow::Error) {
    tracing::error!(consumer, size, error = %err, "Failed to send messages.");
}

pub fn publish_panicked(consumer: &str, size: usize) {
    tracing::error!(consumer, size, "Failed to send messages, publisher panicked.");
}
