pub fn enqueue_disabled(producer: &str) {
    tracing::warn!(producer, "Producer is disabled, discarding item.");
}

pub fn enqueue_rejected(producer: &str, reason: &str) {
    tracing::warn!(
        producer,
        reason,
        "Could not enqueue item either because of overflow or termination, discarding."
    );
}

pub fn workers_started(producer: &str, parallelism: usize, max_queue_size: usize) {
    tracing::info!(producer, parallelism, max_queue_size, "Started producer workers.");
}

pub fn stopping(producer: &str) {
    tracing::info!(producer, "Closing producer queue and stopping workers.");
}

pub fn stopped(producer: &str) {
    tracing::info!(producer, "Producer workers stopped.");
}

pub fn shutdown_timed_out(producer: &str, remaining: usize) {
    tracing::warn!(
        producer,
        remaining,
        "Timed out waiting for workers to drain, aborting remaining workers."
    );
}

pub fn worker_exited(producer: &str, worker: usize) {
    tracing::debug!(producer, worker, "Worker exited.");
}

pub fn synthetic_flush(producer: &str, worker: usize) {
    tracing::trace!(producer, worker, "Flush timeout elapsed, delivering flush signal.");
}

pub fn delivery_failed(producer: &str, worker: usize, err: &anyhow::Error) {
    tracing::error!(
        producer,
        worker,
        error = %err,
        "Unhandled error while delivering item to consumer."
    );
}

pub fn delivery_panicked(producer: &str, worker: usize) {
    tracing::error!(producer, worker, "Consumer panicked while handling item.");
}
