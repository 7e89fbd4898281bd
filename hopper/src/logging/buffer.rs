pub fn encode_failed(err: &anyhow::Error) {
    tracing::warn!(error = %err, "Failed to encode item, rejecting push.");
}
