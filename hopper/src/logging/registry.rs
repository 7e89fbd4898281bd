pub fn pipeline_registered(payload: &str) {
    tracing::info!(payload, "Registered pipeline.");
}

pub fn start_failed(payload: &str, err: &crate::error::PipelineError) {
    tracing::error!(payload, error = %err, "Failed to start pipeline.");
}
