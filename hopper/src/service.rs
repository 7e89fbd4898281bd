use crate::error::Result;
use async_trait::async_trait;

/// Lifecycle of a background pipeline component hosted by the process.
#[async_trait]
pub trait Service: Send + Sync {
    /// Spawns the component's background tasks on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [Err] if the component is already running, has been stopped, or no runtime is
    /// available.
    fn start(&self) -> Result<()>;

    /// Stops accepting new work and waits for background tasks to wind down.
    async fn stop(&self);
}
