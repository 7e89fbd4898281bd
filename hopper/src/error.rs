use thiserror::Error;

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid producer configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("Producer has already been started.")]
    AlreadyStarted,

    #[error("Producer has been stopped and cannot be restarted.")]
    Stopped,

    #[error("Producer must be started from within a tokio runtime.")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),

    #[error("A pipeline is already registered for payload type `{0}`.")]
    DuplicatePipeline(&'static str),
}
