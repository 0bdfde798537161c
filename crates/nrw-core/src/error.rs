//! Error types for the orchestration layer.

use nrw_client_api::ClientApiError;

/// Error type for all wrapper operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create Node-RED client: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("failed to convert workflow: {0:#}")]
    Conversion(anyhow::Error),

    #[error(transparent)]
    Client(#[from] ClientApiError),

    #[error("pre-execution failed: {0:#}")]
    PreExecute(anyhow::Error),

    #[error("post-execution failed: {0:#}")]
    PostExecute(anyhow::Error),

    #[error("execution failed and error handler failed: {handler:#} (original error: {original})")]
    ErrorHandler {
        handler: anyhow::Error,
        original: ClientApiError,
    },
}

impl Error {
    /// Create a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether the server reported that the flow does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Client(err) if err.is_not_found())
    }
}
