//! Error types for the REST API client

use nrw_api_contract::ApiContractError;
use nrw_client_api::ClientApiError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when using the REST API client
#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to translate flow: {0}")]
    Contract(#[from] ApiContractError),

    #[error("failed to {operation}: {source}")]
    Transport {
        operation: &'static str,
        source: reqwest::Error,
    },

    #[error("failed to {operation}: request timed out")]
    Timeout { operation: &'static str },

    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        source: serde_json::Error,
    },

    #[error("flow not found: {flow_id}")]
    NotFound { flow_id: String },

    #[error("failed to {operation}: status {}, body: {body}", .status.as_u16())]
    Status {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("authentication error: {0}")]
    Auth(String),
}

impl RestClientError {
    pub(crate) fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { operation }
        } else {
            Self::Transport { operation, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<RestClientError> for ClientApiError {
    fn from(err: RestClientError) -> Self {
        match err {
            RestClientError::NotFound { flow_id } => ClientApiError::NotFound(flow_id),
            RestClientError::Status {
                operation,
                status,
                body,
            } => ClientApiError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            },
            RestClientError::Transport { operation, source } => ClientApiError::Transport {
                operation: operation.to_string(),
                message: source.to_string(),
            },
            RestClientError::Timeout { operation } => ClientApiError::Transport {
                operation: operation.to_string(),
                message: "request timed out".to_string(),
            },
            RestClientError::Decode { operation, source } => ClientApiError::Decode {
                operation: operation.to_string(),
                message: source.to_string(),
            },
            RestClientError::Auth(message) => ClientApiError::Auth(message),
            err @ (RestClientError::Config(_)
            | RestClientError::Url(_)
            | RestClientError::Contract(_)) => ClientApiError::Invalid(err.to_string()),
        }
    }
}

/// Result type alias for REST client operations
pub type RestClientResult<T> = Result<T, RestClientError>;
