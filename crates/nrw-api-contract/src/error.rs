//! Error types for contract validation and flow translation

use thiserror::Error;

/// Errors that can occur while validating or translating contract types
#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Property '{key}' of node '{node_id}' collides with a reserved node field")]
    ReservedProperty { node_id: String, key: String },

    #[error("Connection source '{0}' is not a node of the flow")]
    UnknownConnectionSource(String),

    #[error("Duplicate node ID: {0}")]
    DuplicateNode(String),

    #[error("Node '{source_id}' is wired to unknown node '{target}'")]
    DanglingWire { source_id: String, target: String },
}

/// Result type alias for contract operations
pub type ApiContractResult<T> = Result<T, ApiContractError>;
