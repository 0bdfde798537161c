//! Client API trait for the Node-RED admin API
//!
//! The orchestration layer is written against [`FlowApi`] so the HTTP
//! client can be swapped for an in-memory one in tests.

use async_trait::async_trait;
use nrw_api_contract::*;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientApiError {
    #[error("flow not found: {0}")]
    NotFound(String),
    #[error("failed to {operation}: status {status}, body: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },
    #[error("failed to {operation}: {message}")]
    Transport { operation: String, message: String },
    #[error("failed to decode {operation} response: {message}")]
    Decode { operation: String, message: String },
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl ClientApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientApiResult<T> = Result<T, ClientApiError>;

#[async_trait]
pub trait FlowApi: Send + Sync {
    /// Update the flow in place, creating it if the server does not know it
    async fn deploy_flow(&self, flow: &FlowDefinition) -> ClientApiResult<()>;

    async fn execute_flow(
        &self,
        flow_id: &str,
        input: &Map<String, Value>,
    ) -> ClientApiResult<ExecutionResult>;

    async fn get_flow(&self, flow_id: &str) -> ClientApiResult<FlowDefinition>;

    async fn delete_flow(&self, flow_id: &str) -> ClientApiResult<()>;

    async fn health_check(&self) -> ClientApiResult<()>;

    /// Exchange credentials for an access token and use it for every later call
    async fn authenticate(&self, username: &str, password: &str) -> ClientApiResult<String>;
}
