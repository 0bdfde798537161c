//! Hooks run around flow execution.

use async_trait::async_trait;
use nrw_api_contract::ExecutionResult;
use nrw_client_api::ClientApiError;
use serde_json::{Map, Value};

/// Callbacks bracketing a flow execution.
///
/// The wrapper calls them strictly in sequence: `pre_execute` before the
/// request, then either `post_execute` with the result or `on_error` with
/// the transport failure. An error from `pre_execute` or `post_execute`
/// aborts the call.
#[async_trait]
pub trait ExecutionHandler: Send + Sync {
    async fn pre_execute(&self, input: &Map<String, Value>) -> anyhow::Result<()>;

    async fn post_execute(&self, result: &ExecutionResult) -> anyhow::Result<()>;

    async fn on_error(&self, error: &ClientApiError) -> anyhow::Result<()>;
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExecutor;

#[async_trait]
impl ExecutionHandler for DefaultExecutor {
    async fn pre_execute(&self, _input: &Map<String, Value>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn post_execute(&self, _result: &ExecutionResult) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_error(&self, _error: &ClientApiError) -> anyhow::Result<()> {
        Ok(())
    }
}
