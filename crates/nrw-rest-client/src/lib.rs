//! REST client for the Node-RED admin API
//!
//! Every operation is a single HTTP exchange against the configured base
//! URL. Requests carry `Authorization: Bearer <token>` whenever a token is
//! configured or has been obtained through [`RestClient::authenticate`].

pub mod auth;
pub mod client;
pub mod error;

pub use auth::*;
pub use client::*;
pub use error::*;

use async_trait::async_trait;
use nrw_api_contract::*;
use nrw_client_api::{ClientApiResult, FlowApi};
use serde_json::{Map, Value};

#[async_trait]
impl FlowApi for client::RestClient {
    async fn deploy_flow(&self, flow: &FlowDefinition) -> ClientApiResult<()> {
        self.deploy_flow(flow).await.map_err(Into::into)
    }

    async fn execute_flow(
        &self,
        flow_id: &str,
        input: &Map<String, Value>,
    ) -> ClientApiResult<ExecutionResult> {
        self.execute_flow(flow_id, input).await.map_err(Into::into)
    }

    async fn get_flow(&self, flow_id: &str) -> ClientApiResult<FlowDefinition> {
        self.get_flow(flow_id).await.map_err(Into::into)
    }

    async fn delete_flow(&self, flow_id: &str) -> ClientApiResult<()> {
        self.delete_flow(flow_id).await.map_err(Into::into)
    }

    async fn health_check(&self) -> ClientApiResult<()> {
        self.health_check().await.map_err(Into::into)
    }

    async fn authenticate(&self, username: &str, password: &str) -> ClientApiResult<String> {
        self.authenticate(username, password).await.map_err(Into::into)
    }
}
