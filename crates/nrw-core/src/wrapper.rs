//! Orchestration facade over a Node-RED client.

use std::sync::Arc;
use std::time::Instant;

use nrw_api_contract::validation::{validate_flow, validate_wiring};
use nrw_api_contract::{Config, ExecutionResult, FlowDefinition};
use nrw_client_api::FlowApi;
use nrw_rest_client::RestClient;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::converter::{DefaultConverter, Workflow, WorkflowConverter};
use crate::error::Error;
use crate::executor::{DefaultExecutor, ExecutionHandler};
use crate::Result;

/// High-level entry point for managing flows on a Node-RED instance.
pub struct NodeRedWrapper {
    client: Arc<dyn FlowApi>,
    converter: Arc<dyn WorkflowConverter>,
    executor: Arc<dyn ExecutionHandler>,
    config: Config,
}

impl std::fmt::Debug for NodeRedWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRedWrapper")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NodeRedWrapper {
    /// Create a wrapper talking HTTP to `config.base_url`
    pub fn new(config: Config) -> Result<Self> {
        let client = RestClient::new(&config).map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Create a wrapper around an existing client
    pub fn with_client(config: Config, client: Arc<dyn FlowApi>) -> Self {
        Self {
            client,
            converter: Arc::new(DefaultConverter),
            executor: Arc::new(DefaultExecutor),
            config,
        }
    }

    pub fn with_converter(mut self, converter: Arc<dyn WorkflowConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn ExecutionHandler>) -> Self {
        self.executor = executor;
        self
    }

    pub fn set_converter(&mut self, converter: Arc<dyn WorkflowConverter>) {
        self.converter = converter;
    }

    pub fn set_executor(&mut self, executor: Arc<dyn ExecutionHandler>) {
        self.executor = executor;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Deploy a flow, creating it on the server if needed.
    ///
    /// Broken wiring is logged but still deployed; Node-RED drops wires to
    /// unknown nodes itself.
    pub async fn deploy_flow(&self, flow: &FlowDefinition) -> Result<()> {
        validate_flow(flow).map_err(|_| Error::validation("flow ID is required"))?;
        if let Err(e) = validate_wiring(flow) {
            warn!(flow_id = %flow.id, "deploying flow with broken wiring: {}", e);
        }
        self.client.deploy_flow(flow).await?;
        Ok(())
    }

    /// Convert a workflow with the active converter and deploy it
    pub async fn deploy_workflow(&self, workflow: impl Into<Workflow>) -> Result<()> {
        let flow = self.convert(workflow.into())?;
        self.deploy_flow(&flow).await
    }

    /// Execute a deployed flow, running the execution hooks around the request
    pub async fn execute_flow(
        &self,
        flow_id: &str,
        input: &Map<String, Value>,
    ) -> Result<ExecutionResult> {
        require_flow_id(flow_id)?;

        self.executor
            .pre_execute(input)
            .await
            .map_err(Error::PreExecute)?;

        let started = Instant::now();
        let mut result = match self.client.execute_flow(flow_id, input).await {
            Ok(result) => result,
            Err(original) => {
                if let Err(handler) = self.executor.on_error(&original).await {
                    warn!(flow_id, error = %original, "execution error handler failed: {:#}", handler);
                    return Err(Error::ErrorHandler { handler, original });
                }
                return Err(original.into());
            }
        };
        result.duration = started.elapsed();
        debug!(
            flow_id,
            execution_id = %result.execution_id,
            success = result.success,
            duration_ms = result.duration.as_millis() as u64,
            "flow executed"
        );

        self.executor
            .post_execute(&result)
            .await
            .map_err(Error::PostExecute)?;

        Ok(result)
    }

    /// Convert a workflow with the active converter and execute the flow it names
    pub async fn execute_workflow(
        &self,
        workflow: impl Into<Workflow>,
        input: &Map<String, Value>,
    ) -> Result<ExecutionResult> {
        let flow = self.convert(workflow.into())?;
        self.execute_flow(&flow.id, input).await
    }

    /// Retrieve a deployed flow
    pub async fn get_flow(&self, flow_id: &str) -> Result<FlowDefinition> {
        require_flow_id(flow_id)?;
        Ok(self.client.get_flow(flow_id).await?)
    }

    /// Retrieve a deployed flow and convert it back with the active converter
    pub async fn get_workflow(&self, flow_id: &str) -> Result<Workflow> {
        let flow = self.get_flow(flow_id).await?;
        self.converter.from_flow(flow).map_err(Error::Conversion)
    }

    /// Remove a deployed flow
    pub async fn delete_flow(&self, flow_id: &str) -> Result<()> {
        require_flow_id(flow_id)?;
        Ok(self.client.delete_flow(flow_id).await?)
    }

    pub async fn health_check(&self) -> Result<()> {
        Ok(self.client.health_check().await?)
    }

    /// Obtain an access token; the client uses it for every later request
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        if username.is_empty() {
            return Err(Error::validation("username is required"));
        }
        Ok(self.client.authenticate(username, password).await?)
    }

    fn convert(&self, workflow: Workflow) -> Result<FlowDefinition> {
        let kind = workflow.kind();
        self.converter.to_flow(workflow).map_err(|e| {
            debug!(kind, "workflow conversion failed: {:#}", e);
            Error::Conversion(e)
        })
    }
}

fn require_flow_id(flow_id: &str) -> Result<()> {
    if flow_id.is_empty() {
        return Err(Error::validation("flow ID is required"));
    }
    Ok(())
}
