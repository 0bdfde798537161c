//! Flow commands

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use nrw_core::{FlowDefinition, HealthStatus, Node, NodeRedWrapper};
use serde_json::{json, Map, Value};
use tracing::info;

pub const DEFAULT_FLOW_ID: &str = "example-flow";

/// Arguments for commands that address a single flow
#[derive(Args, Debug)]
pub struct FlowIdArgs {
    /// Flow to operate on
    #[arg(long = "flow-id", value_name = "ID", default_value = DEFAULT_FLOW_ID)]
    pub flow_id: String,
}

impl FlowIdArgs {
    pub async fn get(self, wrapper: &NodeRedWrapper) -> Result<()> {
        let flow = wrapper
            .get_flow(&self.flow_id)
            .await
            .context("Failed to get flow")?;

        println!("Retrieved flow: {} - {}", flow.id, flow.name);
        if let Some(description) = &flow.description {
            println!("   Description: {}", description);
        }
        println!("   Nodes: {}", flow.nodes.len());
        println!("   Connections: {}", flow.derived_connections().len());
        Ok(())
    }

    pub async fn delete(self, wrapper: &NodeRedWrapper) -> Result<()> {
        wrapper
            .delete_flow(&self.flow_id)
            .await
            .context("Failed to delete flow")?;
        println!("Flow '{}' deleted", self.flow_id);
        Ok(())
    }
}

/// Arguments for deploying a flow
#[derive(Args, Debug)]
pub struct DeployArgs {
    #[command(flatten)]
    pub target: FlowIdArgs,

    /// JSON workflow to deploy instead of the built-in example
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl DeployArgs {
    pub async fn run(self, wrapper: &NodeRedWrapper) -> Result<()> {
        let flow_id = match self.file {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let workflow: Value = serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                let flow_id = workflow
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();

                wrapper
                    .deploy_workflow(workflow)
                    .await
                    .context("Failed to deploy workflow")?;
                flow_id
            }
            None => {
                let flow = example_flow(&self.target.flow_id);
                wrapper
                    .deploy_flow(&flow)
                    .await
                    .context("Failed to deploy flow")?;
                flow.id
            }
        };

        info!(flow_id = %flow_id, "deployed");
        println!("Flow '{}' deployed", flow_id);
        Ok(())
    }
}

/// Arguments for executing a flow
#[derive(Args, Debug)]
pub struct ExecuteArgs {
    #[command(flatten)]
    pub target: FlowIdArgs,

    /// JSON object passed to the flow
    #[arg(long, value_name = "JSON")]
    pub input: Option<String>,
}

impl ExecuteArgs {
    pub fn input(&self) -> Result<Map<String, Value>> {
        let Some(raw) = &self.input else {
            let mut input = Map::new();
            input.insert("message".into(), json!("Hello from CLI!"));
            input.insert("timestamp".into(), json!(chrono::Utc::now().timestamp()));
            return Ok(input);
        };

        match serde_json::from_str::<Value>(raw).context("Failed to parse --input")? {
            Value::Object(map) => Ok(map),
            other => bail!("--input must be a JSON object, got {}", other),
        }
    }

    pub async fn run(self, wrapper: &NodeRedWrapper) -> Result<()> {
        let input = self.input()?;
        let result = wrapper
            .execute_flow(&self.target.flow_id, &input)
            .await
            .context("Failed to execute flow")?;

        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }
}

/// Arguments for obtaining an access token
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,
}

impl AuthArgs {
    pub async fn run(self, wrapper: &NodeRedWrapper) -> Result<()> {
        let token = wrapper
            .authenticate(&self.username, &self.password)
            .await
            .context("Failed to authenticate")?;
        println!("{}", token);
        Ok(())
    }
}

/// Print the health of the configured instance; fails when it is unhealthy
pub async fn health(wrapper: &NodeRedWrapper) -> Result<()> {
    let url = wrapper.config().base_url.clone();
    let status = match wrapper.health_check().await {
        Ok(()) => HealthStatus::healthy("Node-RED is healthy").with_detail("url", url),
        Err(err) => {
            let status = HealthStatus::unhealthy(err.to_string()).with_detail("url", url);
            println!("{}", serde_json::to_string_pretty(&status)?);
            bail!("Health check failed: {}", err);
        }
    };

    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

/// Inject -> function -> debug flow used when no file is given
pub fn example_flow(flow_id: &str) -> FlowDefinition {
    FlowDefinition::new(flow_id, "CLI Example Flow")
        .with_description("A simple flow created from the CLI")
        .with_version("1.0.0")
        .with_node(
            Node::new("inject-1", "inject")
                .with_name("Start")
                .at(100.0, 100.0)
                .with_property("payload", "")
                .with_property("payloadType", "json")
                .wired_to(0, "function-1"),
        )
        .with_node(
            Node::new("function-1", "function")
                .with_name("Process")
                .at(300.0, 100.0)
                .with_property(
                    "func",
                    "msg.payload = {\n    message: \"Processed: \" + msg.payload.message,\n    timestamp: msg.payload.timestamp,\n    processed_at: new Date().toISOString()\n};\nreturn msg;",
                )
                .wired_to(0, "debug-1"),
        )
        .with_node(
            Node::new("debug-1", "debug")
                .with_name("Log")
                .at(500.0, 100.0)
                .with_property("complete", "payload"),
        )
}
