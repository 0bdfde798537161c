//! Conversion between caller workflow formats and [`FlowDefinition`].

use nrw_api_contract::FlowDefinition;
use serde_json::{Map, Value};

/// A workflow handed to the wrapper in some caller-specific shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Workflow {
    /// Already in the flow model.
    Flow(FlowDefinition),
    /// Arbitrary JSON, interpreted by the converter.
    Json(Value),
}

impl Workflow {
    /// Name of the shape held, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Workflow::Flow(_) => "FlowDefinition",
            Workflow::Json(Value::Null) => "null",
            Workflow::Json(Value::Bool(_)) => "bool",
            Workflow::Json(Value::Number(_)) => "number",
            Workflow::Json(Value::String(_)) => "string",
            Workflow::Json(Value::Array(_)) => "array",
            Workflow::Json(Value::Object(_)) => "object",
        }
    }
}

impl From<FlowDefinition> for Workflow {
    fn from(flow: FlowDefinition) -> Self {
        Workflow::Flow(flow)
    }
}

impl From<Value> for Workflow {
    fn from(value: Value) -> Self {
        Workflow::Json(value)
    }
}

impl From<Map<String, Value>> for Workflow {
    fn from(map: Map<String, Value>) -> Self {
        Workflow::Json(Value::Object(map))
    }
}

impl From<&str> for Workflow {
    fn from(text: &str) -> Self {
        Workflow::Json(Value::String(text.to_string()))
    }
}

impl From<String> for Workflow {
    fn from(text: String) -> Self {
        Workflow::Json(Value::String(text))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("unsupported workflow type: {0}")]
    UnsupportedType(&'static str),
}

/// Translates workflows to and from the flow model deployed to Node-RED.
pub trait WorkflowConverter: Send + Sync {
    fn to_flow(&self, workflow: Workflow) -> anyhow::Result<FlowDefinition>;

    fn from_flow(&self, flow: FlowDefinition) -> anyhow::Result<Workflow>;
}

/// Accepts flows as-is and JSON objects carrying `id`, `name`,
/// `description` and `version` strings. Keys holding anything but a string
/// are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl WorkflowConverter for DefaultConverter {
    fn to_flow(&self, workflow: Workflow) -> anyhow::Result<FlowDefinition> {
        match workflow {
            Workflow::Flow(flow) => Ok(flow),
            Workflow::Json(Value::Object(map)) => {
                let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);

                Ok(FlowDefinition {
                    id: text("id").unwrap_or_default(),
                    name: text("name").unwrap_or_default(),
                    description: text("description"),
                    version: text("version"),
                    ..FlowDefinition::default()
                })
            }
            other => Err(ConversionError::UnsupportedType(other.kind()).into()),
        }
    }

    fn from_flow(&self, flow: FlowDefinition) -> anyhow::Result<Workflow> {
        Ok(Workflow::Flow(flow))
    }
}
