//! Contract types for the Node-RED admin API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:1880";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Position of a node in the editor canvas. Advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single processing unit within a flow.
///
/// `node_type` names a node kind known to the runtime and decides how
/// `properties` is interpreted. `wires` holds, for each output port, the
/// ordered ids of the nodes that port feeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wires: Vec<Vec<String>>,
}

impl Node {
    /// Create a node with the given id and type tag
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Wire output `port` of this node to `target`
    pub fn wired_to(mut self, port: usize, target: impl Into<String>) -> Self {
        self.add_wire(port, target);
        self
    }

    /// Append `target` to the wire list of output `port`, growing the port
    /// list as needed. Returns `false` if the wire already existed.
    pub fn add_wire(&mut self, port: usize, target: impl Into<String>) -> bool {
        let target = target.into();
        if self.wires.len() <= port {
            self.wires.resize_with(port + 1, Vec::new);
        }
        let outputs = &mut self.wires[port];
        if outputs.contains(&target) {
            return false;
        }
        outputs.push(target);
        true
    }
}

/// Simplified edge between two nodes.
///
/// Wires on [`Node`] are the canonical representation; connections are
/// folded into the source node's wires when a flow is translated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub source_port: usize,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub target_port: usize,
}

fn is_zero(port: &usize) -> bool {
    *port == 0
}

/// Decode an explicit `null` the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_port: 0,
            target_port: 0,
        }
    }

    pub fn from_port(mut self, port: usize) -> Self {
        self.source_port = port;
        self
    }
}

/// A deployable Node-RED flow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct FlowDefinition {
    #[serde(default)]
    #[validate(length(min = 1, message = "Flow ID is required"))]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Node>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub connections: Vec<Connection>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Map::is_empty"
    )]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FlowDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    /// Connections implied by the nodes' wires, in node then port order
    pub fn derived_connections(&self) -> Vec<Connection> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.wires.iter().enumerate().flat_map(move |(port, targets)| {
                    targets
                        .iter()
                        .map(move |target| Connection::new(&node.id, target).from_port(port))
                })
            })
            .collect()
    }
}

/// A single log line produced while a flow executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub level: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// Outcome of a flow execution.
///
/// Everything except `duration` comes from the server; `duration` is the
/// wall-clock time the caller measured around the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub execution_id: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, with = "duration_nanos")]
    pub duration: Duration,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub logs: Vec<LogEntry>,
}

/// Password grant sent to `/auth/token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub client_id: String,
    pub grant_type: String,
    pub scope: String,
    pub username: String,
    pub password: String,
}

impl TokenRequest {
    /// Build the admin password grant Node-RED expects
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            client_id: "node-red-admin".to_string(),
            grant_type: "password".to_string(),
            scope: "*".to_string(),
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Token returned by `/auth/token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// Health report for a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn healthy(message: impl Into<String>) -> Self {
        Self::with_status("healthy", message)
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with_status("unhealthy", message)
    }

    fn with_status(status: &str, message: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            details: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    #[validate(length(min = 1, message = "Node-RED base URL is required"))]
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Declared for compatibility with existing config files; no request is retried.
    pub retry_attempts: u32,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            retry_attempts: 3,
            debug: false,
        }
    }
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

mod duration_nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let nanos = Option::<u64>::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos.unwrap_or_default()))
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
