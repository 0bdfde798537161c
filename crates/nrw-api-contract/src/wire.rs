//! Translation from [`FlowDefinition`] into the flat node list Node-RED stores.
//!
//! Node-RED represents a flow as a `tab` object followed by one object per
//! node. Each node object carries its position as `x`/`y`, a `z` back-reference
//! to the tab id, its `wires`, and its type-specific properties inlined next
//! to those fields. Properties may not shadow the reserved fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiContractError, ApiContractResult};
use crate::types::{FlowDefinition, Node};

/// Type tag of the container object that represents the flow itself
pub const TAB_TYPE: &str = "tab";

/// Node object fields that node properties may not override
pub const RESERVED_NODE_KEYS: [&str; 7] = ["id", "type", "name", "x", "y", "z", "wires"];

/// A single object of the flat wire format
pub type WireObject = Map<String, Value>;

/// Body of the single-flow admin endpoints (`/flow` and `/flow/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    pub nodes: Vec<WireObject>,
}

/// Translate a flow into the flat wire format: the tab object first, then
/// one object per node in flow order.
pub fn to_wire(flow: &FlowDefinition) -> ApiContractResult<Vec<WireObject>> {
    let nodes = resolve_connections(flow)?;

    let mut objects = Vec::with_capacity(nodes.len() + 1);
    objects.push(tab_object(flow));
    for node in &nodes {
        objects.push(node_object(&flow.id, node)?);
    }
    Ok(objects)
}

/// Build the document sent to the single-flow endpoints
pub fn to_flow_document(flow: &FlowDefinition) -> ApiContractResult<FlowDocument> {
    let mut objects = to_wire(flow)?;
    let nodes = objects.split_off(1);

    Ok(FlowDocument {
        id: flow.id.clone(),
        label: flow.name.clone(),
        info: container_info(flow),
        disabled: flow.disabled,
        nodes,
    })
}

fn container_info(flow: &FlowDefinition) -> Option<String> {
    flow.description
        .clone()
        .or_else(|| flow.info.clone())
        .filter(|info| !info.is_empty())
}

fn tab_object(flow: &FlowDefinition) -> WireObject {
    let mut tab = Map::new();
    tab.insert("id".into(), Value::String(flow.id.clone()));
    tab.insert("type".into(), Value::String(TAB_TYPE.into()));
    tab.insert("label".into(), Value::String(flow.name.clone()));
    if let Some(info) = container_info(flow) {
        tab.insert("info".into(), Value::String(info));
    }
    if flow.disabled {
        tab.insert("disabled".into(), Value::Bool(true));
    }
    tab
}

fn node_object(tab_id: &str, node: &Node) -> ApiContractResult<WireObject> {
    let mut object = Map::new();
    object.insert("id".into(), Value::String(node.id.clone()));
    object.insert("type".into(), Value::String(node.node_type.clone()));
    object.insert("name".into(), Value::String(node.name.clone()));
    object.insert("x".into(), Value::from(node.position.x));
    object.insert("y".into(), Value::from(node.position.y));
    object.insert("z".into(), Value::String(tab_id.to_string()));
    object.insert("wires".into(), serde_json::to_value(&node.wires)?);

    for (key, value) in &node.properties {
        if RESERVED_NODE_KEYS.contains(&key.as_str()) {
            return Err(ApiContractError::ReservedProperty {
                node_id: node.id.clone(),
                key: key.clone(),
            });
        }
        object.insert(key.clone(), value.clone());
    }

    Ok(object)
}

/// Fold the flow's connections into the wires of their source nodes
fn resolve_connections(flow: &FlowDefinition) -> ApiContractResult<Vec<Node>> {
    let mut nodes = flow.nodes.clone();
    for connection in &flow.connections {
        let source = nodes
            .iter_mut()
            .find(|node| node.id == connection.source)
            .ok_or_else(|| ApiContractError::UnknownConnectionSource(connection.source.clone()))?;
        source.add_wire(connection.source_port, connection.target.clone());
    }
    Ok(nodes)
}
