//! Validation helpers for contract types

use std::collections::HashSet;

use validator::Validate;

use crate::error::{ApiContractError, ApiContractResult};
use crate::types::*;

/// Validate a flow before it is sent anywhere
pub fn validate_flow(flow: &FlowDefinition) -> ApiContractResult<()> {
    flow.validate()?;
    Ok(())
}

/// Validate a client configuration, including that the base URL parses
pub fn validate_config(config: &Config) -> ApiContractResult<()> {
    config.validate()?;
    url::Url::parse(&config.base_url)?;
    Ok(())
}

/// Check that node ids are unique and every wire points at a node of the
/// same flow. Deployment does not call this; Node-RED accepts dangling
/// wires and drops them at runtime.
pub fn validate_wiring(flow: &FlowDefinition) -> ApiContractResult<()> {
    let mut ids = HashSet::new();
    for node in &flow.nodes {
        if !ids.insert(node.id.as_str()) {
            return Err(ApiContractError::DuplicateNode(node.id.clone()));
        }
    }

    for node in &flow.nodes {
        for target in node.wires.iter().flatten() {
            if !ids.contains(target.as_str()) {
                return Err(ApiContractError::DanglingWire {
                    source_id: node.id.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    for connection in &flow.connections {
        if !ids.contains(connection.source.as_str()) {
            return Err(ApiContractError::UnknownConnectionSource(
                connection.source.clone(),
            ));
        }
        if !ids.contains(connection.target.as_str()) {
            return Err(ApiContractError::DanglingWire {
                source_id: connection.source.clone(),
                target: connection.target.clone(),
            });
        }
    }

    Ok(())
}
