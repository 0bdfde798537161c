//! Node-RED admin API contract types and validation
//!
//! This crate defines the flow model exchanged with a Node-RED instance,
//! the client configuration, and the translation from the flow model into
//! the flat node list Node-RED stores. These types are shared between the
//! REST client, the mock client and the orchestration layer.

pub mod error;
pub mod types;
pub mod validation;
pub mod wire;

pub use error::*;
pub use types::*;
