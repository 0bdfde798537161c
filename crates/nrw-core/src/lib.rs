//! Deploy, execute and manage Node-RED flows.
//!
//! [`NodeRedWrapper`] validates its inputs, delegates to a [`FlowApi`]
//! client and brackets every execution with the hooks of an
//! [`ExecutionHandler`]. Workflows in caller-specific formats go through a
//! [`WorkflowConverter`] first.

pub mod converter;
pub mod error;
pub mod executor;
pub mod wrapper;

/// Core result type used throughout the wrapper.
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;

/// Workflow conversion into and out of the flow model.
pub use converter::{ConversionError, DefaultConverter, Workflow, WorkflowConverter};

/// Hooks run around flow execution.
pub use executor::{DefaultExecutor, ExecutionHandler};

/// Orchestration facade.
pub use wrapper::NodeRedWrapper;

pub use nrw_api_contract::{
    Config, Connection, ExecutionResult, FlowDefinition, HealthStatus, LogEntry, Node, Position,
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};
pub use nrw_client_api::{ClientApiError, FlowApi};
