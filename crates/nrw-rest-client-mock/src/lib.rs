//! In-memory Node-RED client that records every call

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use nrw_api_contract::*;
use nrw_client_api::{ClientApiError, ClientApiResult, FlowApi};
use serde_json::{Map, Value};

/// A call received by [`MockClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Deploy(FlowDefinition),
    Execute {
        flow_id: String,
        input: Map<String, Value>,
    },
    Get(String),
    Delete(String),
    HealthCheck,
    Authenticate(String),
}

#[derive(Debug, Default)]
pub struct MockClient {
    flows: Mutex<HashMap<String, FlowDefinition>>,
    calls: Mutex<Vec<MockCall>>,
    execution_result: ExecutionResult,
    execution_failure: Option<String>,
    token: Option<String>,
    unhealthy: bool,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `flow` is already deployed
    pub fn with_flow(self, flow: FlowDefinition) -> Self {
        lock(&self.flows).insert(flow.id.clone(), flow);
        self
    }

    /// Result returned by every successful execution
    pub fn with_execution_result(mut self, result: ExecutionResult) -> Self {
        self.execution_result = result;
        self
    }

    /// Make every execution fail with a transport error carrying `message`
    pub fn failing_execution(mut self, message: impl Into<String>) -> Self {
        self.execution_failure = Some(message.into());
        self
    }

    /// Token handed out by `authenticate`; without one authentication fails
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.unhealthy = true;
        self
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Flow currently stored under `flow_id`
    pub fn flow(&self, flow_id: &str) -> Option<FlowDefinition> {
        lock(&self.flows).get(flow_id).cloned()
    }

    fn record(&self, call: MockCall) {
        lock(&self.calls).push(call);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl FlowApi for MockClient {
    async fn deploy_flow(&self, flow: &FlowDefinition) -> ClientApiResult<()> {
        self.record(MockCall::Deploy(flow.clone()));
        wire::to_wire(flow).map_err(|e| ClientApiError::Invalid(e.to_string()))?;
        lock(&self.flows).insert(flow.id.clone(), flow.clone());
        Ok(())
    }

    async fn execute_flow(
        &self,
        flow_id: &str,
        input: &Map<String, Value>,
    ) -> ClientApiResult<ExecutionResult> {
        self.record(MockCall::Execute {
            flow_id: flow_id.to_string(),
            input: input.clone(),
        });
        match &self.execution_failure {
            Some(message) => Err(ClientApiError::Transport {
                operation: "execute flow".to_string(),
                message: message.clone(),
            }),
            None => Ok(self.execution_result.clone()),
        }
    }

    async fn get_flow(&self, flow_id: &str) -> ClientApiResult<FlowDefinition> {
        self.record(MockCall::Get(flow_id.to_string()));
        self.flow(flow_id)
            .ok_or_else(|| ClientApiError::NotFound(flow_id.to_string()))
    }

    async fn delete_flow(&self, flow_id: &str) -> ClientApiResult<()> {
        self.record(MockCall::Delete(flow_id.to_string()));
        lock(&self.flows)
            .remove(flow_id)
            .map(drop)
            .ok_or_else(|| ClientApiError::NotFound(flow_id.to_string()))
    }

    async fn health_check(&self) -> ClientApiResult<()> {
        self.record(MockCall::HealthCheck);
        if self.unhealthy {
            return Err(ClientApiError::Status {
                operation: "check health".to_string(),
                status: 503,
                body: String::new(),
            });
        }
        Ok(())
    }

    async fn authenticate(&self, username: &str, _password: &str) -> ClientApiResult<String> {
        self.record(MockCall::Authenticate(username.to_string()));
        self.token
            .clone()
            .ok_or_else(|| ClientApiError::Auth("no access token in auth response".to_string()))
    }
}
