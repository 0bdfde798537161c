//! Main REST API client implementation

use std::sync::{Arc, PoisonError, RwLock};

use nrw_api_contract::validation::validate_config;
use nrw_api_contract::wire::{to_flow_document, FlowDocument};
use nrw_api_contract::*;
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

use crate::auth::AuthMethod;
use crate::error::{RestClientError, RestClientResult};

/// REST client for a Node-RED instance.
///
/// Clones share the HTTP connection pool and the bearer token, so a token
/// obtained through [`RestClient::authenticate`] on one clone is used by all
/// of them. The token is swapped under a lock that is never held across a
/// request; a call racing with `authenticate` may still go out with the old
/// token.
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: HttpClient,
    base_url: Url,
    auth: Arc<RwLock<AuthMethod>>,
    debug: bool,
}

impl RestClient {
    /// Create a new REST client.
    ///
    /// The base URL must be an absolute URL such as `http://host:1880`;
    /// scheme-less values like `localhost:1880` are rejected. A zero timeout
    /// disables the request timeout.
    pub fn new(config: &Config) -> RestClientResult<Self> {
        validate_config(config).map_err(|e| RestClientError::Config(e.to_string()))?;

        let base_url = Url::parse(config.base_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(RestClientError::Config(format!(
                "base URL must be an absolute URL: {}",
                config.base_url
            )));
        }

        let mut builder =
            HttpClient::builder().user_agent(concat!("nrw/", env!("CARGO_PKG_VERSION")));
        if !config.timeout.is_zero() {
            builder = builder.timeout(config.timeout);
        }
        let http_client = builder
            .build()
            .map_err(|source| RestClientError::transport("build HTTP client", source))?;

        Ok(Self {
            http_client,
            base_url,
            auth: Arc::new(RwLock::new(AuthMethod::from_token(config.api_key.as_deref()))),
            debug: config.debug,
        })
    }

    /// Create a client for `base_url` with default settings
    pub fn from_url(base_url: &str) -> RestClientResult<Self> {
        Self::new(&Config::new(base_url))
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current bearer token, if any
    pub fn bearer_token(&self) -> Option<String> {
        self.auth_method().token().map(str::to_string)
    }

    /// Replace the authentication used for subsequent requests
    pub fn set_auth(&self, auth: AuthMethod) {
        *self.auth.write().unwrap_or_else(PoisonError::into_inner) = auth;
    }

    /// Deploy a flow.
    ///
    /// The flow is first updated in place with `PUT /flow/{id}`. When Node-RED
    /// answers 404 the same document is posted to `/flow` to create it.
    pub async fn deploy_flow(&self, flow: &FlowDefinition) -> RestClientResult<()> {
        let document = to_flow_document(flow)?;
        let url = self.endpoint(&["flow", &flow.id])?;

        let response = self
            .send(Method::PUT, url, Some(&document), "deploy flow")
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(flow_id = %flow.id, "flow not found, creating it");
            return self.create_flow(&document).await;
        }

        self.expect_ok(response, "deploy flow").await?;
        info!(flow_id = %flow.id, nodes = document.nodes.len(), "flow updated");
        Ok(())
    }

    async fn create_flow(&self, document: &FlowDocument) -> RestClientResult<()> {
        let url = self.endpoint(&["flow"])?;
        let response = self
            .send(Method::POST, url, Some(document), "create flow")
            .await?;

        self.expect_ok(response, "create flow").await?;
        info!(flow_id = %document.id, nodes = document.nodes.len(), "flow created");
        Ok(())
    }

    /// Trigger a flow execution with an arbitrary JSON input.
    ///
    /// The response body is decoded as the execution result whatever the
    /// status; a non-200 body that does not decode is reported as a status
    /// error.
    pub async fn execute_flow(
        &self,
        flow_id: &str,
        input: &Map<String, Value>,
    ) -> RestClientResult<ExecutionResult> {
        let url = self.endpoint(&["flows", flow_id, "execute"])?;
        let response = self
            .send(Method::POST, url, Some(input), "execute flow")
            .await?;

        let status = response.status();
        let text = Self::read_body(response, "execute flow").await?;
        match serde_json::from_str(&text) {
            Ok(result) => Ok(result),
            Err(_) if status != StatusCode::OK => Err(RestClientError::Status {
                operation: "execute flow",
                status,
                body: text,
            }),
            Err(source) => Err(RestClientError::Decode {
                operation: "execute flow",
                source,
            }),
        }
    }

    /// Retrieve a deployed flow
    pub async fn get_flow(&self, flow_id: &str) -> RestClientResult<FlowDefinition> {
        let url = self.endpoint(&["flows", flow_id])?;
        let response = self.send::<()>(Method::GET, url, None, "get flow").await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RestClientError::NotFound {
                flow_id: flow_id.to_string(),
            });
        }

        let response = self.ok_response(response, "get flow").await?;
        Self::read_json(response, "get flow").await
    }

    /// Remove a flow
    pub async fn delete_flow(&self, flow_id: &str) -> RestClientResult<()> {
        let url = self.endpoint(&["flows", flow_id])?;
        let response = self
            .send::<()>(Method::DELETE, url, None, "delete flow")
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RestClientError::NotFound {
                flow_id: flow_id.to_string(),
            });
        }

        self.expect_ok(response, "delete flow").await?;
        info!(flow_id, "flow deleted");
        Ok(())
    }

    /// Check that Node-RED answers its health endpoint with 200
    pub async fn health_check(&self) -> RestClientResult<()> {
        let url = self.endpoint(&["health"])?;
        let response = self
            .send::<()>(Method::GET, url, None, "check health")
            .await?;
        self.expect_ok(response, "check health").await
    }

    /// Exchange admin credentials for an access token.
    ///
    /// On success the token replaces the bearer token of this client and of
    /// every clone sharing it.
    pub async fn authenticate(&self, username: &str, password: &str) -> RestClientResult<String> {
        let url = self.endpoint(&["auth", "token"])?;
        let request = TokenRequest::password(username, password);
        let response = self
            .send(Method::POST, url, Some(&request), "authenticate")
            .await?;

        let response = self.ok_response(response, "authenticate").await?;
        let token: AuthToken = Self::read_json(response, "authenticate").await?;
        if token.access_token.is_empty() {
            return Err(RestClientError::Auth(
                "no access token in auth response".to_string(),
            ));
        }

        self.set_auth(AuthMethod::bearer(token.access_token.clone()));
        debug!(token_type = ?token.token_type, expires_in = ?token.expires_in, "authenticated");
        Ok(token.access_token)
    }

    // Private helper methods

    fn auth_method(&self) -> AuthMethod {
        self.auth
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn endpoint(&self, segments: &[&str]) -> RestClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RestClientError::Config(format!("invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        operation: &'static str,
    ) -> RestClientResult<Response> {
        if self.debug {
            let payload = body
                .and_then(|body| serde_json::to_string(body).ok())
                .unwrap_or_default();
            debug!(%method, %url, %payload, "{}", operation);
        }

        let headers = self
            .auth_method()
            .headers()
            .map_err(|e| RestClientError::Auth(e.to_string()))?;

        let mut request = self.http_client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|source| RestClientError::transport(operation, source))
    }

    async fn ok_response(
        &self,
        response: Response,
        operation: &'static str,
    ) -> RestClientResult<Response> {
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response);
        }

        let body = Self::read_body(response, operation).await?;
        if self.debug {
            debug!(%status, %body, "{} rejected", operation);
        }
        Err(RestClientError::Status {
            operation,
            status,
            body,
        })
    }

    async fn expect_ok(&self, response: Response, operation: &'static str) -> RestClientResult<()> {
        self.ok_response(response, operation).await.map(drop)
    }

    async fn read_body(response: Response, operation: &'static str) -> RestClientResult<String> {
        response
            .text()
            .await
            .map_err(|source| RestClientError::transport(operation, source))
    }

    async fn read_json<T: DeserializeOwned>(
        response: Response,
        operation: &'static str,
    ) -> RestClientResult<T> {
        let text = Self::read_body(response, operation).await?;
        serde_json::from_str(&text).map_err(|source| RestClientError::Decode { operation, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrw_client_api::ClientApiError;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_flow() -> FlowDefinition {
        FlowDefinition::new("flow-1", "Greeting")
            .with_node(
                Node::new("inject-1", "inject")
                    .with_property("payloadType", "json")
                    .wired_to(0, "debug-1"),
            )
            .with_node(Node::new("debug-1", "debug"))
    }

    fn client_for(server: &MockServer) -> RestClient {
        RestClient::from_url(&server.uri()).unwrap()
    }

    #[test]
    fn test_client_creation() {
        assert!(matches!(
            RestClient::new(&Config::new("")),
            Err(RestClientError::Config(_))
        ));
        assert!(matches!(
            RestClient::new(&Config::new("   ")),
            Err(RestClientError::Config(_))
        ));
        assert!(matches!(
            RestClient::from_url("not a url"),
            Err(RestClientError::Config(_))
        ));

        let client = RestClient::new(&Config::new("http://localhost:1880").with_api_key("k")).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:1880/");
        assert_eq!(client.bearer_token().as_deref(), Some("k"));
    }

    #[test]
    fn test_scheme_less_base_url_is_rejected() {
        // parses as scheme "localhost" with an opaque path
        match RestClient::from_url("localhost:1880") {
            Err(RestClientError::Config(message)) => {
                assert_eq!(message, "base URL must be an absolute URL: localhost:1880");
            }
            other => panic!("expected Config error, got {:?}", other.map(|_| ())),
        }
        assert!(RestClient::from_url("http://localhost:1880").is_ok());
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_escapes_ids() {
        let client = RestClient::from_url("http://localhost:1880/red/").unwrap();

        let url = client.endpoint(&["flows", "a b", "execute"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:1880/red/flows/a%20b/execute");

        let url = client.endpoint(&["health"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:1880/red/health");
    }

    #[tokio::test]
    async fn test_deploy_updates_existing_flow() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/flow/flow-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/flow"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        client_for(&server).deploy_flow(&sample_flow()).await.unwrap();
    }

    #[tokio::test]
    async fn test_deploy_falls_back_to_create_on_404() {
        let server = MockServer::start().await;
        let document = serde_json::to_value(to_flow_document(&sample_flow()).unwrap()).unwrap();

        Mock::given(method("PUT"))
            .and(path("/flow/flow-1"))
            .and(body_json(&document))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/flow"))
            .and(body_json(&document))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).deploy_flow(&sample_flow()).await.unwrap();
    }

    #[tokio::test]
    async fn test_deploy_reports_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/flow/flow-1"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid flow"))
            .mount(&server)
            .await;

        let err = client_for(&server).deploy_flow(&sample_flow()).await.unwrap_err();
        match err {
            RestClientError::Status {
                operation,
                status,
                body,
            } => {
                assert_eq!(operation, "deploy flow");
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body, "invalid flow");
            }
            other => panic!("expected Status, got: {other}"),
        }
    }

    #[tokio::test]
    async fn test_create_failure_after_404() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/flow"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).deploy_flow(&sample_flow()).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to create flow: status 500, body: boom");
        assert_eq!(
            ClientApiError::from(err).to_string(),
            "failed to create flow: status 500, body: boom"
        );
    }

    #[tokio::test]
    async fn test_deploy_rejects_reserved_property_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let flow = FlowDefinition::new("flow-1", "Bad")
            .with_node(Node::new("n1", "inject").with_property("z", "other-tab"));

        let err = client_for(&server).deploy_flow(&flow).await.unwrap_err();
        assert!(matches!(err, RestClientError::Contract(_)));
    }

    #[tokio::test]
    async fn test_execute_decodes_result_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flows/flow-1/execute"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_json(json!({"message": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "execution_id": "exec-1",
                "success": true,
                "output": {"payload": "HI"},
                "logs": [{"level": "info", "message": "done", "node_id": "fn-1"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = RestClient::new(&Config::new(server.uri()).with_api_key("sk-test")).unwrap();
        let mut input = Map::new();
        input.insert("message".into(), json!("hi"));

        let result = client.execute_flow("flow-1", &input).await.unwrap();
        assert_eq!(result.execution_id, "exec-1");
        assert!(result.success);
        assert_eq!(result.output["payload"], "HI");
        assert_eq!(result.logs[0].node_id.as_deref(), Some("fn-1"));
    }

    #[tokio::test]
    async fn test_execute_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flows/flow-1/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .execute_flow("flow-1", &Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RestClientError::Decode { operation: "execute flow", .. }));
    }

    #[tokio::test]
    async fn test_execute_failure_with_null_fields_keeps_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flows/flow-1/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "execution_id": "exec-2",
                "success": false,
                "output": null,
                "error": "boom",
                "logs": null
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .execute_flow("flow-1", &Map::new())
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert!(result.output.is_empty());
        assert!(result.logs.is_empty());
    }

    #[tokio::test]
    async fn test_get_flow_with_null_node_properties() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flows/flow-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "flow-1",
                "label": "Greeting",
                "nodes": [{"id": "debug-1", "type": "debug", "properties": null, "wires": null}]
            })))
            .mount(&server)
            .await;

        let flow = client_for(&server).get_flow("flow-1").await.unwrap();
        assert_eq!(flow.nodes.len(), 1);
        assert!(flow.nodes[0].properties.is_empty());
        assert!(flow.nodes[0].wires.is_empty());
    }

    #[tokio::test]
    async fn test_requests_without_token_carry_no_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        client_for(&server).health_check().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_get_flow() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flows/flow-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "flow-1",
                "label": "Greeting",
                "nodes": [{"id": "inject-1", "type": "inject", "wires": [["debug-1"]]}]
            })))
            .mount(&server)
            .await;

        let flow = client_for(&server).get_flow("flow-1").await.unwrap();
        assert_eq!(flow.id, "flow-1");
        assert_eq!(flow.nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_get_and_delete_not_found() {
        let server = MockServer::start().await;
        Mock::given(path("/flows/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_flow("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "flow not found: missing");

        let err = client.delete_flow("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_and_delete_other_status() {
        let server = MockServer::start().await;
        Mock::given(path("/flows/flow-1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_flow("flow-1").await.unwrap_err();
        assert!(matches!(err, RestClientError::Status { operation: "get flow", .. }));

        let err = client.delete_flow("flow-1").await.unwrap_err();
        assert!(matches!(err, RestClientError::Status { operation: "delete flow", .. }));
    }

    #[tokio::test]
    async fn test_delete_flow() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/flows/flow-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete_flow("flow-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_health_check_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).health_check().await.unwrap_err();
        assert!(matches!(
            err,
            RestClientError::Status { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn test_authenticate_stores_token_for_later_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .and(body_json(json!({
                "client_id": "node-red-admin",
                "grant_type": "password",
                "scope": "*",
                "username": "admin",
                "password": "secret"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "fresh-token",
                "token_type": "Bearer",
                "expires_in": 604800
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .and(header("Authorization", "Bearer fresh-token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let shared = client.clone();

        let token = client.authenticate("admin", "secret").await.unwrap();
        assert_eq!(token, "fresh-token");
        assert_eq!(shared.bearer_token().as_deref(), Some("fresh-token"));

        shared.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_authenticate_without_token_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.authenticate("admin", "secret").await.unwrap_err();
        assert!(matches!(err, RestClientError::Auth(_)));
        assert!(client.bearer_token().is_none());
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = Config::new(server.uri()).with_timeout(Duration::from_millis(50));
        let err = RestClient::new(&config).unwrap().health_check().await.unwrap_err();
        assert!(matches!(err, RestClientError::Timeout { operation: "check health" }));
    }

    #[tokio::test]
    async fn test_zero_timeout_means_no_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(50)))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config::new(server.uri()).with_timeout(Duration::ZERO);
        RestClient::new(&config).unwrap().health_check().await.unwrap();
    }
}
