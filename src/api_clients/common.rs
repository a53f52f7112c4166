//! Shared plumbing for the service clients: client construction, URL
//! building, identity headers and response handling.

use reqwest::{header, Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::constants::USER_ID_HEADER;
use crate::error::{HarnessError, HarnessResult};

/// Status and body of a completed call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub operation: String,
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Pass the response through when it carries `expected`
    pub fn ensure_status(self, expected: StatusCode) -> HarnessResult<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            error!(
                operation = %self.operation,
                status = %self.status,
                expected = %expected,
                body = %self.body,
                "Unexpected status"
            );
            Err(HarnessError::unexpected_status(
                self.operation,
                self.status.as_u16(),
                self.body,
            ))
        }
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> HarnessResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            HarnessError::invalid_response(
                self.operation.clone(),
                format!("Failed to parse response body: {e}"),
            )
        })
    }

    /// Decode the body as a JSON array of arbitrary elements
    pub fn json_array(&self) -> HarnessResult<Vec<serde_json::Value>> {
        match serde_json::from_str::<serde_json::Value>(&self.body) {
            Ok(serde_json::Value::Array(items)) => Ok(items),
            Ok(other) => Err(HarnessError::invalid_response(
                self.operation.clone(),
                format!("expected a JSON array, got {}", json_kind(&other)),
            )),
            Err(e) => Err(HarnessError::invalid_response(
                self.operation.clone(),
                format!("Failed to parse response body: {e}"),
            )),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// HTTP client bound to one service base URL
#[derive(Clone)]
pub struct ServiceClient {
    service: &'static str,
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.service)
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &(self.timeout.as_millis() as u64))
            .finish()
    }
}

impl ServiceClient {
    /// Build a client with the request timeout and bearer token applied to
    /// every call
    pub fn new(
        service: &'static str,
        base_url: &str,
        timeout: Duration,
        auth: &AuthConfig,
    ) -> HarnessResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            HarnessError::config_error(format!("Invalid {service} base URL '{base_url}': {e}"))
        })?;

        let mut client_builder = Client::builder()
            .timeout(timeout)
            .user_agent(format!("social-harness/{}", env!("CARGO_PKG_VERSION")));

        if let Some(token) = auth.bearer_token.as_deref().filter(|t| !t.trim().is_empty()) {
            let mut default_headers = header::HeaderMap::new();
            let mut value: header::HeaderValue = bearer_header(token).parse().map_err(|e| {
                HarnessError::config_error(format!("Invalid bearer token: {e}"))
            })?;
            value.set_sensitive(true);
            default_headers.insert(header::AUTHORIZATION, value);
            client_builder = client_builder.default_headers(default_headers);
            debug!(service = service, "Configured Bearer token authentication");
        }

        let client = client_builder.build().map_err(|e| {
            HarnessError::config_error(format!("Failed to create HTTP client: {e}"))
        })?;

        debug!(
            service = service,
            base_url = %base_url,
            timeout_ms = timeout.as_millis() as u64,
            "Created service client"
        );

        Ok(Self {
            service,
            client,
            base_url,
            timeout,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the base URL
    pub fn url(&self, path: &str) -> HarnessResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| HarnessError::config_error(format!("Failed to construct URL: {e}")))
    }

    /// Start a request, optionally acting as `as_user`
    pub fn request(
        &self,
        method: Method,
        url: Url,
        as_user: Option<Uuid>,
    ) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match as_user {
            Some(user_id) => builder.header(USER_ID_HEADER, user_id.to_string()),
            None => builder,
        }
    }

    /// Send a request and capture status and body
    ///
    /// Only transport failures are errors here; status checks belong to the
    /// caller.
    pub async fn execute(
        &self,
        builder: RequestBuilder,
        operation: &str,
    ) -> HarnessResult<ApiResponse> {
        let response = builder.send().await.map_err(|e| {
            error!(
                service = self.service,
                operation = operation,
                error = %e,
                "Request failed"
            );
            HarnessError::Transport(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        debug!(
            service = self.service,
            operation = operation,
            status = %status,
            body_len = body.len(),
            "Request completed"
        );

        Ok(ApiResponse {
            operation: operation.to_string(),
            status,
            body,
        })
    }
}

/// Accept tokens with or without the scheme prefix
fn bearer_header(token: &str) -> String {
    let token = token.trim();
    match token.strip_prefix("Bearer ") {
        Some(raw) => format!("Bearer {}", raw.trim()),
        None => format!("Bearer {token}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            operation: "test".to_string(),
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_bearer_header_normalization() {
        assert_eq!(bearer_header("abc"), "Bearer abc");
        assert_eq!(bearer_header("Bearer abc"), "Bearer abc");
        assert_eq!(bearer_header("  abc "), "Bearer abc");
    }

    #[test]
    fn test_ensure_status() {
        assert!(response(201, "").ensure_status(StatusCode::CREATED).is_ok());

        let err = response(403, "blocked")
            .ensure_status(StatusCode::CREATED)
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::UnexpectedStatus { status: 403, .. }
        ));
    }

    #[test]
    fn test_json_array() {
        assert_eq!(response(200, "[1, 2]").json_array().unwrap().len(), 2);
        assert!(response(200, "{}").json_array().is_err());
        assert!(response(200, "oops").json_array().is_err());
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let err = ServiceClient::new(
            "post",
            "::not-a-url",
            Duration::from_secs(1),
            &AuthConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, HarnessError::Configuration(_)));
    }

    #[test]
    fn test_url_join() {
        let client = ServiceClient::new(
            "post",
            "http://localhost:8081",
            Duration::from_secs(1),
            &AuthConfig::default(),
        )
        .unwrap();
        assert_eq!(
            client.url("/api/posts").unwrap().as_str(),
            "http://localhost:8081/api/posts"
        );
    }
}
