use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::error::LinearError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: serde_json::Value,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>, variables: serde_json::Value) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }
}

/// Executes a GraphQL request and returns its `data` payload.
///
/// Implementations must turn every non-success shape (transport failure,
/// non-2xx status, undecodable body, non-empty `errors`, missing `data`)
/// into an error.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn execute(&self, request: GraphqlRequest) -> Result<serde_json::Value, LinearError>;
}

#[derive(Clone)]
pub struct ReqwestGraphqlTransport {
    endpoint: String,
    token: SecretString,
    client: reqwest::Client,
}

impl fmt::Debug for ReqwestGraphqlTransport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ReqwestGraphqlTransport")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl ReqwestGraphqlTransport {
    pub fn new(endpoint: impl Into<String>, token: SecretString) -> Result<Self, LinearError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("autopilot/linear")
            .build()
            .map_err(|err| LinearError::Network(format!("failed to initialize HTTP client: {err}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            token,
            client,
        })
    }
}

#[async_trait]
impl GraphqlTransport for ReqwestGraphqlTransport {
    async fn execute(&self, request: GraphqlRequest) -> Result<serde_json::Value, LinearError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.token.expose_secret()))
            .json(&json!({
                "query": request.query,
                "variables": request.variables,
            }))
            .send()
            .await
            .map_err(|err| LinearError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| LinearError::Network(format!("failed to read response body: {err}")))?;

        if !status.is_success() {
            return Err(LinearError::Http {
                status: status.as_u16(),
                body: truncate_for_error(&body),
            });
        }

        decode_envelope(&body)
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponseEnvelope {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
}

/// Decode a GraphQL response body into its `data` payload.
pub(crate) fn decode_envelope(body: &str) -> Result<serde_json::Value, LinearError> {
    let envelope: GraphqlResponseEnvelope = serde_json::from_str(body)
        .map_err(|err| LinearError::InvalidResponse(format!("failed to parse response JSON: {err}")))?;

    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
        return Err(LinearError::Graphql(
            errors.into_iter().map(|error| error.message).collect(),
        ));
    }

    match envelope.data {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(LinearError::InvalidResponse(
            "response did not include a data payload".to_owned(),
        )),
    }
}

fn truncate_for_error(body: &str) -> String {
    const MAX_LEN: usize = 200;
    if body.chars().count() <= MAX_LEN {
        body.to_owned()
    } else {
        format!("{}...", body.chars().take(MAX_LEN).collect::<String>())
    }
}
