//! In-memory transport for deterministic tests without network calls.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::LinearError;
use crate::transport::{GraphqlRequest, GraphqlTransport};

/// Transport that answers every request with the same pre-programmed result
/// and records what it was asked.
pub struct StaticTransport {
    response: Result<serde_json::Value, LinearError>,
    requests: Mutex<Vec<GraphqlRequest>>,
}

impl StaticTransport {
    /// Answer with `data` as the GraphQL `data` payload.
    pub fn data(data: serde_json::Value) -> Self {
        Self {
            response: Ok(data),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every request with `error`.
    pub fn error(error: LinearError) -> Self {
        Self {
            response: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer with an issue whose relations are `(type, related identifier, state type)`.
    pub fn relations(relations: &[(&str, &str, &str)]) -> Self {
        let nodes: Vec<serde_json::Value> = relations
            .iter()
            .map(|(kind, identifier, state)| {
                serde_json::json!({
                    "type": kind,
                    "relatedIssue": {"identifier": identifier, "state": {"type": state}}
                })
            })
            .collect();
        Self::data(serde_json::json!({"issue": {"relations": {"nodes": nodes}}}))
    }

    pub fn requests(&self) -> Vec<GraphqlRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl GraphqlTransport for StaticTransport {
    async fn execute(&self, request: GraphqlRequest) -> Result<serde_json::Value, LinearError> {
        self.requests.lock().push(request);
        self.response.clone()
    }
}
