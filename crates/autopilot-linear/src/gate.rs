//! Dependency gate: decides whether a work item may start.
//!
//! The gate fails closed. Anything short of a well-formed answer in which
//! every `blocks` relation points at a completed or canceled issue counts
//! as blocked.

use async_trait::async_trait;
use autopilot_core::WorkItemId;
use tracing::{debug, warn};

use crate::client::{IssueRelation, LinearClient};
use crate::error::LinearError;

const BLOCKING_RELATION: &str = "blocks";
const RESOLVED_STATES: &[&str] = &["completed", "canceled"];

/// Outcome of a dependency check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateVerdict {
    /// Every blocking relation is resolved.
    Clear,
    /// At least one blocking relation is unresolved.
    Blocked { blockers: Vec<String> },
    /// The issue store could not answer; treated as blocked.
    Unavailable(LinearError),
}

impl GateVerdict {
    pub fn is_blocked(&self) -> bool {
        !matches!(self, Self::Clear)
    }

    /// Evaluate a set of relations.
    pub fn from_relations(relations: &[IssueRelation]) -> Self {
        let blockers: Vec<String> = relations
            .iter()
            .filter(|relation| relation.kind == BLOCKING_RELATION)
            .filter(|relation| !is_resolved(relation))
            .map(|relation| {
                relation
                    .related
                    .as_ref()
                    .and_then(|issue| issue.identifier.clone())
                    .unwrap_or_else(|| "<unknown>".to_string())
            })
            .collect();

        if blockers.is_empty() {
            Self::Clear
        } else {
            Self::Blocked { blockers }
        }
    }
}

fn is_resolved(relation: &IssueRelation) -> bool {
    relation
        .related
        .as_ref()
        .and_then(|issue| issue.state.as_ref())
        .and_then(|state| state.kind.as_deref())
        .is_some_and(|kind| RESOLVED_STATES.contains(&kind))
}

/// Answers whether a work item is currently blocked by prerequisites.
#[async_trait]
pub trait DependencyGate: Send + Sync {
    async fn check(&self, work_item: &WorkItemId) -> GateVerdict;
}

/// Gate backed by the Linear relations query.
pub struct LinearDependencyGate {
    client: LinearClient,
}

impl LinearDependencyGate {
    pub fn new(client: LinearClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DependencyGate for LinearDependencyGate {
    async fn check(&self, work_item: &WorkItemId) -> GateVerdict {
        match self.client.issue_relations(work_item).await {
            Ok(relations) => {
                let verdict = GateVerdict::from_relations(&relations);
                debug!(work_item_id = %work_item, relations = relations.len(), blocked = verdict.is_blocked(), "dependency check");
                verdict
            }
            Err(error) => {
                warn!(
                    work_item_id = %work_item,
                    error = %error,
                    kind = error.error_kind(),
                    "dependency check failed, treating as blocked"
                );
                GateVerdict::Unavailable(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::StaticTransport;
    use std::sync::Arc;

    fn gate(transport: StaticTransport) -> LinearDependencyGate {
        LinearDependencyGate::new(LinearClient::new(Arc::new(transport)))
    }

    fn id() -> WorkItemId {
        WorkItemId::from_raw("ENG-1")
    }

    #[tokio::test]
    async fn no_relations_is_clear() {
        let verdict = gate(StaticTransport::relations(&[])).check(&id()).await;
        assert_eq!(verdict, GateVerdict::Clear);
    }

    #[tokio::test]
    async fn resolved_blockers_are_clear() {
        let verdict = gate(StaticTransport::relations(&[
            ("blocks", "ENG-2", "completed"),
            ("blocks", "ENG-3", "canceled"),
        ]))
        .check(&id())
        .await;
        assert_eq!(verdict, GateVerdict::Clear);
    }

    #[tokio::test]
    async fn unresolved_blocker_blocks() {
        let verdict = gate(StaticTransport::relations(&[
            ("blocks", "ENG-2", "completed"),
            ("blocks", "ENG-3", "started"),
            ("blocks", "ENG-4", "backlog"),
        ]))
        .check(&id())
        .await;
        assert_eq!(
            verdict,
            GateVerdict::Blocked {
                blockers: vec!["ENG-3".into(), "ENG-4".into()]
            }
        );
        assert!(verdict.is_blocked());
    }

    #[tokio::test]
    async fn non_blocking_relations_are_ignored() {
        let verdict = gate(StaticTransport::relations(&[
            ("related", "ENG-5", "started"),
            ("duplicate", "ENG-6", "unstarted"),
        ]))
        .check(&id())
        .await;
        assert_eq!(verdict, GateVerdict::Clear);
    }

    #[tokio::test]
    async fn blocker_without_state_blocks() {
        let verdict = gate(StaticTransport::data(serde_json::json!({
            "issue": {"relations": {"nodes": [{"type": "blocks", "relatedIssue": null}]}}
        })))
        .check(&id())
        .await;
        assert_eq!(
            verdict,
            GateVerdict::Blocked {
                blockers: vec!["<unknown>".into()]
            }
        );
    }

    #[tokio::test]
    async fn graphql_errors_fail_closed() {
        let verdict = gate(StaticTransport::error(LinearError::Graphql(vec!["boom".into()])))
            .check(&id())
            .await;
        assert!(verdict.is_blocked());
        assert!(matches!(verdict, GateVerdict::Unavailable(LinearError::Graphql(_))));
    }

    #[tokio::test]
    async fn malformed_body_fails_closed() {
        let verdict = gate(StaticTransport::data(serde_json::json!({"issue": {"relations": 42}})))
            .check(&id())
            .await;
        assert!(matches!(verdict, GateVerdict::Unavailable(LinearError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn network_errors_fail_closed() {
        let verdict = gate(StaticTransport::error(LinearError::Network("timed out".into())))
            .check(&id())
            .await;
        assert!(verdict.is_blocked());
    }

    #[tokio::test]
    async fn end_to_end_over_http_fails_closed_on_error_list() {
        use crate::transport::ReqwestGraphqlTransport;
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errors": [{"message": "Authentication required"}]
            })))
            .mount(&server)
            .await;

        let transport =
            ReqwestGraphqlTransport::new(server.uri(), secrecy::SecretString::from("t")).unwrap();
        let gate = LinearDependencyGate::new(LinearClient::new(Arc::new(transport)));
        assert!(gate.check(&id()).await.is_blocked());
    }
}
