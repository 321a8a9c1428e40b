use std::sync::Arc;

use autopilot_core::WorkItemId;
use serde::Deserialize;
use serde_json::json;

use crate::error::LinearError;
use crate::transport::{GraphqlRequest, GraphqlTransport};

const ISSUE_RELATIONS_QUERY: &str = r#"
query IssueRelations($issueId: String!) {
  issue(id: $issueId) {
    relations {
      nodes {
        type
        relatedIssue {
          identifier
          state {
            type
          }
        }
      }
    }
  }
}
"#;

/// One typed edge from an issue to another issue.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct IssueRelation {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "relatedIssue", default)]
    pub related: Option<RelatedIssue>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RelatedIssue {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub state: Option<IssueState>,
}

/// Workflow state of an issue; `kind` is Linear's state category
/// (`backlog`, `unstarted`, `started`, `completed`, `canceled`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct IssueState {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssueRelationsResponse {
    issue: Option<IssueNode>,
}

#[derive(Debug, Deserialize)]
struct IssueNode {
    relations: RelationConnection,
}

#[derive(Debug, Deserialize)]
struct RelationConnection {
    nodes: Vec<IssueRelation>,
}

/// Typed queries against the Linear API.
#[derive(Clone)]
pub struct LinearClient {
    transport: Arc<dyn GraphqlTransport>,
}

impl LinearClient {
    pub fn new(transport: Arc<dyn GraphqlTransport>) -> Self {
        Self { transport }
    }

    /// Fetch an issue's outbound relations with each related issue's state.
    pub async fn issue_relations(&self, issue_id: &WorkItemId) -> Result<Vec<IssueRelation>, LinearError> {
        let data = self
            .transport
            .execute(GraphqlRequest::new(
                ISSUE_RELATIONS_QUERY,
                json!({ "issueId": issue_id.as_str() }),
            ))
            .await?;

        let response: IssueRelationsResponse = serde_json::from_value(data)
            .map_err(|err| LinearError::InvalidResponse(format!("unexpected relations shape: {err}")))?;

        let issue = response
            .issue
            .ok_or_else(|| LinearError::InvalidResponse(format!("issue {issue_id} not found")))?;

        Ok(issue.relations.nodes)
    }
}
