//! Work items as delivered by the issue tracker's webhooks.

use serde::{Deserialize, Serialize};

use crate::ids::WorkItemId;

/// Placeholder used when a work item carries no description.
pub const NO_DESCRIPTION: &str = "No description provided";

/// The person a work item is assigned to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Issue payload carried in `data` of an issue webhook.
///
/// Only the fields the orchestrator reads are typed; everything else the
/// tracker sends is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    #[serde(default)]
    pub identifier: Option<WorkItemId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<Assignee>,
}

impl WorkItem {
    pub fn assignee_email(&self) -> Option<&str> {
        self.assignee.as_ref()?.email.as_deref()
    }

    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn description_or_placeholder(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_DESCRIPTION)
    }
}

/// Envelope of an inbound tracker webhook.
///
/// `data` stays untyped until the event is known to be an issue update;
/// other event kinds carry payloads of their own shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl WebhookEvent {
    pub fn is_issue_update(&self) -> bool {
        self.event_type.as_deref() == Some("Issue") && self.action.as_deref() == Some("update")
    }

    /// Decode `data` as an issue. A missing or null `data` is `Ok(None)`.
    pub fn work_item(&self) -> Result<Option<WorkItem>, serde_json::Error> {
        match &self.data {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(data) => WorkItem::deserialize(data).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_issue_update() {
        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "type": "Issue",
            "action": "update",
            "createdAt": "2026-10-16T09:00:00.000Z",
            "data": {
                "id": "7c1f",
                "identifier": "ENG-1",
                "title": "Add metrics",
                "assignee": {"id": "u1", "name": "Ari", "email": "ari@example.com"},
                "priority": 2
            }
        }))
        .unwrap();

        assert!(event.is_issue_update());
        let data = event.work_item().unwrap().unwrap();
        assert_eq!(data.identifier, Some(WorkItemId::from_raw("ENG-1")));
        assert_eq!(data.assignee_email(), Some("ari@example.com"));
        assert_eq!(data.description_or_placeholder(), NO_DESCRIPTION);
    }

    #[test]
    fn other_actions_are_not_updates() {
        let event: WebhookEvent =
            serde_json::from_value(serde_json::json!({"type": "Issue", "action": "create"})).unwrap();
        assert!(!event.is_issue_update());

        let event: WebhookEvent =
            serde_json::from_value(serde_json::json!({"type": "Comment", "action": "update"})).unwrap();
        assert!(!event.is_issue_update());
    }

    #[test]
    fn null_assignee_has_no_email() {
        let item: WorkItem =
            serde_json::from_value(serde_json::json!({"identifier": "ENG-2", "assignee": null})).unwrap();
        assert_eq!(item.assignee_email(), None);
        assert_eq!(item.title_or_empty(), "");
    }

    #[test]
    fn foreign_data_shapes_parse_as_envelope() {
        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "type": "Project",
            "action": "update",
            "data": {"title": {"rich": true}, "assignee": "u1"}
        }))
        .unwrap();
        assert!(!event.is_issue_update());
        assert!(event.work_item().is_err());
    }

    #[test]
    fn wrongly_typed_issue_data_fails_to_decode() {
        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "type": "Issue",
            "action": "update",
            "data": "not an object"
        }))
        .unwrap();
        assert!(event.work_item().is_err());
    }

    #[test]
    fn null_data_is_no_work_item() {
        let event: WebhookEvent =
            serde_json::from_value(serde_json::json!({"type": "Issue", "action": "update", "data": null}))
                .unwrap();
        assert_eq!(event.work_item().unwrap(), None);
    }
}
