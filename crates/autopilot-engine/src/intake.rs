//! Filters inbound tracker events and hands eligible ones to the launcher.

use std::sync::Arc;

use autopilot_core::WebhookEvent;
use tracing::{debug, error, info, warn};

use crate::error::LaunchError;
use crate::launcher::{LaunchOutcome, SessionLauncher};

/// Why an event was ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NotIssueUpdate,
    NotTargetAssignee,
    MissingIdentifier,
    /// An issue update whose `data` does not decode as an issue.
    MalformedIssue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntakeOutcome {
    Skipped(SkipReason),
    Dispatched(LaunchOutcome),
    LaunchFailed(LaunchError),
}

pub struct EventIntake {
    launcher: Arc<SessionLauncher>,
    target_user: String,
}

impl EventIntake {
    pub fn new(launcher: Arc<SessionLauncher>, target_user: impl Into<String>) -> Self {
        Self {
            launcher,
            target_user: target_user.into(),
        }
    }

    pub fn launcher(&self) -> &Arc<SessionLauncher> {
        &self.launcher
    }

    /// Decode the envelope of a raw webhook body. Only a body that is not a
    /// JSON object with string `type`/`action` is an error; `data` is decoded
    /// later and only for issue updates.
    pub fn parse(body: &[u8]) -> Result<WebhookEvent, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Run one event through the pipeline. Every business outcome is logged
    /// and returned; none of them is an error to the caller.
    pub async fn handle(&self, event: WebhookEvent) -> IntakeOutcome {
        if !event.is_issue_update() {
            debug!(event_type = ?event.event_type, action = ?event.action, "ignoring event");
            return IntakeOutcome::Skipped(SkipReason::NotIssueUpdate);
        }

        let item = match event.work_item() {
            Ok(Some(item)) => item,
            Ok(None) => {
                debug!("issue update without data");
                return IntakeOutcome::Skipped(SkipReason::NotTargetAssignee);
            }
            Err(e) => {
                warn!(error = %e, "issue update with malformed data, skipping");
                return IntakeOutcome::Skipped(SkipReason::MalformedIssue);
            }
        };
        if item.assignee_email() != Some(self.target_user.as_str()) {
            debug!(assignee = ?item.assignee_email(), "issue not assigned to target user");
            return IntakeOutcome::Skipped(SkipReason::NotTargetAssignee);
        }

        let Some(work_item) = item.identifier.clone() else {
            info!("issue assigned to target user has no identifier, skipping");
            return IntakeOutcome::Skipped(SkipReason::MissingIdentifier);
        };

        info!(work_item_id = %work_item, title = item.title_or_empty(), "issue assigned to target user");
        match self.launcher.launch(&work_item, item.title_or_empty(), &item).await {
            Ok(outcome) => IntakeOutcome::Dispatched(outcome),
            Err(e) => {
                error!(
                    work_item_id = %work_item,
                    error_kind = e.error_kind(),
                    error = %e,
                    "failed to launch session"
                );
                IntakeOutcome::LaunchFailed(e)
            }
        }
    }
}
