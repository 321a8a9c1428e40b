use std::sync::Arc;

use autopilot_core::{Multiplexer, SessionName, SessionRecord, WorkItemId};
use tracing::{debug, info, warn};

use crate::table::SessionTable;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The session was killed (or already gone) and its record dropped.
    Removed(SessionRecord),
    /// Nothing to clean up.
    NotFound,
}

/// Tears down a work item's session and forgets its record.
///
/// Killing is best-effort: a session that already exited still has its
/// record removed.
#[derive(Clone)]
pub struct SessionReaper {
    table: SessionTable,
    mux: Arc<dyn Multiplexer>,
}

impl SessionReaper {
    pub fn new(table: SessionTable, mux: Arc<dyn Multiplexer>) -> Self {
        Self { table, mux }
    }

    /// Clean up `work_item`. With `expected` set, only a record for that
    /// session is touched, so a monitor cannot reap a newer launch.
    pub async fn reap(&self, work_item: &WorkItemId, expected: Option<&SessionName>) -> CleanupOutcome {
        let Some(record) = self.table.get(work_item) else {
            debug!(work_item = %work_item, "no session to clean up");
            return CleanupOutcome::NotFound;
        };
        if expected.is_some_and(|name| name != record.session_name()) {
            debug!(
                work_item = %work_item,
                session = %record.session_name(),
                "session was replaced, skipping cleanup"
            );
            return CleanupOutcome::NotFound;
        }

        if let Err(error) = self.mux.kill(&record.handle).await {
            warn!(
                work_item = %work_item,
                session = %record.session_name(),
                error_kind = error.error_kind(),
                error = %error,
                "kill failed, treating session as gone"
            );
        }

        match self.table.remove_session(work_item, record.session_name()) {
            Some(removed) => {
                info!(work_item = %work_item, session = %removed.session_name(), "session cleaned up");
                CleanupOutcome::Removed(removed)
            }
            None => CleanupOutcome::NotFound,
        }
    }
}
