//! Per-session polling loop that watches for the completion marker.

use std::sync::Arc;
use std::time::Duration;

use autopilot_core::{MuxError, Multiplexer, SessionHandle, WorkItemId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cleanup::SessionReaper;
use crate::detector::CompletionDetector;
use crate::table::SessionTable;

/// Delay between two captures of the same session.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Why a monitor loop stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Marker seen; the session was cleaned up.
    Completed,
    /// The session disappeared; its record was marked ended.
    Ended,
    /// The work item no longer maps to the watched session.
    Superseded,
    /// Shutdown was requested.
    Cancelled,
    /// The multiplexer could not be run. The record is left as is.
    Failed(MuxError),
}

#[derive(Clone)]
pub struct SessionMonitor {
    table: SessionTable,
    mux: Arc<dyn Multiplexer>,
    detector: Arc<dyn CompletionDetector>,
    reaper: SessionReaper,
    cancel: CancellationToken,
}

impl SessionMonitor {
    pub fn new(
        table: SessionTable,
        mux: Arc<dyn Multiplexer>,
        detector: Arc<dyn CompletionDetector>,
        cancel: CancellationToken,
    ) -> Self {
        let reaper = SessionReaper::new(table.clone(), mux.clone());
        Self {
            table,
            mux,
            detector,
            reaper,
            cancel,
        }
    }

    /// Poll `handle` until the work item completes, the session goes away,
    /// or the loop is cancelled. The first capture happens immediately.
    pub async fn run(&self, work_item: WorkItemId, handle: SessionHandle) -> MonitorOutcome {
        let session = &handle.name;
        debug!(work_item_id = %work_item, session_name = %session, "monitor started");

        loop {
            if !self.table.is_current(&work_item, session) {
                debug!(work_item_id = %work_item, session_name = %session, "session no longer tracked");
                return MonitorOutcome::Superseded;
            }

            match self.mux.capture(&handle).await {
                Ok(output) => {
                    if self.detector.is_complete(&work_item, &output) {
                        info!(work_item_id = %work_item, session_name = %session, "task complete");
                        self.reaper.reap(&work_item, Some(session)).await;
                        return MonitorOutcome::Completed;
                    }
                }
                Err(e) if e.is_session_gone() => {
                    if !self.table.mark_ended(&work_item, session) {
                        return MonitorOutcome::Superseded;
                    }
                    warn!(
                        work_item_id = %work_item,
                        session_name = %session,
                        error = %e,
                        "session ended without completion marker"
                    );
                    return MonitorOutcome::Ended;
                }
                Err(e) => {
                    error!(
                        work_item_id = %work_item,
                        session_name = %session,
                        error_kind = e.error_kind(),
                        error = %e,
                        "capture failed, stopping monitor"
                    );
                    return MonitorOutcome::Failed(e);
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!(work_item_id = %work_item, session_name = %session, "monitor cancelled");
                    return MonitorOutcome::Cancelled;
                }
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
            }
        }
    }
}
