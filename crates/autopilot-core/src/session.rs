use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{SessionName, WorkItemId};

/// Lifecycle status of a tracked session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    /// The backing session could no longer be captured.
    Ended,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Ended => "ended",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a background session started by a [`Multiplexer`](crate::Multiplexer).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    #[serde(rename = "session_name")]
    pub name: SessionName,
    /// Pid of the process that created the session, when the OS reported one.
    #[serde(rename = "process_pid")]
    pub pid: Option<u32>,
}

impl SessionHandle {
    pub fn new(name: SessionName, pid: Option<u32>) -> Self {
        Self { name, pid }
    }
}

/// One actively tracked work item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub work_item_id: WorkItemId,
    #[serde(flatten)]
    pub handle: SessionHandle,
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub status: SessionStatus,
}

impl SessionRecord {
    pub fn running(work_item_id: WorkItemId, title: impl Into<String>, handle: SessionHandle) -> Self {
        Self {
            work_item_id,
            handle,
            title: title.into(),
            started_at: Utc::now(),
            status: SessionStatus::Running,
        }
    }

    pub fn session_name(&self) -> &SessionName {
        &self.handle.name
    }
}
