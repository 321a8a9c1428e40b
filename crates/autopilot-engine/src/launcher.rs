//! Starts agent sessions for eligible work items.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use autopilot_core::{Multiplexer, SessionName, SessionRecord, WorkItem, WorkItemId};
use autopilot_linear::{DependencyGate, GateVerdict};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument};

use crate::detector::CompletionDetector;
use crate::error::LaunchError;
use crate::monitor::SessionMonitor;
use crate::prompt::build_prompt;
use crate::table::SessionTable;

/// The agent executable and the arguments placed before the prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl AgentCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn args_with_prompt(&self, prompt: String) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.extend(self.args.iter().cloned());
        args.push(prompt);
        args
    }
}

impl Default for AgentCommand {
    fn default() -> Self {
        Self::new(
            "claude",
            vec!["--print".into(), "--allowedTools".into(), "all".into()],
        )
    }
}

/// Result of a launch attempt that did not fail outright.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchOutcome {
    Launched(SessionRecord),
    /// The item already has a session, or another launch for it is in flight.
    AlreadyActive,
    /// The dependency gate refused.
    Blocked(GateVerdict),
}

/// Gate, prompt, start, record, monitor.
pub struct SessionLauncher {
    table: SessionTable,
    gate: Arc<dyn DependencyGate>,
    mux: Arc<dyn Multiplexer>,
    monitor: SessionMonitor,
    command: AgentCommand,
    seq: AtomicU64,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl SessionLauncher {
    pub fn new(
        table: SessionTable,
        gate: Arc<dyn DependencyGate>,
        mux: Arc<dyn Multiplexer>,
        detector: Arc<dyn CompletionDetector>,
        command: AgentCommand,
    ) -> Self {
        let cancel = CancellationToken::new();
        let monitor = SessionMonitor::new(table.clone(), mux.clone(), detector, cancel.clone());
        Self {
            table,
            gate,
            mux,
            monitor,
            command,
            seq: AtomicU64::new(0),
            tracker: TaskTracker::new(),
            cancel,
        }
    }

    pub fn table(&self) -> &SessionTable {
        &self.table
    }

    /// Launch a session for `work_item` unless it is already tracked or blocked.
    ///
    /// The table slot is claimed before the gate is consulted and released
    /// again if the launch does not go through.
    #[instrument(skip_all, fields(work_item_id = %work_item))]
    pub async fn launch(
        &self,
        work_item: &WorkItemId,
        title: &str,
        item: &WorkItem,
    ) -> Result<LaunchOutcome, LaunchError> {
        let Some(reservation) = self.table.try_reserve(work_item) else {
            info!("session already active");
            return Ok(LaunchOutcome::AlreadyActive);
        };

        let verdict = self.gate.check(work_item).await;
        if verdict.is_blocked() {
            info!(verdict = ?verdict, "blocked by dependencies, not launching");
            return Ok(LaunchOutcome::Blocked(verdict));
        }

        let prompt = build_prompt(work_item, title, item.description_or_placeholder());
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let name = SessionName::generate(work_item, chrono::Local::now(), seq);

        let handle = self
            .mux
            .start(&name, &self.command.program, &self.command.args_with_prompt(prompt))
            .await?;

        let record = SessionRecord::running(work_item.clone(), title, handle.clone());
        reservation.commit(record.clone());
        info!(session_name = %name, pid = ?handle.pid, "session launched");

        let monitor = self.monitor.clone();
        let work_item = work_item.clone();
        self.tracker.spawn(async move {
            let outcome = monitor.run(work_item.clone(), handle).await;
            debug!(work_item_id = %work_item, outcome = ?outcome, "monitor finished");
        });

        Ok(LaunchOutcome::Launched(record))
    }

    /// Stop every monitor loop and wait for them to exit. Sessions keep running.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}
