//! Scriptable in-memory multiplexer for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use autopilot_core::{MuxError, Multiplexer, SessionHandle, SessionName};
use parking_lot::Mutex;

/// A `start` call observed by [`FakeMultiplexer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartCall {
    pub name: SessionName,
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Default)]
struct FakeState {
    starts: Vec<StartCall>,
    start_error: Option<MuxError>,
    captures: VecDeque<Result<String, MuxError>>,
    default_capture: Option<Result<String, MuxError>>,
    capture_count: usize,
    kills: Vec<SessionName>,
    kill_error: Option<MuxError>,
}

/// Multiplexer that never touches the OS.
///
/// `capture` pops scripted results in order and falls back to the default
/// (an empty pane unless overridden) once the script runs out.
#[derive(Default)]
pub struct FakeMultiplexer {
    state: Mutex<FakeState>,
}

impl FakeMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent `start`.
    pub fn fail_start(&self, error: MuxError) {
        self.state.lock().start_error = Some(error);
    }

    /// Queue one `capture` result.
    pub fn push_capture(&self, result: Result<String, MuxError>) {
        self.state.lock().captures.push_back(result);
    }

    /// Result returned once the queue is empty.
    pub fn set_default_capture(&self, result: Result<String, MuxError>) {
        self.state.lock().default_capture = Some(result);
    }

    pub fn fail_kill(&self, error: MuxError) {
        self.state.lock().kill_error = Some(error);
    }

    pub fn starts(&self) -> Vec<StartCall> {
        self.state.lock().starts.clone()
    }

    pub fn start_count(&self) -> usize {
        self.state.lock().starts.len()
    }

    pub fn capture_count(&self) -> usize {
        self.state.lock().capture_count
    }

    pub fn kills(&self) -> Vec<SessionName> {
        self.state.lock().kills.clone()
    }
}

#[async_trait]
impl Multiplexer for FakeMultiplexer {
    async fn start(
        &self,
        name: &SessionName,
        program: &str,
        args: &[String],
    ) -> Result<SessionHandle, MuxError> {
        let mut state = self.state.lock();
        if let Some(error) = state.start_error.clone() {
            return Err(error);
        }
        state.starts.push(StartCall {
            name: name.clone(),
            program: program.to_string(),
            args: args.to_vec(),
        });
        let pid = 10_000 + state.starts.len() as u32;
        Ok(SessionHandle::new(name.clone(), Some(pid)))
    }

    async fn capture(&self, _handle: &SessionHandle) -> Result<String, MuxError> {
        let mut state = self.state.lock();
        state.capture_count += 1;
        match state.captures.pop_front() {
            Some(result) => result,
            None => state
                .default_capture
                .clone()
                .unwrap_or_else(|| Ok(String::new())),
        }
    }

    async fn kill(&self, handle: &SessionHandle) -> Result<(), MuxError> {
        let mut state = self.state.lock();
        state.kills.push(handle.name.clone());
        match state.kill_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
