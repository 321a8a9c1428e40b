//! Capability interface over the terminal multiplexer that hosts agent sessions.

use async_trait::async_trait;

use crate::ids::SessionName;
use crate::session::SessionHandle;

/// Errors reported by a [`Multiplexer`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MuxError {
    /// The multiplexer ran but reported failure, e.g. the named session
    /// does not exist (any more).
    #[error("multiplexer exited with status {code:?}: {stderr}")]
    CommandFailed { code: Option<i32>, stderr: String },

    /// The multiplexer binary itself could not be executed.
    #[error("failed to run multiplexer: {0}")]
    Spawn(String),
}

impl MuxError {
    /// True when the failure means the session is no longer reachable.
    pub fn is_session_gone(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::CommandFailed { .. } => "command_failed",
            Self::Spawn(_) => "spawn",
        }
    }
}

/// Starts, inspects and terminates named background sessions.
#[async_trait]
pub trait Multiplexer: Send + Sync {
    /// Start a detached session named `name` running `program` with `args`.
    async fn start(
        &self,
        name: &SessionName,
        program: &str,
        args: &[String],
    ) -> Result<SessionHandle, MuxError>;

    /// Return the session's currently visible output.
    async fn capture(&self, handle: &SessionHandle) -> Result<String, MuxError>;

    /// Terminate the session. Killing a session that is already gone may
    /// return an error; callers treat that as done.
    async fn kill(&self, handle: &SessionHandle) -> Result<(), MuxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failure_means_session_gone() {
        let err = MuxError::CommandFailed {
            code: Some(1),
            stderr: "can't find session".into(),
        };
        assert!(err.is_session_gone());
        assert_eq!(err.error_kind(), "command_failed");
    }

    #[test]
    fn spawn_failure_is_not_session_gone() {
        let err = MuxError::Spawn("No such file or directory".into());
        assert!(!err.is_session_gone());
        assert!(err.to_string().contains("No such file"));
    }
}
