use std::process::Stdio;

use async_trait::async_trait;
use autopilot_core::{MuxError, Multiplexer, SessionHandle, SessionName};
use tokio::process::Command;

/// [`Multiplexer`] backed by the `tmux` CLI.
#[derive(Clone, Debug)]
pub struct TmuxMultiplexer {
    bin: String,
}

impl TmuxMultiplexer {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    async fn run(&self, args: &[&str]) -> Result<String, MuxError> {
        let output = Command::new(&self.bin)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| MuxError::Spawn(format!("{}: {e}", self.bin)))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(MuxError::CommandFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Default for TmuxMultiplexer {
    fn default() -> Self {
        Self::new("tmux")
    }
}

#[async_trait]
impl Multiplexer for TmuxMultiplexer {
    async fn start(
        &self,
        name: &SessionName,
        program: &str,
        args: &[String],
    ) -> Result<SessionHandle, MuxError> {
        let child = Command::new(&self.bin)
            .args(["new-session", "-d", "-s", name.as_str(), program])
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MuxError::Spawn(format!("{}: {e}", self.bin)))?;

        let pid = child.id();

        // `new-session -d` returns once the session exists.
        let output = child
            .wait_with_output()
            .await
            .map_err(|e| MuxError::Spawn(format!("{}: {e}", self.bin)))?;

        if !output.status.success() {
            return Err(MuxError::CommandFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(SessionHandle::new(name.clone(), pid))
    }

    async fn capture(&self, handle: &SessionHandle) -> Result<String, MuxError> {
        self.run(&["capture-pane", "-p", "-t", handle.name.as_str()]).await
    }

    async fn kill(&self, handle: &SessionHandle) -> Result<(), MuxError> {
        self.run(&["kill-session", "-t", handle.name.as_str()]).await.map(|_| ())
    }
}
