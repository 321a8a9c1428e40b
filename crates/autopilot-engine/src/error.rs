use autopilot_core::MuxError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to start agent session: {0}")]
    Spawn(#[from] MuxError),
}

impl LaunchError {
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Spawn(inner) => inner.error_kind(),
        }
    }
}
