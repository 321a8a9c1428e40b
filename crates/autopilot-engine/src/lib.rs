pub mod cleanup;
pub mod detector;
pub mod error;
pub mod intake;
pub mod launcher;
pub mod monitor;
pub mod prompt;
pub mod table;
pub mod tmux;

pub mod mock;

pub use cleanup::{CleanupOutcome, SessionReaper};
pub use detector::{completion_marker, CompletionDetector, MarkerDetector};
pub use error::LaunchError;
pub use intake::{EventIntake, IntakeOutcome, SkipReason};
pub use launcher::{AgentCommand, LaunchOutcome, SessionLauncher};
pub use monitor::{MonitorOutcome, SessionMonitor, POLL_INTERVAL};
pub use table::{Reservation, SessionTable};
pub use tmux::TmuxMultiplexer;
