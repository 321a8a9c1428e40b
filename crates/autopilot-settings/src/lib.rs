//! # autopilot-settings
//!
//! Configuration for the autopilot orchestrator.
//!
//! Settings are resolved from three layers (in priority order):
//! 1. **Compiled defaults**: [`Settings::default()`]
//! 2. **Config file**: JSON at `$AUTOPILOT_CONFIG`, deep-merged over defaults
//! 3. **Environment variables**, highest priority
//!
//! Credentials never pass through the serializable [`Settings`]; they are
//! read from the environment into [`Credentials`] and kept behind
//! [`secrecy::SecretString`].

pub mod credentials;
pub mod errors;
pub mod loader;
pub mod types;

pub use credentials::Credentials;
pub use errors::{Result, SettingsError};
pub use loader::{
    apply_overrides, deep_merge, load_settings, load_settings_from_path, load_settings_with, LoadedSettings,
    SettingsWarning,
};
pub use types::{AgentSettings, LinearSettings, LogFormat, LogSettings, ServerSettings, Settings};
