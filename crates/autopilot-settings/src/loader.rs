//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`Settings::default()`]
//! 2. If `$AUTOPILOT_CONFIG` names a file, deep-merge its values over defaults
//! 3. Apply environment variable overrides
//!
//! Loading normally runs before logging is set up, so rejected overrides are
//! returned as [`SettingsWarning`]s for the caller to report.
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{LogFormat, Settings};

/// Env var naming an optional JSON config file.
pub const CONFIG_PATH_ENV: &str = "AUTOPILOT_CONFIG";

/// An override that was present but rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsWarning {
    pub key: String,
    pub value: String,
    pub reason: String,
}

impl SettingsWarning {
    fn new(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SettingsWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ignoring {}={:?}: {}", self.key, self.value, self.reason)
    }
}

/// Resolved settings plus any overrides that were ignored along the way.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub warnings: Vec<SettingsWarning>,
}

/// Load settings from `$AUTOPILOT_CONFIG` (if set) with env var overrides.
pub fn load_settings() -> Result<LoadedSettings> {
    load_settings_with(env_lookup)
}

/// [`load_settings`] reading variables through `lookup` instead of the
/// process environment.
pub fn load_settings_with(lookup: impl Fn(&str) -> Option<String>) -> Result<LoadedSettings> {
    match lookup(CONFIG_PATH_ENV).filter(|v| !v.is_empty()) {
        Some(path) => load_settings_from_path(&PathBuf::from(path), lookup),
        None => {
            let mut settings = Settings::default();
            let warnings = apply_overrides(&mut settings, lookup);
            Ok(LoadedSettings { settings, warnings })
        }
    }
}

/// Load settings from a specific path with overrides read through `lookup`.
///
/// A missing file yields defaults; invalid JSON is an error.
pub fn load_settings_from_path(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<LoadedSettings> {
    let defaults = serde_json::to_value(Settings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading config file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "config file not found, using defaults");
        defaults
    };

    let mut settings: Settings = serde_json::from_value(merged)?;
    let warnings = apply_overrides(&mut settings, lookup);
    Ok(LoadedSettings { settings, warnings })
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply overrides from `lookup` (normally the process environment).
///
/// Empty values are ignored. Invalid numbers and formats leave the
/// file/default value in place and are returned as warnings.
pub fn apply_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<SettingsWarning> {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let mut warnings = Vec::new();

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = read("AUTOPILOT_HOST") {
        settings.server.host = v;
    }
    for key in ["PORT", "AUTOPILOT_PORT"] {
        if let Some(v) = read(key) {
            match parse_u16_range(&v, 1, 65535) {
                Some(port) => settings.server.port = port,
                None => warnings.push(SettingsWarning::new(key, &v, "not a port in 1-65535")),
            }
        }
    }

    // ── Linear ──────────────────────────────────────────────────────
    if let Some(v) = read("LINEAR_API_URL") {
        settings.linear.api_url = v;
    }
    if let Some(v) = read("TARGET_USER") {
        settings.linear.target_user = v;
    }

    // ── Agent ───────────────────────────────────────────────────────
    if let Some(v) = read("AUTOPILOT_TMUX_BIN") {
        settings.agent.tmux_bin = v;
    }
    if let Some(v) = read("AUTOPILOT_AGENT_BIN") {
        settings.agent.agent_bin = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read("AUTOPILOT_LOG_LEVEL") {
        settings.log.level = v;
    }
    if let Some(v) = read("AUTOPILOT_LOG_FORMAT") {
        match v.parse::<LogFormat>() {
            Ok(format) => settings.log.format = format,
            Err(e) => warnings.push(SettingsWarning::new("AUTOPILOT_LOG_FORMAT", &v, e)),
        }
    }

    warnings
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

pub(crate) fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
