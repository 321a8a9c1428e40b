use serde::{Deserialize, Serialize};

/// Default Linear GraphQL endpoint.
pub const DEFAULT_LINEAR_API_URL: &str = "https://api.linear.app/graphql";

/// Default assignee whose issues are picked up.
pub const DEFAULT_TARGET_USER: &str = "arihanvaranasi@gmail.com";

/// Top-level orchestrator settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub server: ServerSettings,
    pub linear: LinearSettings,
    pub agent: AgentSettings,
    pub log: LogSettings,
}

/// HTTP listener settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// Issue tracker settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinearSettings {
    pub api_url: String,
    /// Assignee email (exact, case-sensitive) whose updated issues launch sessions.
    pub target_user: String,
}

impl Default for LinearSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_LINEAR_API_URL.to_string(),
            target_user: DEFAULT_TARGET_USER.to_string(),
        }
    }
}

/// How agent sessions are hosted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSettings {
    /// Terminal multiplexer binary.
    pub tmux_bin: String,
    /// Agent executable.
    pub agent_bin: String,
    /// Arguments placed before the prompt.
    pub agent_args: Vec<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            tmux_bin: "tmux".to_string(),
            agent_bin: "claude".to_string(),
            agent_args: vec![
                "--print".to_string(),
                "--allowedTools".to_string(),
                "all".to_string(),
            ],
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogSettings {
    /// Default filter directive; `RUST_LOG` still wins when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 3001);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.linear.api_url, DEFAULT_LINEAR_API_URL);
        assert_eq!(settings.linear.target_user, DEFAULT_TARGET_USER);
        assert_eq!(settings.agent.tmux_bin, "tmux");
        assert_eq!(settings.agent.agent_bin, "claude");
        assert_eq!(settings.agent.agent_args, vec!["--print", "--allowedTools", "all"]);
        assert_eq!(settings.log.format, LogFormat::Pretty);
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn camel_case_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert!(json["linear"]["apiUrl"].is_string());
        assert!(json["agent"]["tmuxBin"].is_string());
    }
}
