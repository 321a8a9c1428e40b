use std::sync::Arc;

use anyhow::Context;
use autopilot_core::Multiplexer;
use autopilot_engine::{AgentCommand, EventIntake, MarkerDetector, SessionLauncher, SessionTable, TmuxMultiplexer};
use autopilot_linear::{LinearClient, LinearDependencyGate, ReqwestGraphqlTransport};
use autopilot_server::{AppState, ServerConfig};
use autopilot_settings::{Credentials, LoadedSettings, LogFormat, Settings};
use autopilot_telemetry::{init_telemetry, TelemetryConfig};
use clap::Parser;

/// Launches coding-agent sessions for Linear issues assigned to one user.
#[derive(Debug, Parser)]
#[command(name = "autopilot", version, about)]
struct Cli {
    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind.
    #[arg(long)]
    host: Option<String>,

    /// Assignee email whose issues are picked up.
    #[arg(long)]
    target_user: Option<String>,

    /// Log output format (`pretty` or `json`).
    #[arg(long)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn apply(self, settings: &mut Settings) {
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(host) = self.host {
            settings.server.host = host;
        }
        if let Some(target_user) = self.target_user {
            settings.linear.target_user = target_user;
        }
        if let Some(format) = self.log_format {
            settings.log.format = format;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let LoadedSettings { mut settings, warnings } =
        autopilot_settings::load_settings().context("failed to load settings")?;
    cli.apply(&mut settings);

    init_telemetry(&TelemetryConfig::from(&settings.log)).context("failed to initialize logging")?;
    for warning in &warnings {
        tracing::warn!(
            key = %warning.key,
            value = %warning.value,
            reason = %warning.reason,
            "ignoring invalid setting override"
        );
    }

    let credentials = Credentials::from_env().context("missing credentials")?;

    let transport = ReqwestGraphqlTransport::new(settings.linear.api_url.clone(), credentials.linear_token)
        .context("failed to build Linear client")?;
    let gate = LinearDependencyGate::new(LinearClient::new(Arc::new(transport)));

    let mux: Arc<dyn Multiplexer> = Arc::new(TmuxMultiplexer::new(settings.agent.tmux_bin.clone()));
    let launcher = Arc::new(SessionLauncher::new(
        SessionTable::new(),
        Arc::new(gate),
        mux.clone(),
        Arc::new(MarkerDetector),
        AgentCommand::new(settings.agent.agent_bin.clone(), settings.agent.agent_args.clone()),
    ));
    let intake = Arc::new(EventIntake::new(launcher.clone(), settings.linear.target_user.clone()));

    if credentials.webhook_secret.is_none() {
        tracing::warn!("LINEAR_WEBHOOK_SECRET not set, webhook signatures are not checked");
    }
    let state = AppState::new(intake, mux, credentials.webhook_secret);

    let config = ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
    };
    let handle = autopilot_server::start(config, state)
        .await
        .with_context(|| format!("failed to bind {}:{}", settings.server.host, settings.server.port))?;

    tracing::info!(
        port = handle.port,
        target_user = %settings.linear.target_user,
        "autopilot ready"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl+c")?;

    tracing::info!("shutting down, agent sessions are left running");
    handle.shutdown().await;
    launcher.shutdown().await;

    Ok(())
}
