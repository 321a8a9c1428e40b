use std::sync::Arc;

use autopilot_core::Multiplexer;
use autopilot_engine::{EventIntake, SessionReaper, SessionTable};
use axum::routing::{get, post};
use axum::Router;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<EventIntake>,
    pub table: SessionTable,
    pub reaper: SessionReaper,
    /// When set, webhooks must carry a valid signature.
    pub webhook_secret: Option<Arc<SecretString>>,
}

impl AppState {
    pub fn new(
        intake: Arc<EventIntake>,
        mux: Arc<dyn Multiplexer>,
        webhook_secret: Option<SecretString>,
    ) -> Self {
        let table = intake.launcher().table().clone();
        Self {
            reaper: SessionReaper::new(table.clone(), mux),
            table,
            intake,
            webhook_secret: webhook_secret.map(Arc::new),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/linear", post(handlers::webhook))
        .route("/api/status", get(handlers::status))
        .route("/api/sessions", get(handlers::sessions))
        .route("/api/stop/{issue_id}", post(handlers::stop))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind and start serving. Returns a handle to shut it down.
pub async fn start(config: ServerConfig, state: AppState) -> Result<ServerHandle, std::io::Error> {
    let router = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(host = %config.host, port = local_addr.port(), "autopilot server started");

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(async move { signal.cancelled().await })
            .await
        {
            tracing::error!(error = %e, "server exited with error");
        }
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        shutdown,
        server,
    })
}

/// Handle returned by `start()`.
pub struct ServerHandle {
    pub port: u16,
    shutdown: CancellationToken,
    server: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.server.await {
            tracing::warn!(error = %e, "server task did not finish cleanly");
        }
    }
}
