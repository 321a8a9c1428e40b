//! HTTP handlers: webhook intake and the control API.

use std::collections::BTreeMap;

use autopilot_core::{SessionRecord, WorkItemId};
use autopilot_engine::{CleanupOutcome, EventIntake};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::server::AppState;
use crate::signature::{verify_signature, SIGNATURE_HEADER};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub active_sessions: usize,
    pub sessions: BTreeMap<WorkItemId, SessionRecord>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_sessions: usize,
}

/// `POST /webhook/linear`
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    if let Some(secret) = &state.webhook_secret {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok());
        if !verify_signature(secret, &body, signature) {
            warn!("rejected webhook with invalid signature");
            return (StatusCode::UNAUTHORIZED, "Invalid signature");
        }
    }

    let event = match EventIntake::parse(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "malformed webhook payload");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error");
        }
    };

    // Run on its own task so a dropped connection cannot abandon a launch
    // halfway through.
    let intake = state.intake.clone();
    match tokio::spawn(async move { intake.handle(event).await }).await {
        Ok(outcome) => {
            debug!(outcome = ?outcome, "webhook processed");
            (StatusCode::OK, "OK")
        }
        Err(e) => {
            error!(error = %e, "webhook processing task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error")
        }
    }
}

/// `GET /api/status`
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let sessions = state.table.snapshot();
    Json(StatusResponse {
        active_sessions: sessions.len(),
        sessions,
    })
}

/// `GET /api/sessions`
pub async fn sessions(State(state): State<AppState>) -> Json<BTreeMap<WorkItemId, SessionRecord>> {
    Json(state.table.snapshot())
}

/// `POST /api/stop/{issue_id}`
pub async fn stop(State(state): State<AppState>, Path(issue_id): Path<String>) -> impl IntoResponse {
    let work_item = WorkItemId::from_raw(issue_id);
    match state.reaper.reap(&work_item, None).await {
        CleanupOutcome::Removed(record) => {
            info!(work_item_id = %work_item, session_name = %record.session_name(), "session stopped via API");
            (StatusCode::OK, format!("Session for {work_item} stopped"))
        }
        CleanupOutcome::NotFound => (
            StatusCode::NOT_FOUND,
            format!("No active session for {work_item}"),
        ),
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        active_sessions: state.table.len(),
    })
}
