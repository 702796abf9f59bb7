//! HTTP surface of the agent.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use gpustat_common::types::SnapshotPayload;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::TelemetryError;
use crate::state::AppState;

pub const SNAPSHOT_PATH: &str = "/gpustats";

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
}

impl IntoResponse for TelemetryError {
    fn into_response(self) -> Response {
        error!(error = %self, "snapshot request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Build the router serving snapshots and agent status
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(SNAPSHOT_PATH, get(get_snapshot))
        .route("/status", get(get_status))
        .layer(CorsLayer::new().allow_origin(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_snapshot(
    State(state): State<AppState>,
) -> Result<Json<SnapshotPayload>, TelemetryError> {
    let snapshot = state.collector.snapshot(&state.hostname).await?;
    Ok(Json(SnapshotPayload::from(&snapshot)))
}

async fn get_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
