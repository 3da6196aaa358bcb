use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use prometheus::TextEncoder;
use serde_json::json;
use std::sync::Arc;

use crate::api::{storage_error, ClubState};
use crate::storage::ClubData;

/// Health Check Endpoint
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

/// Readiness Check Endpoint
pub async fn ready() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "ready": true,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// Prometheus Metrics Endpoint
pub async fn metrics(State(state): State<Arc<ClubState>>) -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&state.metrics.registry().gather()) {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}

/// GET /api/admin/export - Kompletter Datensatz als JSON (Backup)
pub async fn export_data(
    State(state): State<Arc<ClubState>>,
) -> Result<Json<ClubData>, (StatusCode, String)> {
    let data = state
        .store
        .load_all()
        .await
        .map_err(|e| storage_error(&state, "admin", e))?;
    Ok(Json(data))
}

/// POST /api/admin/import - Datensatz komplett ersetzen (Restore).
/// Überschreibt alle vorhandenen Daten.
pub async fn import_data(
    State(state): State<Arc<ClubState>>,
    Json(payload): Json<ClubData>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state
        .store
        .replace_all(&payload)
        .await
        .map_err(|e| storage_error(&state, "admin", e))?;

    tracing::warn!(
        members = payload.members.len(),
        records = payload.records.len(),
        schedules = payload.schedules.len(),
        milestones = payload.milestones.len(),
        "Dataset imported"
    );

    Ok(Json(json!({
        "status": "imported",
        "members": payload.members.len(),
        "records": payload.records.len(),
        "schedules": payload.schedules.len(),
        "milestones": payload.milestones.len(),
    })))
}

/// POST /api/admin/reset - Alle Daten löschen
pub async fn reset_data(
    State(state): State<Arc<ClubState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state
        .store
        .replace_all(&ClubData::empty())
        .await
        .map_err(|e| storage_error(&state, "admin", e))?;

    tracing::warn!("Dataset reset");
    state.metrics.member_count.set(0);
    state.metrics.record_count.set(0);

    Ok(Json(json!({ "status": "reset" })))
}

/// Router für Admin/Health Endpoints
pub fn admin_router(state: Arc<ClubState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .route("/export", get(export_data))
        .route("/import", post(import_data))
        .route("/reset", post(reset_data))
        .with_state(state)
}
