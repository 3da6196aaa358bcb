use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::api::ClubState;
use crate::utils::StorageBackend;

/// Shared State für den Status-Endpunkt
pub struct StatusState {
    pub club: Arc<ClubState>,
    pub backend: StorageBackend,
    /// Unix-Timestamp beim Start des Servers
    pub started_at: u64,
}

impl StatusState {
    pub fn new(club: Arc<ClubState>, backend: StorageBackend) -> Self {
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            club,
            backend,
            started_at,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub started_at: u64,
    pub timestamp: String,
    pub connections: ConnectionStatus,
    pub services: ServiceStatus,
}

#[derive(Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub storage: ComponentHealth,
}

#[derive(Serialize, Deserialize)]
pub struct ComponentHealth {
    pub healthy: bool,
    pub backend: String,
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Deserialize)]
pub struct ServiceStatus {
    pub members: String,
    pub records: String,
    pub schedules: String,
    pub milestones: String,
}

/// GET /api/v1/status – Vollständiger Server-Status
pub async fn get_status(
    State(state): State<Arc<StatusState>>,
) -> (StatusCode, Json<ServerStatus>) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let uptime = now.saturating_sub(state.started_at);

    // Storage-Connectivity prüfen (schneller Probe-Read)
    let start = std::time::Instant::now();
    let healthy = state.club.store.check_connection().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let service = if healthy { "operational" } else { "degraded" };
    let body = ServerStatus {
        status: if healthy {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        started_at: state.started_at,
        timestamp: chrono::Utc::now().to_rfc3339(),
        connections: ConnectionStatus {
            storage: ComponentHealth {
                healthy,
                backend: state.backend.as_str().to_string(),
                latency_ms: Some(latency_ms),
            },
        },
        services: ServiceStatus {
            members: service.to_string(),
            records: service.to_string(),
            schedules: service.to_string(),
            milestones: service.to_string(),
        },
    };

    let http_status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(body))
}

/// GET /api/v1/settings – Einstellungen (read-only, aus Env-Vars)
pub async fn get_settings() -> Json<serde_json::Value> {
    use serde_json::json;
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "storage_backend": std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "dynamodb".to_string()),
        "aws_region": std::env::var("AWS_REGION").unwrap_or_else(|_| "ap-northeast-1".to_string()),
        "table_prefix": std::env::var("DYNAMODB_TABLE_PREFIX").unwrap_or_else(|_| "RunningClub".to_string()),
        "s3_bucket": std::env::var("S3_BUCKET").unwrap_or_else(|_| "agrace-run-data".to_string()),
        "log_level": std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
    }))
}

/// Router für V1 Endpunkte
pub fn status_router(state: Arc<StatusState>) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/settings", get(get_settings))
        .with_state(state)
}
