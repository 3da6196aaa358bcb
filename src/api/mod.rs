pub mod admin;
pub mod members;
pub mod milestones;
pub mod records;
pub mod schedules;
pub mod stats;
pub mod status;

pub use admin::admin_router;
pub use members::members_router;
pub use milestones::milestones_router;
pub use records::records_router;
pub use schedules::schedules_router;
pub use stats::stats_router;
pub use status::{status_router, StatusState};

use std::sync::Arc;

use axum::http::StatusCode;

use crate::club::ValidationError;
use crate::storage::{StorageError, Store};
use crate::utils::Metrics;

/// Gemeinsamer State für alle Router
pub struct ClubState {
    pub store: Arc<dyn Store>,
    pub metrics: Arc<Metrics>,
}

/// Mappe Storage-Fehler auf HTTP-Antworten und zähle sie
pub fn storage_error(state: &ClubState, endpoint: &str, err: StorageError) -> (StatusCode, String) {
    tracing::error!(endpoint, error = %err, "Storage error");
    state
        .metrics
        .api_error_count
        .with_label_values(&[endpoint, "storage"])
        .inc();

    let status = match &err {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::AccessDenied(_) => StatusCode::FORBIDDEN,
        StorageError::Throttled | StorageError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.user_message().to_string())
}

/// Mappe Validierungsfehler auf 400 und zähle sie
pub fn validation_error(
    state: &ClubState,
    endpoint: &str,
    err: ValidationError,
) -> (StatusCode, String) {
    state
        .metrics
        .api_error_count
        .with_label_values(&[endpoint, "validation"])
        .inc();
    (StatusCode::BAD_REQUEST, err.to_string())
}
