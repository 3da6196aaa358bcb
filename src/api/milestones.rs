use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::{storage_error, validation_error, ClubState};
use crate::club::{milestone_progress, validate};
use crate::club::stats::round2;
use crate::storage::{Milestone, MilestoneUpdate};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMilestoneRequest {
    pub target_km: f64,
    pub reward: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// GET /api/milestones - Alle Meilensteine, aufsteigend nach Ziel-km
pub async fn list_milestones(
    State(state): State<Arc<ClubState>>,
) -> Result<Json<Vec<Milestone>>, (StatusCode, String)> {
    let mut milestones = state
        .store
        .load_milestones()
        .await
        .map_err(|e| storage_error(&state, "milestones", e))?;
    milestones.sort_by(|a, b| {
        a.target_km
            .partial_cmp(&b.target_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(Json(milestones))
}

/// GET /api/milestones/progress - Meilensteine gegen die
/// Team-Gesamtdistanz bewertet
pub async fn milestones_progress(
    State(state): State<Arc<ClubState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let (milestones, records) = futures::try_join!(
        state.store.load_milestones(),
        state.store.load_records(),
    )
    .map_err(|e| storage_error(&state, "milestones", e))?;

    let team_total: f64 = records.iter().map(|r| r.distance).sum();
    let progress = milestone_progress(&milestones, team_total);

    Ok(Json(json!({
        "teamTotalKm": round2(team_total),
        "milestones": progress,
    })))
}

/// POST /api/milestones - Neuen Meilenstein anlegen
pub async fn create_milestone(
    State(state): State<Arc<ClubState>>,
    Json(payload): Json<CreateMilestoneRequest>,
) -> Result<(StatusCode, Json<Milestone>), (StatusCode, String)> {
    validate::target_km(payload.target_km)
        .map_err(|e| validation_error(&state, "milestones", e))?;
    validate::reward(&payload.reward).map_err(|e| validation_error(&state, "milestones", e))?;

    let milestone = Milestone::new(payload.target_km, payload.reward, payload.is_active);

    state
        .store
        .put_milestone(&milestone)
        .await
        .map_err(|e| storage_error(&state, "milestones", e))?;

    tracing::info!(milestone_id = %milestone.id, target_km = milestone.target_km, "Milestone created");
    Ok((StatusCode::CREATED, Json(milestone)))
}

/// PUT /api/milestones/:id - Meilenstein aktualisieren (inkl. Toggle)
pub async fn update_milestone(
    State(state): State<Arc<ClubState>>,
    Path(id): Path<String>,
    Json(payload): Json<MilestoneUpdate>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    validate::target_km(payload.target_km)
        .map_err(|e| validation_error(&state, "milestones", e))?;
    validate::reward(&payload.reward).map_err(|e| validation_error(&state, "milestones", e))?;

    state
        .store
        .update_milestone(&id, &payload)
        .await
        .map_err(|e| storage_error(&state, "milestones", e))?;

    Ok(Json(json!({ "status": "updated", "id": id })))
}

/// DELETE /api/milestones/:id - Meilenstein löschen
pub async fn delete_milestone(
    State(state): State<Arc<ClubState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state
        .store
        .delete_milestone(&id)
        .await
        .map_err(|e| storage_error(&state, "milestones", e))?;
    Ok(Json(json!({ "status": "deleted", "id": id })))
}

/// Router für Milestone Endpoints
pub fn milestones_router(state: Arc<ClubState>) -> Router {
    Router::new()
        .route("/", get(list_milestones).post(create_milestone))
        .route("/progress", get(milestones_progress))
        .route(
            "/:id",
            axum::routing::put(update_milestone).delete(delete_milestone),
        )
        .with_state(state)
}
