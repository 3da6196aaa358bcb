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
use crate::club::validate;
use crate::storage::{Member, MemberUpdate};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub join_date: Option<String>,
}

/// GET /api/members - Alle Mitglieder, nach Name sortiert
pub async fn list_members(
    State(state): State<Arc<ClubState>>,
) -> Result<Json<Vec<Member>>, (StatusCode, String)> {
    let timer = state
        .metrics
        .storage_latency
        .with_label_values(&["load_members"])
        .start_timer();
    let result = state.store.load_members().await;
    timer.observe_duration();

    let mut members = result.map_err(|e| storage_error(&state, "members", e))?;
    members.sort_by(|a, b| a.name.cmp(&b.name));
    state.metrics.member_count.set(members.len() as i64);

    Ok(Json(members))
}

/// POST /api/members - Neues Mitglied anlegen
pub async fn create_member(
    State(state): State<Arc<ClubState>>,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<Member>), (StatusCode, String)> {
    validate::member_name(&payload.name)
        .map_err(|e| validation_error(&state, "members", e))?;
    if let Some(join_date) = &payload.join_date {
        validate::date(join_date).map_err(|e| validation_error(&state, "members", e))?;
    }

    let member = Member::new(
        payload.name.trim().to_string(),
        payload.email,
        payload.phone,
        payload.join_date,
    );

    state
        .store
        .put_member(&member)
        .await
        .map_err(|e| storage_error(&state, "members", e))?;

    tracing::info!(member_id = %member.id, "Member created");
    state.metrics.member_count.inc();

    Ok((StatusCode::CREATED, Json(member)))
}

/// PUT /api/members/:id - Mitglied aktualisieren
pub async fn update_member(
    State(state): State<Arc<ClubState>>,
    Path(id): Path<String>,
    Json(payload): Json<MemberUpdate>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    validate::member_name(&payload.name)
        .map_err(|e| validation_error(&state, "members", e))?;

    state
        .store
        .update_member(&id, &payload)
        .await
        .map_err(|e| storage_error(&state, "members", e))?;

    Ok(Json(json!({ "status": "updated", "id": id })))
}

/// DELETE /api/members/:id - Mitglied inkl. aller Einträge löschen
pub async fn delete_member(
    State(state): State<Arc<ClubState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let records = state
        .store
        .load_member_records(&id)
        .await
        .map_err(|e| storage_error(&state, "members", e))?;

    for record in &records {
        state
            .store
            .delete_record(&record.id)
            .await
            .map_err(|e| storage_error(&state, "members", e))?;
    }

    state
        .store
        .delete_member(&id)
        .await
        .map_err(|e| storage_error(&state, "members", e))?;

    tracing::warn!(member_id = %id, deleted_records = records.len(), "Member deleted");
    state.metrics.member_count.dec();

    Ok(Json(json!({
        "status": "deleted",
        "id": id,
        "deletedRecords": records.len(),
    })))
}

/// Router für Member Endpoints
pub fn members_router(state: Arc<ClubState>) -> Router {
    Router::new()
        .route("/", get(list_members).post(create_member))
        .route("/:id", axum::routing::put(update_member).delete(delete_member))
        .with_state(state)
}
