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
use crate::storage::{Schedule, ScheduleUpdate};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub participants: Option<Vec<String>>,
}

fn validate_schedule_fields(
    state: &ClubState,
    title: &str,
    date: Option<&str>,
    time: Option<&str>,
) -> Result<(), (StatusCode, String)> {
    validate::title(title).map_err(|e| validation_error(state, "schedules", e))?;
    if let Some(date) = date {
        validate::date(date).map_err(|e| validation_error(state, "schedules", e))?;
    }
    if let Some(time) = time {
        if !time.is_empty() {
            validate::time(time).map_err(|e| validation_error(state, "schedules", e))?;
        }
    }
    Ok(())
}

/// GET /api/schedules - Alle Termine, nach Datum sortiert
pub async fn list_schedules(
    State(state): State<Arc<ClubState>>,
) -> Result<Json<Vec<Schedule>>, (StatusCode, String)> {
    let mut schedules = state
        .store
        .load_schedules()
        .await
        .map_err(|e| storage_error(&state, "schedules", e))?;
    schedules.sort_by(|a, b| a.date.cmp(&b.date).then(a.time.cmp(&b.time)));
    Ok(Json(schedules))
}

/// GET /api/schedules/date/:date - Termine eines Tages (Kalenderansicht)
pub async fn schedules_by_date(
    State(state): State<Arc<ClubState>>,
    Path(date): Path<String>,
) -> Result<Json<Vec<Schedule>>, (StatusCode, String)> {
    validate::date(&date).map_err(|e| validation_error(&state, "schedules", e))?;

    let schedules = state
        .store
        .load_schedules_by_date(&date)
        .await
        .map_err(|e| storage_error(&state, "schedules", e))?;
    Ok(Json(schedules))
}

/// POST /api/schedules - Neuen Termin anlegen
pub async fn create_schedule(
    State(state): State<Arc<ClubState>>,
    Json(payload): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<Schedule>), (StatusCode, String)> {
    validate_schedule_fields(
        &state,
        &payload.title,
        payload.date.as_deref(),
        payload.time.as_deref(),
    )?;

    let schedule = Schedule::new(
        payload.date,
        payload.title.trim().to_string(),
        payload.description,
        payload.location,
        payload.time,
        payload.participants,
    );

    state
        .store
        .put_schedule(&schedule)
        .await
        .map_err(|e| storage_error(&state, "schedules", e))?;

    tracing::info!(schedule_id = %schedule.id, date = %schedule.date, "Schedule created");
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// PUT /api/schedules/:id - Termin aktualisieren
pub async fn update_schedule(
    State(state): State<Arc<ClubState>>,
    Path(id): Path<String>,
    Json(payload): Json<ScheduleUpdate>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    validate_schedule_fields(
        &state,
        &payload.title,
        Some(payload.date.as_str()),
        payload.time.as_deref(),
    )?;

    state
        .store
        .update_schedule(&id, &payload)
        .await
        .map_err(|e| storage_error(&state, "schedules", e))?;

    Ok(Json(json!({ "status": "updated", "id": id })))
}

/// DELETE /api/schedules/:id - Termin löschen
pub async fn delete_schedule(
    State(state): State<Arc<ClubState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state
        .store
        .delete_schedule(&id)
        .await
        .map_err(|e| storage_error(&state, "schedules", e))?;
    Ok(Json(json!({ "status": "deleted", "id": id })))
}

/// Router für Schedule Endpoints
pub fn schedules_router(state: Arc<ClubState>) -> Router {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route("/date/:date", get(schedules_by_date))
        .route(
            "/:id",
            axum::routing::put(update_schedule).delete(delete_schedule),
        )
        .with_state(state)
}
