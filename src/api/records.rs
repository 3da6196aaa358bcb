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
use crate::storage::{RunRecord, StorageError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    pub member_id: String,
    pub distance: f64,
    pub time: String,
    #[serde(default)]
    pub pace: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// GET /api/records - Alle Einträge, neueste zuerst
pub async fn list_records(
    State(state): State<Arc<ClubState>>,
) -> Result<Json<Vec<RunRecord>>, (StatusCode, String)> {
    let timer = state
        .metrics
        .storage_latency
        .with_label_values(&["load_records"])
        .start_timer();
    let result = state.store.load_records().await;
    timer.observe_duration();

    let mut records = result.map_err(|e| storage_error(&state, "records", e))?;
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
    state.metrics.record_count.set(records.len() as i64);

    Ok(Json(records))
}

/// GET /api/records/member/:member_id - Einträge eines Mitglieds
pub async fn member_records(
    State(state): State<Arc<ClubState>>,
    Path(member_id): Path<String>,
) -> Result<Json<Vec<RunRecord>>, (StatusCode, String)> {
    let records = state
        .store
        .load_member_records(&member_id)
        .await
        .map_err(|e| storage_error(&state, "records", e))?;
    Ok(Json(records))
}

/// POST /api/records - Neuen Eintrag anlegen und Mitglieder-Zähler
/// fortschreiben. Schlägt das Fortschreiben fehl, wird der Eintrag
/// zurückgerollt.
pub async fn create_record(
    State(state): State<Arc<ClubState>>,
    Json(payload): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<RunRecord>), (StatusCode, String)> {
    validate::distance(payload.distance)
        .map_err(|e| validation_error(&state, "records", e))?;
    if let Some(pace) = &payload.pace {
        validate::pace(pace).map_err(|e| validation_error(&state, "records", e))?;
    }
    if let Some(date) = &payload.date {
        validate::date(date).map_err(|e| validation_error(&state, "records", e))?;
    }

    let members = state
        .store
        .load_members()
        .await
        .map_err(|e| storage_error(&state, "records", e))?;
    let mut member = members
        .into_iter()
        .find(|m| m.id == payload.member_id)
        .ok_or((StatusCode::NOT_FOUND, "Member not found".to_string()))?;

    let record = RunRecord::new(
        payload.member_id,
        payload.distance,
        payload.time,
        payload.pace,
        payload.notes,
        payload.date,
    );

    state
        .store
        .put_record(&record)
        .await
        .map_err(|e| storage_error(&state, "records", e))?;

    member.apply_record(record.distance);
    if let Err(e) = state.store.put_member(&member).await {
        // Eintrag wieder entfernen, damit Zähler und Daten konsistent bleiben
        if let Err(rollback_err) = state.store.delete_record(&record.id).await {
            tracing::error!(
                record_id = %record.id,
                error = %rollback_err,
                "Rollback of record failed"
            );
        }
        return Err(storage_error(&state, "records", e));
    }

    tracing::info!(record_id = %record.id, member_id = %member.id, "Record created");
    state.metrics.record_count.inc();

    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/records/:id - Eintrag löschen und Zähler zurücknehmen
pub async fn delete_record(
    State(state): State<Arc<ClubState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let records = state
        .store
        .load_records()
        .await
        .map_err(|e| storage_error(&state, "records", e))?;
    let record = records
        .into_iter()
        .find(|r| r.id == id)
        .ok_or((StatusCode::NOT_FOUND, "Record not found".to_string()))?;

    state
        .store
        .delete_record(&id)
        .await
        .map_err(|e| storage_error(&state, "records", e))?;

    // Zähler des Mitglieds zurücknehmen; fehlendes Mitglied ist kein Fehler
    // (Eintrag kann nach Mitglieds-Löschung übrig geblieben sein)
    match state.store.load_members().await {
        Ok(members) => {
            if let Some(mut member) = members.into_iter().find(|m| m.id == record.member_id) {
                member.revert_record(record.distance);
                if let Err(e) = state.store.put_member(&member).await {
                    tracing::error!(member_id = %member.id, error = %e, "Counter update failed");
                }
            }
        }
        Err(e @ StorageError::Network(_)) | Err(e @ StorageError::Throttled) => {
            return Err(storage_error(&state, "records", e));
        }
        Err(e) => {
            tracing::error!(error = %e, "Could not load members for counter update");
        }
    }

    state.metrics.record_count.dec();
    Ok(Json(json!({ "status": "deleted", "id": id })))
}

/// Router für Record Endpoints
pub fn records_router(state: Arc<ClubState>) -> Router {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route("/member/:member_id", get(member_records))
        .route("/:id", axum::routing::delete(delete_record))
        .with_state(state)
}
