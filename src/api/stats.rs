use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use std::sync::Arc;

use crate::api::{storage_error, ClubState};
use crate::club::stats::{self, MemberStats, StatsSummary, TeamStats};
use crate::club::member_ranks;

/// GET /api/stats/summary - Kompakte Kennzahlen für die Startseite
pub async fn summary(
    State(state): State<Arc<ClubState>>,
) -> Result<Json<StatsSummary>, (StatusCode, String)> {
    let (members, records) = futures::try_join!(
        state.store.load_members(),
        state.store.load_records(),
    )
    .map_err(|e| storage_error(&state, "stats", e))?;

    state.metrics.member_count.set(members.len() as i64);
    state.metrics.record_count.set(records.len() as i64);

    Ok(Json(stats::summary(&members, &records)))
}

/// GET /api/stats/team - Team-Statistiken inkl. Zielfortschritt
pub async fn team(
    State(state): State<Arc<ClubState>>,
) -> Result<Json<TeamStats>, (StatusCode, String)> {
    let records = state
        .store
        .load_records()
        .await
        .map_err(|e| storage_error(&state, "stats", e))?;

    Ok(Json(stats::team_stats(&records)))
}

/// GET /api/stats/members - Mitglieder-Statistiken mit Rang
pub async fn members(
    State(state): State<Arc<ClubState>>,
) -> Result<Json<Vec<MemberStats>>, (StatusCode, String)> {
    let (members, records) = futures::try_join!(
        state.store.load_members(),
        state.store.load_records(),
    )
    .map_err(|e| storage_error(&state, "stats", e))?;

    let per_member: Vec<MemberStats> = members
        .iter()
        .map(|m| stats::member_stats(m, &records))
        .collect();

    Ok(Json(member_ranks(per_member)))
}

/// Router für Statistik Endpoints
pub fn stats_router(state: Arc<ClubState>) -> Router {
    Router::new()
        .route("/summary", get(summary))
        .route("/team", get(team))
        .route("/members", get(members))
        .with_state(state)
}
