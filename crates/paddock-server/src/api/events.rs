use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use paddock_core::{zoned_instant, SessionDoc};
use paddock_db::EventRow;
use serde::Serialize;
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct EventSummary {
    pub id: String,
    pub name: String,
    pub circuit: String,
    pub season: i32,
    pub round: i32,
    pub date: NaiveDate,
    pub finished: bool,
    pub winner: Option<String>,
}

impl From<EventRow> for EventSummary {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            circuit: row.circuit,
            season: row.season,
            round: row.round,
            date: row.date,
            finished: row.finished,
            winner: row.winner,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct EventDetail {
    pub id: String,
    pub name: String,
    pub circuit: String,
    pub season: i32,
    pub round: i32,
    pub date: NaiveDate,
    pub time_zone: String,
    pub sessions: Value,
    pub race_results: Value,
    pub finished: bool,
    pub winner: Option<String>,
}

impl From<EventRow> for EventDetail {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            circuit: row.circuit,
            season: row.season,
            round: row.round,
            date: row.date,
            time_zone: row.time_zone,
            sessions: row.sessions,
            race_results: row.race_results,
            finished: row.finished,
            winner: row.winner,
        }
    }
}

pub(super) async fn list_events(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<EventSummary>>>, ApiError> {
    let rows = paddock_db::list_events(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(EventSummary::from).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn upcoming_events(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<EventSummary>>>, ApiError> {
    let rows = paddock_db::list_events(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let now = Utc::now();
    let data = rows
        .into_iter()
        .filter(|row| has_future_session(row, now))
        .map(EventSummary::from)
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_event(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((season, round)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<EventDetail>>, ApiError> {
    let row = paddock_db::get_event_by_round(&state.pool, season, round)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "event not found"))?;

    Ok(Json(ApiResponse {
        data: EventDetail::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Whether any of the event's sessions starts after `now`, resolved in the
/// event's own time zone. Rows whose sessions document does not decode are
/// treated as not upcoming.
fn has_future_session(row: &EventRow, now: DateTime<Utc>) -> bool {
    let Ok(sessions) = serde_json::from_value::<Vec<SessionDoc>>(row.sessions.clone()) else {
        tracing::warn!(event_id = %row.id, "sessions document does not decode; not listed as upcoming");
        return false;
    };

    sessions.iter().any(|session| {
        zoned_instant(session.date, session.start_time, &row.time_zone)
            .is_ok_and(|start| start > now)
    })
}
