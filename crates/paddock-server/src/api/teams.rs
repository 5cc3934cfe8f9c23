use axum::{
    extract::{Path, State},
    Extension, Json,
};
use paddock_db::TeamRow;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct TeamStandingItem {
    pub id: String,
    pub name: String,
    pub points: Option<f64>,
}

impl From<TeamRow> for TeamStandingItem {
    fn from(row: TeamRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            points: row.points,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SetPointsBody {
    /// `null` (or a missing field) clears the aggregate back to "no points
    /// recorded".
    pub points: Option<f64>,
}

pub(super) async fn team_standings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<TeamStandingItem>>>, ApiError> {
    let rows = paddock_db::list_team_standings(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(TeamStandingItem::from).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn set_team_points(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<SetPointsBody>,
) -> Result<Json<ApiResponse<TeamStandingItem>>, ApiError> {
    let updated = paddock_db::set_team_points(&state.pool, &id, body.points)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    if updated == 0 {
        return Err(ApiError::new(req_id.0, "not_found", "team not found"));
    }

    let row = paddock_db::get_team(&state.pool, &id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "team not found"))?;

    Ok(Json(ApiResponse {
        data: TeamStandingItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}
