use axum::{
    extract::{Path, State},
    Extension, Json,
};
use paddock_db::DriverRow;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct DriverStandingItem {
    pub id: String,
    pub name: String,
    pub team: String,
    pub season_points: Option<f64>,
    pub total_points: f64,
    pub gp_entered: i32,
    pub podiums: i32,
    pub victories: i32,
}

impl From<DriverRow> for DriverStandingItem {
    fn from(row: DriverRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            team: row.team,
            season_points: row.season_points,
            total_points: row.total_points,
            gp_entered: row.gp_entered,
            podiums: row.podiums,
            victories: row.victories,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SetSeasonPointsBody {
    /// `null` (or a missing field) clears the aggregate back to "no points
    /// recorded".
    pub season_points: Option<f64>,
}

pub(super) async fn driver_standings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<DriverStandingItem>>>, ApiError> {
    let rows = paddock_db::list_driver_standings(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(DriverStandingItem::from).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn set_season_points(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<SetSeasonPointsBody>,
) -> Result<Json<ApiResponse<DriverStandingItem>>, ApiError> {
    let updated = paddock_db::set_driver_season_points(&state.pool, &id, body.season_points)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    if updated == 0 {
        return Err(ApiError::new(req_id.0, "not_found", "driver not found"));
    }

    let row = paddock_db::get_driver(&state.pool, &id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "driver not found"))?;

    Ok(Json(ApiResponse {
        data: DriverStandingItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}
