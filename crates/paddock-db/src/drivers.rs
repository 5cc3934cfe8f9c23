//! Database operations for the `drivers` table.
//!
//! Career statistics on this table are only ever mutated through
//! single-statement increments so concurrent result ingestions cannot lose
//! updates to a read-modify-write race.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `drivers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DriverRow {
    pub id: String,
    pub name: String,
    pub team: String,
    pub season_points: Option<f64>,
    pub total_points: f64,
    pub gp_entered: i32,
    pub podiums: i32,
    pub victories: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns a single driver by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_driver(pool: &PgPool, id: &str) -> Result<Option<DriverRow>, DbError> {
    let row = sqlx::query_as::<_, DriverRow>(
        "SELECT id, name, team, season_points, total_points, gp_entered, podiums, victories, \
                created_at, updated_at \
         FROM drivers \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all drivers ordered by season points, best first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_driver_standings(pool: &PgPool) -> Result<Vec<DriverRow>, DbError> {
    let rows = sqlx::query_as::<_, DriverRow>(
        "SELECT id, name, team, season_points, total_points, gp_entered, podiums, victories, \
                created_at, updated_at \
         FROM drivers \
         ORDER BY season_points DESC NULLS LAST, name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Credits one race classification to a driver: points into both running
/// totals, one more grand prix entered, and a victory or podium when the
/// finishing position warrants it.
///
/// All counters move in a single atomic `UPDATE`. Returns the number of rows
/// affected; zero means the driver does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn apply_race_result(
    pool: &PgPool,
    driver_id: &str,
    points: f64,
    victory: bool,
    podium: bool,
) -> Result<u64, DbError> {
    let done = sqlx::query(
        "UPDATE drivers \
         SET total_points = total_points + $2, \
             season_points = COALESCE(season_points, 0) + $2, \
             gp_entered = gp_entered + 1, \
             victories = victories + CASE WHEN $3::BOOL THEN 1 ELSE 0 END, \
             podiums = podiums + CASE WHEN $4::BOOL THEN 1 ELSE 0 END, \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(driver_id)
    .bind(points)
    .bind(victory)
    .bind(podium)
    .execute(pool)
    .await?;

    Ok(done.rows_affected())
}

/// Overwrites a driver's season points. `None` stores NULL, which reads as
/// "no points recorded" rather than an explicit zero.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn set_driver_season_points(
    pool: &PgPool,
    driver_id: &str,
    points: Option<f64>,
) -> Result<u64, DbError> {
    let done = sqlx::query(
        "UPDATE drivers \
         SET season_points = $2, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(driver_id)
    .bind(points)
    .execute(pool)
    .await?;

    Ok(done.rows_affected())
}
