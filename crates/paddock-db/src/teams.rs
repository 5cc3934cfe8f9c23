//! Database operations for the `teams` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `teams` table. `points` is NULL until the team first
/// scores or an admin sets a value.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamRow {
    pub id: String,
    pub name: String,
    pub points: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns a single team by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_team(pool: &PgPool, id: &str) -> Result<Option<TeamRow>, DbError> {
    let row = sqlx::query_as::<_, TeamRow>(
        "SELECT id, name, points, created_at, updated_at \
         FROM teams \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all teams ordered by points, best first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_team_standings(pool: &PgPool) -> Result<Vec<TeamRow>, DbError> {
    let rows = sqlx::query_as::<_, TeamRow>(
        "SELECT id, name, points, created_at, updated_at \
         FROM teams \
         ORDER BY points DESC NULLS LAST, name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Adds a points delta to a team's total in one atomic statement. A NULL
/// total counts as zero, so a team's first points do not vanish.
///
/// Returns the number of rows affected; zero means the team does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn add_team_points(pool: &PgPool, team_id: &str, delta: f64) -> Result<u64, DbError> {
    let done = sqlx::query(
        "UPDATE teams \
         SET points = COALESCE(points, 0) + $2, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(team_id)
    .bind(delta)
    .execute(pool)
    .await?;

    Ok(done.rows_affected())
}

/// Overwrites a team's points. `None` stores NULL, which reads as "no points
/// recorded" rather than an explicit zero.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn set_team_points(
    pool: &PgPool,
    team_id: &str,
    points: Option<f64>,
) -> Result<u64, DbError> {
    let done = sqlx::query(
        "UPDATE teams \
         SET points = $2, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(team_id)
    .bind(points)
    .execute(pool)
    .await?;

    Ok(done.rows_affected())
}
