//! Database operations for the `events` table.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every event, ordered by season then round.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_events(pool: &PgPool) -> Result<Vec<EventRow>, DbError> {
    let rows = sqlx::query_as::<_, EventRow>(
        "SELECT id, name, circuit, season, round, date, time_zone, sessions, race_results, \
                finished, winner, created_at, updated_at \
         FROM events \
         ORDER BY season, round",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single event by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_event(pool: &PgPool, id: &str) -> Result<Option<EventRow>, DbError> {
    let row = sqlx::query_as::<_, EventRow>(
        "SELECT id, name, circuit, season, round, date, time_zone, sessions, race_results, \
                finished, winner, created_at, updated_at \
         FROM events \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the event for a given season and round, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_event_by_round(
    pool: &PgPool,
    season: i32,
    round: i32,
) -> Result<Option<EventRow>, DbError> {
    let row = sqlx::query_as::<_, EventRow>(
        "SELECT id, name, circuit, season, round, date, time_zone, sessions, race_results, \
                finished, winner, created_at, updated_at \
         FROM events \
         WHERE season = $1 AND round = $2",
    )
    .bind(season)
    .bind(round)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Writes a result set into one named session of an event's `sessions`
/// document.
///
/// The whole array is rewritten in a single `UPDATE` so concurrent writers
/// cannot interleave a read-modify-write. Returns the number of rows
/// affected; zero means the event does not exist or has no session with that
/// name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_session_result(
    pool: &PgPool,
    event_id: &str,
    session_name: &str,
    result: &Value,
) -> Result<u64, DbError> {
    let done = sqlx::query(
        "UPDATE events \
         SET sessions = ( \
                 SELECT jsonb_agg( \
                            CASE WHEN s->>'name' = $2 \
                                 THEN jsonb_set(s, '{session_result}', $3::jsonb) \
                                 ELSE s END \
                            ORDER BY o) \
                   FROM jsonb_array_elements(sessions) WITH ORDINALITY AS t(s, o) \
             ), \
             updated_at = NOW() \
         WHERE id = $1 \
           AND EXISTS ( \
                 SELECT 1 FROM jsonb_array_elements(sessions) AS e \
                 WHERE e->>'name' = $2 \
             )",
    )
    .bind(event_id)
    .bind(session_name)
    .bind(result)
    .execute(pool)
    .await?;

    Ok(done.rows_affected())
}

/// Marks a race as finished in one statement: stores the raw result set on
/// the "Race" session, the ranked classification, the finished flag and the
/// winner together.
///
/// Returns the number of rows affected; zero means the event does not exist
/// or has no "Race" session.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn finish_race(
    pool: &PgPool,
    event_id: &str,
    session_result: &Value,
    race_results: &Value,
    winner: &str,
) -> Result<u64, DbError> {
    let done = sqlx::query(
        "UPDATE events \
         SET sessions = ( \
                 SELECT jsonb_agg( \
                            CASE WHEN s->>'name' = 'Race' \
                                 THEN jsonb_set(s, '{session_result}', $2::jsonb) \
                                 ELSE s END \
                            ORDER BY o) \
                   FROM jsonb_array_elements(sessions) WITH ORDINALITY AS t(s, o) \
             ), \
             race_results = $3::jsonb, \
             finished = TRUE, \
             winner = $4, \
             updated_at = NOW() \
         WHERE id = $1 \
           AND EXISTS ( \
                 SELECT 1 FROM jsonb_array_elements(sessions) AS e \
                 WHERE e->>'name' = 'Race' \
             )",
    )
    .bind(event_id)
    .bind(session_result)
    .bind(race_results)
    .bind(winner)
    .execute(pool)
    .await?;

    Ok(done.rows_affected())
}
