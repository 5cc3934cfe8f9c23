//! Seeding of teams, drivers and events from the season calendar file.

use paddock_core::calendar::{CalendarFile, EventConfig};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::DbError;

/// Counts of rows processed by [`seed_calendar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub teams: usize,
    pub drivers: usize,
    pub events: usize,
}

/// Upsert the whole season calendar into the database.
///
/// Seeding is idempotent and safe to run against a live season: scalar
/// fields are refreshed from the file, while anything earned at runtime
/// (driver statistics, team points, the finished flag and winner, and any
/// session result set that already holds entries) is preserved.
///
/// All upserts run inside a single transaction; if any operation fails the
/// entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_calendar(pool: &PgPool, calendar: &CalendarFile) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary {
        teams: 0,
        drivers: 0,
        events: 0,
    };

    for team in &calendar.teams {
        sqlx::query(
            "INSERT INTO teams (id, name) \
             VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 updated_at = NOW()",
        )
        .bind(&team.id)
        .bind(&team.name)
        .execute(&mut *tx)
        .await?;
        summary.teams += 1;
    }

    for driver in &calendar.drivers {
        sqlx::query(
            "INSERT INTO drivers (id, name, team) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 team = EXCLUDED.team, \
                 updated_at = NOW()",
        )
        .bind(&driver.id)
        .bind(&driver.name)
        .bind(&driver.team)
        .execute(&mut *tx)
        .await?;
        summary.drivers += 1;
    }

    for event in &calendar.events {
        let sessions = sessions_document(event);

        // On re-seed the incoming session list wins, but a session_result
        // that already holds entries is carried over from the stored row so
        // reseeding never wipes ingested results.
        sqlx::query(
            "INSERT INTO events (id, name, circuit, season, round, date, time_zone, sessions) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 circuit = EXCLUDED.circuit, \
                 season = EXCLUDED.season, \
                 round = EXCLUDED.round, \
                 date = EXCLUDED.date, \
                 time_zone = EXCLUDED.time_zone, \
                 sessions = ( \
                     SELECT jsonb_agg( \
                                CASE WHEN existing.s->'session_result' IS NOT NULL \
                                      AND existing.s->'session_result' <> '{}'::jsonb \
                                      AND existing.s->'session_result' <> '[]'::jsonb \
                                      AND existing.s->'session_result' <> 'null'::jsonb \
                                     THEN jsonb_set(incoming.s, '{session_result}', \
                                                    existing.s->'session_result') \
                                     ELSE incoming.s END \
                                ORDER BY incoming.o) \
                       FROM jsonb_array_elements(EXCLUDED.sessions) \
                            WITH ORDINALITY AS incoming(s, o) \
                       LEFT JOIN jsonb_array_elements(events.sessions) AS existing(s) \
                         ON existing.s->>'name' = incoming.s->>'name' \
                 ), \
                 updated_at = NOW()",
        )
        .bind(event.id(calendar.season))
        .bind(&event.name)
        .bind(&event.circuit)
        .bind(calendar.season)
        .bind(event.round)
        .bind(event.date)
        .bind(&event.time_zone)
        .bind(&sessions)
        .execute(&mut *tx)
        .await?;
        summary.events += 1;
    }

    tx.commit().await?;
    Ok(summary)
}

fn sessions_document(event: &EventConfig) -> Value {
    Value::Array(
        event
            .sessions
            .iter()
            .map(|s| {
                json!({
                    "name": s.name,
                    "date": s.date,
                    "start_time": s.start_time,
                    "end_time": s.end_time,
                    "session_result": {}
                })
            })
            .collect(),
    )
}
