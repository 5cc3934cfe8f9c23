//! One-shot result-trigger scheduling.
//!
//! At server startup the scheduler scans every stored event and registers
//! one in-process timer per session that still needs results. Timers do not
//! survive a restart; the startup rescan is the recovery mechanism, and
//! sessions whose run instant has already passed are reported and left to
//! the manual trigger endpoints.

mod dispatch;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use paddock_core::{AppConfig, ScanEvent, SessionJob, SkipReason, SkippedSession};
use sqlx::PgPool;
use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use dispatch::Dispatcher;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Db(#[from] paddock_db::DbError),
    #[error(transparent)]
    Scheduler(#[from] JobSchedulerError),
}

/// Builds and starts the result-trigger scheduler.
///
/// Scans the stored events, registers a one-shot job per session that still
/// needs results and starts the scheduler. Returns the running
/// [`JobScheduler`] handle; keep it alive for the lifetime of the process,
/// since dropping it shuts down every timer.
///
/// # Errors
///
/// Returns [`SchedulerError`] if the event scan fails, a job cannot be
/// registered, or the scheduler fails to initialise or start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, SchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let events = paddock_db::list_events(&pool).await?;
    let scan_events: Vec<ScanEvent> = events
        .into_iter()
        .map(|row| ScanEvent {
            id: row.id,
            season: row.season,
            round: row.round,
            time_zone: row.time_zone,
            sessions: row.sessions,
        })
        .collect();

    let outcome = paddock_core::plan_session_jobs(&scan_events, Utc::now());
    log_skips(&outcome.skips);

    let dispatcher = Arc::new(Dispatcher::new(
        config.base_url.clone(),
        crate::middleware::dispatch_bearer_token(),
    ));
    for job in &outcome.jobs {
        register_session_job(&scheduler, Arc::clone(&dispatcher), job).await?;
    }

    tracing::info!(
        scheduled = outcome.jobs.len(),
        skipped = outcome.skips.len(),
        "scheduler: result triggers registered"
    );

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register one one-shot trigger job.
///
/// The planner only emits future instants, but the clock keeps moving
/// between planning and registration; a job that slips past `now` in that
/// window fires immediately instead of being lost.
async fn register_session_job(
    scheduler: &JobScheduler,
    dispatcher: Arc<Dispatcher>,
    job: &SessionJob,
) -> Result<(), JobSchedulerError> {
    let run_at = Instant::now() + delay_until(job.run_at, Utc::now());
    let descriptor = job.clone();

    let one_shot = Job::new_one_shot_at_instant_async(run_at, move |_uuid, _lock| {
        let dispatcher = Arc::clone(&dispatcher);
        let job = descriptor.clone();

        Box::pin(async move {
            tracing::info!(
                event_id = %job.event_id,
                session = job.kind.name(),
                "scheduler: firing result trigger"
            );
            dispatcher
                .trigger(job.kind.trigger(), job.season, job.round)
                .await;
        })
    })?;

    scheduler.add(one_shot).await?;
    tracing::info!(
        event_id = %job.event_id,
        session = job.kind.name(),
        run_at = %job.run_at,
        "scheduler: one-shot trigger registered"
    );
    Ok(())
}

fn delay_until(run_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (run_at - now).to_std().unwrap_or(Duration::ZERO)
}

fn log_skips(skips: &[SkippedSession]) {
    for skip in skips {
        match &skip.reason {
            SkipReason::AlreadyPopulated => {
                tracing::info!(
                    event_id = %skip.event_id,
                    session = %skip.session,
                    "scheduler: session already has results"
                );
            }
            SkipReason::Elapsed(run_at) => {
                tracing::info!(
                    event_id = %skip.event_id,
                    session = %skip.session,
                    run_at = %run_at,
                    "scheduler: run instant already elapsed; manual trigger required"
                );
            }
            SkipReason::UnknownKind => {
                tracing::warn!(
                    event_id = %skip.event_id,
                    session = %skip.session,
                    "scheduler: unknown session name"
                );
            }
            SkipReason::BadTimestamp(error) => {
                tracing::warn!(
                    event_id = %skip.event_id,
                    session = %skip.session,
                    error,
                    "scheduler: session timestamp did not resolve"
                );
            }
            SkipReason::MalformedSessions(error) => {
                tracing::warn!(
                    event_id = %skip.event_id,
                    error,
                    "scheduler: sessions document did not decode; event skipped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use sqlx::PgPool;

    #[test]
    fn delay_until_clamps_past_instants_to_zero() {
        let now = Utc.with_ymd_and_hms(2025, 3, 16, 16, 0, 0).unwrap();
        let past = Utc.with_ymd_and_hms(2025, 3, 16, 15, 0, 0).unwrap();
        assert_eq!(delay_until(past, now), Duration::ZERO);

        let future = Utc.with_ymd_and_hms(2025, 3, 16, 17, 0, 0).unwrap();
        assert_eq!(delay_until(future, now), Duration::from_secs(3600));
    }

    async fn seed_event(pool: &PgPool, id: &str, round: i32, race_date: &str) {
        sqlx::query(
            "INSERT INTO events (id, name, circuit, season, round, date, time_zone, sessions) \
             VALUES ($1, $2, 'sakhir', 2025, $3, '2025-04-13', 'Asia/Bahrain', $4)",
        )
        .bind(id)
        .bind(format!("Grand Prix {round}"))
        .bind(round)
        .bind(json!([{
            "name": "Race",
            "date": race_date,
            "start_time": "15:00:00",
            "end_time": "17:00:00",
            "session_result": {}
        }]))
        .execute(pool)
        .await
        .unwrap();
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn build_scheduler_starts_with_an_empty_store(pool: PgPool) {
        let config = crate::test_support::app_config(std::path::Path::new("/tmp"), "true");
        let mut scheduler = build_scheduler(pool, config).await.unwrap();
        scheduler.shutdown().await.unwrap();
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn build_scheduler_registers_pending_and_skips_elapsed(pool: PgPool) {
        // One long-gone session, one far-future one. Both must leave the
        // scheduler startable; the elapsed session is only reported.
        seed_event(&pool, "gp-2024-sakhir", 1, "2024-03-10").await;
        seed_event(&pool, "gp-2099-sakhir", 2, "2099-03-10").await;

        let config = crate::test_support::app_config(std::path::Path::new("/tmp"), "true");
        let mut scheduler = build_scheduler(pool, config).await.unwrap();
        scheduler.shutdown().await.unwrap();
    }
}
