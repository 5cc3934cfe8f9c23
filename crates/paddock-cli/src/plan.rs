//! Plan command handler: a dry run of the scheduler's startup scan.

use chrono::Utc;
use paddock_core::{ScanEvent, SkipReason};

/// Print the result jobs a scheduler rescan would register right now, plus
/// everything it would pass over, without scheduling anything.
///
/// # Errors
///
/// Returns an error if the event scan fails.
pub(crate) async fn run_plan(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let events = paddock_db::list_events(pool).await?;
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

    println!("{} job(s) would be registered:", outcome.jobs.len());
    for job in &outcome.jobs {
        println!(
            "  {} round {:>2}  {:<17} fires {}",
            job.event_id,
            job.round,
            job.kind.name(),
            job.run_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    let mut populated = 0usize;
    for skip in &outcome.skips {
        match &skip.reason {
            SkipReason::AlreadyPopulated => populated += 1,
            SkipReason::Elapsed(run_at) => println!(
                "  skipped {} {}: run instant {} already elapsed",
                skip.event_id,
                skip.session,
                run_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            SkipReason::UnknownKind => println!(
                "  skipped {} {}: unknown session name",
                skip.event_id, skip.session
            ),
            SkipReason::BadTimestamp(error) => println!(
                "  skipped {} {}: {error}",
                skip.event_id, skip.session
            ),
            SkipReason::MalformedSessions(error) => println!(
                "  skipped {}: sessions document did not decode: {error}",
                skip.event_id
            ),
        }
    }
    println!("{populated} session(s) already have results");

    Ok(())
}
