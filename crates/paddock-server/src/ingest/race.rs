//! Race ingestion: classification, winner, and aggregate updates.

use paddock_core::{AppConfig, SessionKind, TriggerKind};
use paddock_db::EventRow;
use paddock_results::{
    artifact_path, build_race_results, decode_results, find_winner, read_artifact, DecodedEntry,
    ResultsError, ScraperRunner, TeamDeltas,
};
use sqlx::PgPool;

use super::{guard_not_ingested, log_skipped_entries, parse_sessions, refreshed, IngestError};

/// Ingest the race artifact of a round.
///
/// A race session that already holds results is rejected as a conflict
/// before the scraper runs, so a repeated trigger never credits the driver
/// and team aggregates a second time.
///
/// The classification must resolve a winner before anything is written:
/// the event update (raw results, ranked classification, finished flag and
/// winner) is a single statement, so a failed validation leaves the event
/// exactly as it was. Driver and team aggregates follow once the event is
/// stored; a driver that cannot be credited is logged and does not undo the
/// race result.
pub(crate) async fn ingest_race(
    pool: &PgPool,
    config: &AppConfig,
    season: i32,
    round: i32,
) -> Result<EventRow, IngestError> {
    let event = paddock_db::get_event_by_round(pool, season, round)
        .await?
        .ok_or(IngestError::EventNotFound { season, round })?;
    let kind = SessionKind::Race;
    let sessions = parse_sessions(&event)?;
    guard_not_ingested(&event, &sessions, kind)?;

    let runner = ScraperRunner::new(&config.scraper_cmd, config.scraper_timeout_secs)?;
    runner.run(TriggerKind::Race, season, round).await?;

    let path = artifact_path(&config.results_dir, event.season, event.round, kind);
    let artifact = read_artifact(&path).await?;
    let results = artifact
        .results_object()
        .ok_or_else(|| ResultsError::MalformedArtifact {
            path: path.clone(),
            reason: "`results` is not an object".to_string(),
        })?;

    let decoded = decode_results(results);
    log_skipped_entries(&event.id, kind, &decoded.skipped);

    let ranked = build_race_results(&decoded.entries);
    let winner = find_winner(&ranked).ok_or(IngestError::NoWinner)?.to_string();
    let ranked_value = serde_json::to_value(&ranked)?;

    let updated = paddock_db::finish_race(
        pool,
        &event.id,
        &artifact.results,
        &ranked_value,
        &winner,
    )
    .await?;
    if updated == 0 {
        return Err(IngestError::SessionNotFound {
            event_id: event.id.clone(),
            name: kind.name().to_string(),
        });
    }

    tracing::info!(
        event_id = %event.id,
        season,
        round,
        winner = %winner,
        classified = ranked.len(),
        "race result stored"
    );

    apply_driver_stats(pool, &event.id, &decoded.entries).await;
    refreshed(pool, &event.id).await
}

/// Credit a race's decoded entries to driver and team aggregates.
///
/// Every decoded entry counts as a grand prix entered, whether or not it
/// scored or was classified. Team deltas are folded per team first so each
/// team gets one update regardless of how many of its drivers finished.
/// Failures here are logged per driver or team and never abort the batch.
async fn apply_driver_stats(pool: &PgPool, event_id: &str, entries: &[DecodedEntry]) {
    let mut deltas = TeamDeltas::new();
    let mut credits: Vec<(&str, f64, bool, bool)> = Vec::with_capacity(entries.len());

    for entry in entries {
        let driver = match paddock_db::get_driver(pool, &entry.driver).await {
            Ok(Some(driver)) => driver,
            Ok(None) => {
                tracing::warn!(
                    event_id,
                    driver = %entry.driver,
                    "result references an unknown driver; stats skipped"
                );
                continue;
            }
            Err(err) => {
                tracing::warn!(
                    event_id,
                    driver = %entry.driver,
                    error = %err,
                    "driver lookup failed; stats skipped"
                );
                continue;
            }
        };

        deltas.add(&driver.team, entry.points);
        credits.push((
            entry.driver.as_str(),
            entry.points,
            entry.rank == Some(1),
            matches!(entry.rank, Some(1..=3)),
        ));
    }

    let driver_updates = credits
        .iter()
        .map(|&(driver_id, points, victory, podium)| {
            paddock_db::apply_race_result(pool, driver_id, points, victory, podium)
        });
    for (outcome, &(driver_id, ..)) in futures::future::join_all(driver_updates)
        .await
        .iter()
        .zip(&credits)
    {
        match outcome {
            Ok(0) => {
                tracing::warn!(event_id, driver = driver_id, "driver vanished before credit");
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(
                    event_id,
                    driver = driver_id,
                    error = %err,
                    "driver stats update failed"
                );
            }
        }
    }

    let team_deltas: Vec<(&str, f64)> = deltas.iter().collect();
    let team_updates = team_deltas
        .iter()
        .map(|&(team_id, delta)| paddock_db::add_team_points(pool, team_id, delta));
    for (outcome, &(team_id, delta)) in futures::future::join_all(team_updates)
        .await
        .iter()
        .zip(&team_deltas)
    {
        match outcome {
            Ok(0) => {
                tracing::warn!(event_id, team = team_id, "team vanished before credit");
            }
            Ok(_) => {
                tracing::debug!(event_id, team = team_id, delta, "team points credited");
            }
            Err(err) => {
                tracing::warn!(
                    event_id,
                    team = team_id,
                    error = %err,
                    "team points update failed"
                );
            }
        }
    }
}
