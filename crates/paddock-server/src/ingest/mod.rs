//! Result ingestion: run the scraper, read its artifact, persist.
//!
//! Three entry points, one per trigger category. Practices walk every
//! practice-like session of the weekend with per-file isolation; qualifying
//! and race each consume a single artifact. The race path additionally
//! derives the classification, the winner and the driver/team aggregate
//! increments (see [`race`]).
//!
//! Every entry point checks the target session's stored result set before
//! the scraper runs: a session that already holds entries is never
//! re-ingested, so a duplicate schedule or repeated trigger call cannot
//! credit driver and team aggregates twice.

mod race;

pub(crate) use race::ingest_race;

use paddock_core::{has_result_entries, AppConfig, SessionDoc, SessionKind, TriggerKind};
use paddock_db::{DbError, EventRow};
use paddock_results::{
    artifact_path, decode_results, read_artifact, ResultsError, ScraperRunner, SkippedEntry,
};
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum IngestError {
    #[error("no event found for season {season} round {round}")]
    EventNotFound { season: i32, round: i32 },

    #[error("event {event_id} has no session named \"{name}\"")]
    SessionNotFound { event_id: String, name: String },

    #[error("event {event_id} already has results stored for {name}")]
    AlreadyIngested { event_id: String, name: String },

    #[error("stored sessions for event {event_id} do not decode: {source}")]
    MalformedSessions {
        event_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("race classification has no rank-1 entry; cannot resolve a winner")]
    NoWinner,

    #[error("failed to encode ranked results: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Results(#[from] ResultsError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl IngestError {
    /// Error code for the HTTP surface; mirrors the manual-trigger
    /// visibility rules: missing event or session is the caller's problem,
    /// a re-trigger of a stored session is a conflict, an unusable artifact
    /// is a validation failure, everything else is internal.
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Self::EventNotFound { .. } | Self::SessionNotFound { .. } => "not_found",
            Self::AlreadyIngested { .. } => "conflict",
            Self::NoWinner | Self::Results(ResultsError::MalformedArtifact { .. }) => {
                "validation_error"
            }
            Self::MalformedSessions { .. } | Self::Encode(_) | Self::Results(_) | Self::Db(_) => {
                "internal_error"
            }
        }
    }
}

/// Ingest every practice-like session of a round: the three free practices
/// on a standard weekend, sprint qualifying and the sprint on a sprint
/// weekend. Which files to read comes from the event's own session list, so
/// the weekend format never has to be guessed from the round number.
///
/// A session whose result set is already populated is skipped without being
/// overwritten; once every practice session is stored the whole call is
/// rejected as a conflict and the scraper does not run. A session whose
/// artifact is missing or unreadable is logged and left untouched; the
/// remaining sessions are still processed.
pub(crate) async fn ingest_practices(
    pool: &PgPool,
    config: &AppConfig,
    season: i32,
    round: i32,
) -> Result<EventRow, IngestError> {
    let event = paddock_db::get_event_by_round(pool, season, round)
        .await?
        .ok_or(IngestError::EventNotFound { season, round })?;
    let sessions = parse_sessions(&event)?;

    let mut pending = Vec::new();
    let mut stored = 0usize;
    for session in &sessions {
        let Some(kind) = SessionKind::from_name(&session.name) else {
            tracing::warn!(
                event_id = %event.id,
                session = %session.name,
                "unknown session name; skipped"
            );
            continue;
        };
        if kind.trigger() != TriggerKind::Practices {
            continue;
        }
        if has_result_entries(&session.session_result) {
            stored += 1;
            tracing::info!(
                event_id = %event.id,
                session = kind.name(),
                "session already has results; not re-ingested"
            );
            continue;
        }
        pending.push(kind);
    }

    if pending.is_empty() {
        if stored > 0 {
            return Err(IngestError::AlreadyIngested {
                event_id: event.id.clone(),
                name: "every practice session".to_string(),
            });
        }
        tracing::info!(event_id = %event.id, season, round, "no practice sessions to ingest");
        return refreshed(pool, &event.id).await;
    }

    let runner = ScraperRunner::new(&config.scraper_cmd, config.scraper_timeout_secs)?;
    runner.run(TriggerKind::Practices, season, round).await?;

    let mut ingested = 0usize;
    for kind in pending {
        match ingest_session_file(pool, config, &event, kind).await {
            Ok(()) => ingested += 1,
            Err(err) => {
                tracing::warn!(
                    event_id = %event.id,
                    session = kind.name(),
                    error = %err,
                    "practice session left untouched"
                );
            }
        }
    }

    tracing::info!(event_id = %event.id, season, round, ingested, "practice ingestion finished");
    refreshed(pool, &event.id).await
}

/// Ingest the qualifying artifact of a round into its "Qualifying" session.
/// A qualifying result that is already stored is never overwritten; the
/// call is rejected as a conflict before the scraper runs.
pub(crate) async fn ingest_qualifying(
    pool: &PgPool,
    config: &AppConfig,
    season: i32,
    round: i32,
) -> Result<EventRow, IngestError> {
    let event = paddock_db::get_event_by_round(pool, season, round)
        .await?
        .ok_or(IngestError::EventNotFound { season, round })?;
    let sessions = parse_sessions(&event)?;
    guard_not_ingested(&event, &sessions, SessionKind::Qualifying)?;

    let runner = ScraperRunner::new(&config.scraper_cmd, config.scraper_timeout_secs)?;
    runner.run(TriggerKind::Qualifying, season, round).await?;

    ingest_session_file(pool, config, &event, SessionKind::Qualifying).await?;

    tracing::info!(event_id = %event.id, season, round, "qualifying ingestion finished");
    refreshed(pool, &event.id).await
}

fn parse_sessions(event: &EventRow) -> Result<Vec<SessionDoc>, IngestError> {
    serde_json::from_value(event.sessions.clone()).map_err(|source| {
        IngestError::MalformedSessions {
            event_id: event.id.clone(),
            source,
        }
    })
}

/// Duplicate-trigger guard: refuse to re-ingest a session whose result set
/// already holds entries, leaving aggregates untouched.
fn guard_not_ingested(
    event: &EventRow,
    sessions: &[SessionDoc],
    kind: SessionKind,
) -> Result<(), IngestError> {
    let populated = sessions.iter().any(|session| {
        SessionKind::from_name(&session.name) == Some(kind)
            && has_result_entries(&session.session_result)
    });
    if populated {
        return Err(IngestError::AlreadyIngested {
            event_id: event.id.clone(),
            name: kind.name().to_string(),
        });
    }
    Ok(())
}

/// Read one session's artifact and store its raw result set on the named
/// session. The decode pass runs first so unusable entries are reported,
/// but the stored value is the artifact's own ordinal-keyed object.
async fn ingest_session_file(
    pool: &PgPool,
    config: &AppConfig,
    event: &EventRow,
    kind: SessionKind,
) -> Result<(), IngestError> {
    let path = artifact_path(&config.results_dir, event.season, event.round, kind);
    let artifact = read_artifact(&path).await?;
    let results = artifact
        .results_object()
        .ok_or_else(|| ResultsError::MalformedArtifact {
            path: path.clone(),
            reason: "`results` is not an object".to_string(),
        })?;

    log_skipped_entries(&event.id, kind, &decode_results(results).skipped);

    let updated =
        paddock_db::update_session_result(pool, &event.id, kind.name(), &artifact.results).await?;
    if updated == 0 {
        return Err(IngestError::SessionNotFound {
            event_id: event.id.clone(),
            name: kind.name().to_string(),
        });
    }

    Ok(())
}

fn log_skipped_entries(event_id: &str, kind: SessionKind, skipped: &[SkippedEntry]) {
    for entry in skipped {
        tracing::warn!(
            event_id,
            session = kind.name(),
            key = %entry.key,
            reason = %entry.reason,
            "result entry skipped"
        );
    }
}

/// Re-read the event after ingestion so callers return the stored state,
/// not the pre-update snapshot.
async fn refreshed(pool: &PgPool, event_id: &str) -> Result<EventRow, IngestError> {
    paddock_db::get_event(pool, event_id)
        .await?
        .ok_or(IngestError::Db(DbError::NotFound))
}
