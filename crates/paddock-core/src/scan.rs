//! Store scan that plans one-shot result jobs.
//!
//! The planner is pure: it takes the stored events and a reference instant
//! and returns what should be scheduled plus everything it passed over, with
//! the reason. Callers decide how to log or surface the skips. Timers are
//! in-process only, so a full rescan at startup (or via the CLI) is the one
//! recovery mechanism after a restart.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::clock;
use crate::event::SessionDoc;
use crate::session::SessionKind;

/// Minimal view of a stored event needed to plan its session jobs.
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub id: String,
    pub season: i32,
    pub round: i32,
    pub time_zone: String,
    pub sessions: Value,
}

/// A session whose results job should be scheduled.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionJob {
    pub event_id: String,
    pub season: i32,
    pub round: i32,
    pub kind: SessionKind,
    pub run_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Result set already holds entries; nothing left to fetch.
    AlreadyPopulated,
    /// Execution instant is already in the past. The manual trigger
    /// endpoints are the recovery path for these.
    Elapsed(DateTime<Utc>),
    /// Session name is outside the known set.
    UnknownKind,
    /// The local end time could not be resolved in the event's zone.
    BadTimestamp(String),
    /// The event's sessions document failed to decode; the whole event is
    /// skipped and the session name is reported as `"*"`.
    MalformedSessions(String),
}

/// One session (or whole event) the planner passed over.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSession {
    pub event_id: String,
    pub season: i32,
    pub round: i32,
    pub session: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub jobs: Vec<SessionJob>,
    pub skips: Vec<SkippedSession>,
}

/// Plan result jobs for every stored session that still needs one.
///
/// A session qualifies when its result set has no entries, its name parses
/// to a known kind and its execution instant is strictly after `now`.
#[must_use]
pub fn plan_session_jobs(events: &[ScanEvent], now: DateTime<Utc>) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for event in events {
        let skip = |session: &str, reason: SkipReason| SkippedSession {
            event_id: event.id.clone(),
            season: event.season,
            round: event.round,
            session: session.to_string(),
            reason,
        };

        let sessions: Vec<SessionDoc> = match serde_json::from_value(event.sessions.clone()) {
            Ok(sessions) => sessions,
            Err(err) => {
                outcome
                    .skips
                    .push(skip("*", SkipReason::MalformedSessions(err.to_string())));
                continue;
            }
        };

        for session in sessions {
            if session.has_results() {
                outcome
                    .skips
                    .push(skip(&session.name, SkipReason::AlreadyPopulated));
                continue;
            }

            let Some(kind) = SessionKind::from_name(&session.name) else {
                outcome
                    .skips
                    .push(skip(&session.name, SkipReason::UnknownKind));
                continue;
            };

            let run_at = match clock::execution_instant(
                session.date,
                session.end_time,
                &event.time_zone,
            ) {
                Ok(run_at) => run_at,
                Err(err) => {
                    outcome
                        .skips
                        .push(skip(&session.name, SkipReason::BadTimestamp(err.to_string())));
                    continue;
                }
            };

            if run_at <= now {
                outcome
                    .skips
                    .push(skip(&session.name, SkipReason::Elapsed(run_at)));
                continue;
            }

            outcome.jobs.push(SessionJob {
                event_id: event.id.clone(),
                season: event.season,
                round: event.round,
                kind,
                run_at,
            });
        }
    }

    outcome
}
