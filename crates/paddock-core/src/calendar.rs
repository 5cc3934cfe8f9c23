use std::collections::HashSet;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::session::SessionKind;
use crate::ConfigError;

/// One scheduled session of an event, with local times in the event's zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    pub name: String,
    /// Circuit slug, also the distinguishing part of the event id.
    pub circuit: String,
    pub round: i32,
    pub date: NaiveDate,
    /// IANA zone the session times are local to, e.g. `Asia/Bahrain`.
    pub time_zone: String,
    pub sessions: Vec<SessionConfig>,
}

impl EventConfig {
    /// Stable event id derived from season and circuit, e.g. `gp-2025-sakhir`.
    #[must_use]
    pub fn id(&self, season: i32) -> String {
        format!("gp-{season}-{}", self.circuit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamConfig {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    pub id: String,
    pub name: String,
    pub team: String,
}

#[derive(Debug, Deserialize)]
pub struct CalendarFile {
    pub season: i32,
    pub teams: Vec<TeamConfig>,
    pub drivers: Vec<DriverConfig>,
    pub events: Vec<EventConfig>,
}

/// Load and validate the season calendar from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_calendar(path: &Path) -> Result<CalendarFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CalendarFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let calendar: CalendarFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CalendarFileParse)?;

    validate_calendar(&calendar)?;

    Ok(calendar)
}

fn validate_calendar(calendar: &CalendarFile) -> Result<(), ConfigError> {
    let mut team_ids = HashSet::new();
    for team in &calendar.teams {
        if team.id.trim().is_empty() || team.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "team id and name must be non-empty".to_string(),
            ));
        }
        if !team_ids.insert(team.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate team id: '{}'",
                team.id
            )));
        }
    }

    let mut driver_ids = HashSet::new();
    for driver in &calendar.drivers {
        if driver.id.trim().is_empty() || driver.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "driver id and name must be non-empty".to_string(),
            ));
        }
        if !driver_ids.insert(driver.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate driver id: '{}'",
                driver.id
            )));
        }
        if !team_ids.contains(driver.team.as_str()) {
            return Err(ConfigError::Validation(format!(
                "driver '{}' references unknown team '{}'",
                driver.id, driver.team
            )));
        }
    }

    let mut rounds = HashSet::new();
    let mut circuits = HashSet::new();
    for event in &calendar.events {
        if event.name.trim().is_empty() || event.circuit.trim().is_empty() {
            return Err(ConfigError::Validation(
                "event name and circuit must be non-empty".to_string(),
            ));
        }
        if event.round < 1 {
            return Err(ConfigError::Validation(format!(
                "event '{}' has invalid round {}; rounds start at 1",
                event.name, event.round
            )));
        }
        if !rounds.insert(event.round) {
            return Err(ConfigError::Validation(format!(
                "duplicate round {} (event '{}')",
                event.round, event.name
            )));
        }
        if !circuits.insert(event.circuit.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate circuit '{}' (event '{}')",
                event.circuit, event.name
            )));
        }

        let mut session_names = HashSet::new();
        for session in &event.sessions {
            if SessionKind::from_name(&session.name).is_none() {
                return Err(ConfigError::Validation(format!(
                    "event '{}' has unknown session name '{}'",
                    event.name, session.name
                )));
            }
            if !session_names.insert(session.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "event '{}' lists session '{}' twice",
                    event.name, session.name
                )));
            }
            // Resolving both local times now surfaces zone typos and times
            // that fall in a DST gap before anything is written to the store.
            for local in [session.start_time, session.end_time] {
                if let Err(e) = clock::zoned_instant(session.date, local, &event.time_zone) {
                    return Err(ConfigError::Validation(format!(
                        "event '{}' session '{}': {e}",
                        event.name, session.name
                    )));
                }
            }
        }
    }

    Ok(())
}
