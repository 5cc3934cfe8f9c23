//! Session kinds and the trigger categories they map onto.
//!
//! Stored events carry sessions by display name ("Practice 1", "Sprint
//! Qualifying", ...). Everything downstream works on the parsed
//! [`SessionKind`]: the scheduler uses it to pick a trigger endpoint and the
//! ingestion pipeline uses it to locate the scraped artifact file.

/// One kind of on-track session within a grand prix weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    Practice1,
    Practice2,
    Practice3,
    SprintQualifying,
    Sprint,
    Qualifying,
    Race,
}

impl SessionKind {
    pub const ALL: [SessionKind; 7] = [
        SessionKind::Practice1,
        SessionKind::Practice2,
        SessionKind::Practice3,
        SessionKind::SprintQualifying,
        SessionKind::Sprint,
        SessionKind::Qualifying,
        SessionKind::Race,
    ];

    /// Parse a stored session display name. Returns `None` for names outside
    /// the known set; callers are expected to log and skip those.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Practice 1" => Some(SessionKind::Practice1),
            "Practice 2" => Some(SessionKind::Practice2),
            "Practice 3" => Some(SessionKind::Practice3),
            "Sprint Qualifying" => Some(SessionKind::SprintQualifying),
            "Sprint" => Some(SessionKind::Sprint),
            "Qualifying" => Some(SessionKind::Qualifying),
            "Race" => Some(SessionKind::Race),
            _ => None,
        }
    }

    /// Display name as stored in event documents and the calendar file.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SessionKind::Practice1 => "Practice 1",
            SessionKind::Practice2 => "Practice 2",
            SessionKind::Practice3 => "Practice 3",
            SessionKind::SprintQualifying => "Sprint Qualifying",
            SessionKind::Sprint => "Sprint",
            SessionKind::Qualifying => "Qualifying",
            SessionKind::Race => "Race",
        }
    }

    /// Trigger category whose endpoint ingests results for this session.
    #[must_use]
    pub fn trigger(self) -> TriggerKind {
        match self {
            SessionKind::Practice1
            | SessionKind::Practice2
            | SessionKind::Practice3
            | SessionKind::SprintQualifying
            | SessionKind::Sprint => TriggerKind::Practices,
            SessionKind::Qualifying => TriggerKind::Qualifying,
            SessionKind::Race => TriggerKind::Race,
        }
    }

    /// Artifact file the scraper writes for this session.
    ///
    /// The names come from the scraper, which derives them by lowercasing the
    /// session name, hence the embedded space in the sprint qualifying file.
    #[must_use]
    pub fn artifact_file(self) -> &'static str {
        match self {
            SessionKind::Practice1 => "practice_fp1.json",
            SessionKind::Practice2 => "practice_fp2.json",
            SessionKind::Practice3 => "practice_fp3.json",
            SessionKind::SprintQualifying => "practice_sprint qualifying.json",
            SessionKind::Sprint => "practice_sprint.json",
            SessionKind::Qualifying => "qualifying.json",
            SessionKind::Race => "race.json",
        }
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The three ingestion endpoints a session job can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    Practices,
    Qualifying,
    Race,
}

impl TriggerKind {
    /// Path segment used in the trigger route and as the scraper mode argument.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerKind::Practices => "practices",
            TriggerKind::Qualifying => "qualifying",
            TriggerKind::Race => "race",
        }
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TriggerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "practices" => Ok(TriggerKind::Practices),
            "qualifying" => Ok(TriggerKind::Qualifying),
            "race" => Ok(TriggerKind::Race),
            other => Err(format!("unknown trigger category: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_round_trips_every_kind() {
        for kind in SessionKind::ALL {
            assert_eq!(SessionKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn from_name_rejects_unknown_names() {
        assert_eq!(SessionKind::from_name("Warm Up"), None);
        assert_eq!(SessionKind::from_name("practice 1"), None);
        assert_eq!(SessionKind::from_name(""), None);
    }

    #[test]
    fn practice_like_sessions_map_to_practices_trigger() {
        assert_eq!(SessionKind::Practice1.trigger(), TriggerKind::Practices);
        assert_eq!(SessionKind::Practice3.trigger(), TriggerKind::Practices);
        assert_eq!(
            SessionKind::SprintQualifying.trigger(),
            TriggerKind::Practices
        );
        assert_eq!(SessionKind::Sprint.trigger(), TriggerKind::Practices);
    }

    #[test]
    fn qualifying_and_race_map_to_their_own_triggers() {
        assert_eq!(SessionKind::Qualifying.trigger(), TriggerKind::Qualifying);
        assert_eq!(SessionKind::Race.trigger(), TriggerKind::Race);
    }

    #[test]
    fn sprint_qualifying_artifact_keeps_the_scraper_space() {
        assert_eq!(
            SessionKind::SprintQualifying.artifact_file(),
            "practice_sprint qualifying.json"
        );
    }

    #[test]
    fn trigger_kind_parses_path_segments() {
        assert_eq!("practices".parse(), Ok(TriggerKind::Practices));
        assert_eq!("race".parse(), Ok(TriggerKind::Race));
        assert!("sprint".parse::<TriggerKind>().is_err());
    }
}
