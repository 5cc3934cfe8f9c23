//! Shared domain types and configuration for the paddock services.
//!
//! Everything here is deliberately free of I/O beyond reading environment
//! variables and the calendar file: the database layer lives in
//! `paddock-db`, artifact handling in `paddock-results`, and the HTTP
//! surface in `paddock-server`.

use thiserror::Error;

/// Errors raised while assembling configuration from the environment or
/// loading the season calendar file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read calendar file {path}: {source}")]
    CalendarFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse calendar file: {0}")]
    CalendarFileParse(#[from] serde_yaml::Error),

    #[error("calendar validation failed: {0}")]
    Validation(String),
}

pub mod app_config;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod event;
pub mod scan;
pub mod session;

pub use app_config::{AppConfig, Environment};
pub use calendar::{load_calendar, CalendarFile, DriverConfig, EventConfig, SessionConfig, TeamConfig};
pub use clock::{execution_instant, zoned_instant, TimeError, RESULTS_DELAY_HOURS};
pub use config::{load_app_config, load_app_config_from_env};
pub use event::{has_result_entries, RankedEntry, SessionDoc};
pub use scan::{plan_session_jobs, ScanEvent, ScanOutcome, SessionJob, SkipReason, SkippedSession};
pub use session::{SessionKind, TriggerKind};
