use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact {path} is malformed: {reason}")]
    MalformedArtifact { path: PathBuf, reason: String },

    #[error("scraper command is empty")]
    EmptyCommand,

    #[error("failed to spawn scraper `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("scraper exited with {status}: {stderr_tail}")]
    ScraperFailed {
        status: std::process::ExitStatus,
        stderr_tail: String,
    },

    #[error("scraper timed out after {secs}s")]
    ScraperTimeout { secs: u64 },
}
