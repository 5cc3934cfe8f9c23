//! Subprocess wrapper around the external results scraper.

use std::process::Stdio;
use std::time::Duration;

use paddock_core::TriggerKind;
use tokio::process::Command;

use crate::ResultsError;

const STDERR_TAIL_CHARS: usize = 400;

/// Runs the external scraper that fetches live timing data and writes the
/// artifact files this crate decodes.
///
/// The configured command line is split on whitespace into a program and
/// leading arguments; each invocation appends `<mode> <season> <round>`.
#[derive(Debug, Clone)]
pub struct ScraperRunner {
    program: String,
    base_args: Vec<String>,
    timeout: Duration,
}

impl ScraperRunner {
    /// # Errors
    ///
    /// Returns [`ResultsError::EmptyCommand`] if the command line contains
    /// no program.
    pub fn new(command: &str, timeout_secs: u64) -> Result<Self, ResultsError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(ResultsError::EmptyCommand)?;
        Ok(Self {
            program,
            base_args: parts.collect(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Invoke the scraper for one category of one round and wait for it to
    /// finish writing artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`ResultsError::Spawn`] if the program cannot be started,
    /// [`ResultsError::ScraperFailed`] on a non-zero exit, and
    /// [`ResultsError::ScraperTimeout`] if it outlives the configured limit.
    pub async fn run(&self, mode: TriggerKind, season: i32, round: i32) -> Result<(), ResultsError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.base_args)
            .arg(mode.as_str())
            .arg(season.to_string())
            .arg(round.to_string())
            .stdin(Stdio::null())
            // reap the child if the timeout drops the future mid-run
            .kill_on_drop(true);

        tracing::debug!(program = %self.program, mode = %mode, season, round, "running scraper");

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ResultsError::ScraperTimeout {
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| ResultsError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(ResultsError::ScraperFailed {
                status: output.status,
                stderr_tail: stderr_tail(&output.stderr),
            });
        }

        Ok(())
    }
}

fn stderr_tail(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    let skip = text.chars().count().saturating_sub(STDERR_TAIL_CHARS);
    text.chars().skip(skip).collect()
}
