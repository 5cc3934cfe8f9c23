//! Session artifact files and their loosely typed result entries.
//!
//! Artifacts come from the scraper as JSON with a `results` object keyed by
//! ordinal rank ("first", "second", ...). Entry fields vary with the
//! provider and with how the data was exported, so positions and points are
//! decoded defensively field by field instead of through one rigid schema.

use std::path::{Path, PathBuf};

use paddock_core::SessionKind;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::ResultsError;

// ---------------------------------------------------------------------------
// Artifact file access
// ---------------------------------------------------------------------------

/// Path of the artifact the scraper writes for one session of one round:
/// `<results_dir>/<season>/<round>/<file>.json`.
#[must_use]
pub fn artifact_path(results_dir: &Path, season: i32, round: i32, kind: SessionKind) -> PathBuf {
    results_dir
        .join(season.to_string())
        .join(round.to_string())
        .join(kind.artifact_file())
}

/// Raw scraper artifact for one session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionArtifact {
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub results: Value,
}

impl SessionArtifact {
    /// The results as an ordinal-keyed object, or `None` when the artifact
    /// carries something else (missing, null, or a non-object).
    #[must_use]
    pub fn results_object(&self) -> Option<&Map<String, Value>> {
        self.results.as_object()
    }
}

/// Read and parse one artifact file.
///
/// # Errors
///
/// Returns [`ResultsError::Io`] if the file cannot be read and
/// [`ResultsError::Parse`] if it is not valid JSON.
pub async fn read_artifact(path: &Path) -> Result<SessionArtifact, ResultsError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ResultsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

    serde_json::from_str(&raw).map_err(|e| ResultsError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Entry decoding
// ---------------------------------------------------------------------------

/// One result entry as it appears in an artifact. Unknown fields (sector
/// times, tyre compounds, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub position: Option<Value>,
    #[serde(default)]
    pub points: Option<Value>,
    #[serde(default)]
    pub time: Option<String>,
}

/// A result entry reduced to what ingestion needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEntry {
    /// Ordinal key the entry was stored under, kept for logging.
    pub key: String,
    pub driver: String,
    /// Finishing position, when one could be decoded.
    pub rank: Option<i32>,
    pub points: f64,
    pub time: Option<String>,
}

/// An entry that could not be decoded, with the reason it was passed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct DecodeOutcome {
    pub entries: Vec<DecodedEntry>,
    pub skipped: Vec<SkippedEntry>,
}

/// Decode every entry of an ordinal-keyed result object.
///
/// Store bookkeeping keys (leading `$` or `_`) are ignored outright. An
/// entry without a usable driver reference is skipped and reported; a
/// missing or undecodable position or points value is not fatal, the entry
/// keeps `rank: None` or zero points instead.
#[must_use]
pub fn decode_results(results: &Map<String, Value>) -> DecodeOutcome {
    let mut outcome = DecodeOutcome::default();

    for (key, value) in results {
        if key.starts_with('$') || key.starts_with('_') {
            continue;
        }

        let raw: RawEntry = match serde_json::from_value(value.clone()) {
            Ok(raw) => raw,
            Err(err) => {
                outcome.skipped.push(SkippedEntry {
                    key: key.clone(),
                    reason: format!("undecodable entry: {err}"),
                });
                continue;
            }
        };

        let Some(driver) = raw.driver.filter(|d| !d.trim().is_empty()) else {
            outcome.skipped.push(SkippedEntry {
                key: key.clone(),
                reason: "missing driver reference".to_string(),
            });
            continue;
        };

        let rank = raw.position.as_ref().and_then(decode_position);
        let points = raw.points.as_ref().and_then(Value::as_f64).unwrap_or(0.0);

        outcome.entries.push(DecodedEntry {
            key: key.clone(),
            driver,
            rank,
            points,
            time: raw.time,
        });
    }

    outcome
}

/// Decode a finishing position from any of the encodings artifacts use:
/// a bare number, `{"Position": <n>}`, or the extended JSON form
/// `{"$numberInt": "<n>"}`. When an object carries both keys, `Position`
/// wins.
#[must_use]
pub fn decode_position(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_f64().and_then(finite_rank),
        Value::Object(map) => {
            if let Some(inner) = map.get("Position") {
                decode_position(inner)
            } else if let Some(inner) = map.get("$numberInt") {
                inner.as_str().and_then(|s| s.parse::<i32>().ok())
            } else {
                None
            }
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)] // ranks are tiny; truncation matches integer coercion
fn finite_rank(n: f64) -> Option<i32> {
    if n.is_finite() && n >= 1.0 && n <= f64::from(i32::MAX) {
        Some(n as i32)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "artifact_test.rs"]
mod tests;
