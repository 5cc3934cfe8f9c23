//! Decoding of scraped session artifacts and the subprocess that produces
//! them.
//!
//! The scraper is an external program; it drops one JSON file per session
//! under a per-round directory. This crate locates and reads those files,
//! decodes their loosely typed result entries into something the ingestion
//! pipeline can rank, and accumulates the per-team point deltas.

pub mod artifact;
pub mod error;
pub mod ranking;
pub mod runner;

pub use artifact::{
    artifact_path, decode_position, decode_results, read_artifact, DecodeOutcome, DecodedEntry,
    RawEntry, SessionArtifact, SkippedEntry,
};
pub use error::ResultsError;
pub use ranking::{build_race_results, find_winner, TeamDeltas};
pub use runner::ScraperRunner;
