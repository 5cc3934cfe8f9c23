//! Shapes of the JSONB documents stored on an event row.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One session entry inside an event's `sessions` document.
///
/// `session_result` stays an opaque JSON value: scraped result sets are keyed
/// by ordinal rank ("first", "second", ...) with provider-specific entry
/// shapes, and older documents occasionally carry a list instead of a map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDoc {
    pub name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default = "empty_result_set")]
    pub session_result: Value,
}

fn empty_result_set() -> Value {
    Value::Object(serde_json::Map::new())
}

impl SessionDoc {
    #[must_use]
    pub fn has_results(&self) -> bool {
        has_result_entries(&self.session_result)
    }
}

/// One classified finisher in the stored `race_results` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub driver: String,
    pub position: i32,
    #[serde(default)]
    pub time: Option<String>,
}

/// Whether a stored result set already holds real entries.
///
/// Keys beginning with `$` or `_` are store bookkeeping, not results, and do
/// not count as entries. Legacy documents sometimes hold a list rather than
/// an ordinal map; a non-empty list counts as populated.
#[must_use]
pub fn has_result_entries(result: &Value) -> bool {
    match result {
        Value::Object(map) => map
            .keys()
            .any(|k| !k.starts_with('$') && !k.starts_with('_')),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}
