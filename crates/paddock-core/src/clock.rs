//! Session time arithmetic.
//!
//! Event documents store a local calendar date, local wall-clock times and an
//! IANA zone name. Scheduling needs a single UTC instant, computed through
//! the zone's real offset rules so DST transitions land correctly.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Hours between a session's local end time and when its results job runs.
/// Covers the gap until timing providers publish final classification.
pub const RESULTS_DELAY_HOURS: i64 = 2;

#[derive(Debug, Error)]
pub enum TimeError {
    #[error("unknown IANA time zone: {0}")]
    UnknownZone(String),

    #[error("local time {date} {time} does not exist in zone {zone} (DST gap)")]
    NonexistentLocalTime {
        date: NaiveDate,
        time: NaiveTime,
        zone: String,
    },
}

/// Resolve a local date and wall-clock time in the given IANA zone to a UTC
/// instant.
///
/// A wall-clock time that falls twice during a backward DST transition
/// resolves to the earlier of the two instants. A time skipped by a forward
/// transition is rejected as malformed rather than guessed at.
///
/// # Errors
///
/// Returns `TimeError` if the zone name is not a known IANA zone or the
/// local time does not exist in it.
pub fn zoned_instant(
    date: NaiveDate,
    time: NaiveTime,
    zone: &str,
) -> Result<DateTime<Utc>, TimeError> {
    let tz: Tz = zone
        .parse()
        .map_err(|_| TimeError::UnknownZone(zone.to_string()))?;

    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => Err(TimeError::NonexistentLocalTime {
            date,
            time,
            zone: zone.to_string(),
        }),
    }
}

/// UTC instant at which the results job for a session should run: the
/// session's local end time resolved through its zone, plus the fixed
/// publication delay.
///
/// # Errors
///
/// Returns `TimeError` if the zone is unknown or the local end time falls in
/// a DST gap.
pub fn execution_instant(
    date: NaiveDate,
    end_time: NaiveTime,
    zone: &str,
) -> Result<DateTime<Utc>, TimeError> {
    Ok(zoned_instant(date, end_time, zone)? + Duration::hours(RESULTS_DELAY_HOURS))
}
