//! Event duration from whatever the user said about length.

use chrono::{DateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::calendar::parse_clock_time;
use crate::error::{Result, TemporalError};

/// Used when nothing usable was given.
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

/// Duration-related fields extracted alongside a date spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationHint {
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// `HH:mm` or an RFC 3339 instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// Resolve a duration in minutes.
///
/// A positive `duration` wins; otherwise a positive `startTime`..`endTime`
/// span; otherwise [`DEFAULT_DURATION_MINUTES`].
///
/// # Errors
///
/// [`TemporalError::InvalidField`] when `startTime` or `endTime` does not
/// parse, or when one is a clock time and the other an instant.
pub fn resolve_duration(hint: &DurationHint) -> Result<u32> {
    if let Some(minutes) = hint.duration.filter(|m| *m > 0) {
        return Ok(minutes);
    }
    let (Some(start), Some(end)) = (hint.start_time.as_deref(), hint.end_time.as_deref()) else {
        return Ok(DEFAULT_DURATION_MINUTES);
    };

    let span = span_minutes(start, end)?;
    Ok(u32::try_from(span)
        .ok()
        .filter(|m| *m > 0)
        .unwrap_or(DEFAULT_DURATION_MINUTES))
}

fn span_minutes(start: &str, end: &str) -> Result<i64> {
    match (parse_point(start, "startTime")?, parse_point(end, "endTime")?) {
        (TimePoint::Clock(s), TimePoint::Clock(e)) => Ok((e - s).num_minutes()),
        (TimePoint::Instant(s), TimePoint::Instant(e)) => Ok((e - s).num_minutes()),
        _ => Err(TemporalError::field(
            "endTime",
            format!("'{end}' cannot be compared with '{start}'"),
        )),
    }
}

enum TimePoint {
    Clock(NaiveTime),
    Instant(DateTime<chrono::FixedOffset>),
}

fn parse_point(s: &str, field: &'static str) -> Result<TimePoint> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(s.trim()) {
        return Ok(TimePoint::Instant(instant));
    }
    parse_clock_time(s, field).map(TimePoint::Clock)
}
