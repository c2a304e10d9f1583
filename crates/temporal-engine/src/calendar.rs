//! ISO-calendar primitives shared by the resolvers and the recurrence builder.
//!
//! Everything here is a pure function of its arguments. Local (wall-clock)
//! values are `NaiveDateTime`s; they become instants only through
//! [`localize`], which owns the DST policy:
//!
//! - an ambiguous local time (fall back) takes the earlier offset
//! - a local time inside a gap (spring forward) moves forward one hour

use chrono::{
    DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta,
    TimeZone,
};
use chrono_tz::Tz;

use crate::error::{Result, TemporalError};

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| TemporalError::InvalidTimezone(format!("'{}'", s)))
}

/// Parse an instant in `tz`, such as the caller's "now".
///
/// Accepts an RFC 3339 instant (converted into `tz`) or a local datetime
/// `YYYY-MM-DDTHH:MM[:SS]` read as wall-clock time in `tz`.
pub fn parse_instant(s: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(tz));
    }
    let naive = parse_local_datetime(s)
        .ok_or_else(|| TemporalError::InvalidDatetime(format!("'{}'", s)))?;
    localize(naive, tz)
}

/// Parse `YYYY-MM-DDTHH:MM[:SS]` (a space is accepted in place of `T`).
pub(crate) fn parse_local_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parse a plain `YYYY-MM-DD` date.
pub(crate) fn parse_plain_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Turn a wall-clock datetime into an instant in `tz`.
pub fn localize(naive: NaiveDateTime, tz: &Tz) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            let shifted = naive.checked_add_signed(TimeDelta::hours(1))?;
            tz.from_local_datetime(&shifted).earliest()
        })
        .ok_or_else(|| {
            TemporalError::InvalidDatetime(format!("local time {} does not exist in {}", naive, tz))
        })
}

/// Build a clock time, reporting `field` when out of range.
pub(crate) fn clock_time(hour: u32, minute: u32, field: &'static str) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| TemporalError::field(field, format!("{hour:02}:{minute:02}")))
}

/// Parse a clock time: `HH:mm` or `HH:mm:ss`.
pub fn parse_clock_time(s: &str, field: &'static str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| TemporalError::field(field, s))
}

/// ISO 8601 weekday number of `date`, Monday = 1 … Sunday = 7.
pub fn iso_weekday(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

/// Ordinal week of the month: days 1–7 are week 1, 8–14 week 2, and so on.
///
/// This is the `n` in "the n-th Tuesday of the month".
pub fn week_of_month(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7 + 1
}

/// Move `anchor` to ISO weekday `weekday` (1–7) without landing before it.
///
/// If the anchor's weekday number is greater than the requested one, the
/// anchor first rolls forward one week; the weekday is then set within the
/// Monday-based week. Returns `None` only when the result leaves chrono's
/// supported range.
pub fn align_to_iso_weekday(anchor: NaiveDate, weekday: u32) -> Option<NaiveDate> {
    let current = iso_weekday(anchor);
    let base = if current > weekday {
        anchor.checked_add_days(Days::new(7))?
    } else {
        anchor
    };
    base.checked_sub_days(Days::new(u64::from(current - 1)))?
        .checked_add_days(Days::new(u64::from(weekday - 1)))
}

/// First day of `year`-`month`.
pub(crate) fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| TemporalError::InvalidDatetime(format!("no such month: {year}-{month:02}")))
}

/// RFC 3339 with second precision and a numeric offset, e.g.
/// `2024-01-04T10:00:00+00:00`.
pub fn format_instant<T: TimeZone>(dt: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
