//! Resolution of a [`PartialDateSpec`] into one absolute instant.
//!
//! Resolution is a pipeline of pure steps, each usable on its own:
//!
//! 1. [`resolve_date_axis`]: pick the date from `day`, `iso_weekday` or
//!    `relative_offsets` (first present wins), starting from "now"
//! 2. [`apply_time_axis`]: override the time of day from `hour`/`minute`,
//!    then `time`, then the [`DefaultTimePolicy`]
//! 3. [`localize`](crate::calendar::localize): turn the wall-clock result
//!    into an instant in the caller's timezone
//!
//! The caller always supplies "now"; nothing here reads the system clock.

use std::fmt;

use chrono::{DateTime, Datelike, Months, NaiveDateTime, TimeDelta};
use chrono_tz::Tz;
use serde::Serialize;

use crate::calendar::{
    align_to_iso_weekday, clock_time, first_of_month, format_instant, localize, parse_clock_time,
    parse_instant, parse_timezone,
};
use crate::error::{Result, TemporalError};
use crate::model::{DefaultTimePolicy, OffsetUnit, PartialDateSpec, RelativeOffset};

// ── Output types ────────────────────────────────────────────────────────────

/// An absolute timestamp: RFC 3339 with a numeric offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResolvedInstant(String);

impl ResolvedInstant {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ResolvedInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResolvedInstant {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which date-axis rule produced a [`DateAxis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateRule {
    ExplicitDay,
    IsoWeekday,
    RelativeOffsets,
    /// No date-axis field was present; the date is "now".
    Unchanged,
}

/// Result of the date-axis step: a wall-clock datetime and the rule used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateAxis {
    pub rule: DateRule,
    pub local: NaiveDateTime,
}

// ── Public API ──────────────────────────────────────────────────────────────

/// Resolve `spec` into an absolute timestamp.
///
/// # Arguments
///
/// * `spec`: The extracted, possibly partial, date/time description
/// * `current_time`: "Now": an RFC 3339 instant or a local `YYYY-MM-DDTHH:MM[:SS]`
/// * `timezone`: An IANA timezone name in which `spec` is read
/// * `policy`: Time of day to use when `spec` carries no explicit time
///
/// # Errors
///
/// Returns [`TemporalError::InvalidTimezone`] or [`TemporalError::InvalidDatetime`]
/// for an unusable timezone or current time, and [`TemporalError::InvalidField`]
/// when a numeric or clock-time field of `spec` does not parse.
///
/// # Examples
///
/// ```
/// use temporal_engine::{resolve_instant, DefaultTimePolicy, PartialDateSpec};
///
/// let spec = PartialDateSpec::new().with_day("10");
/// let instant = resolve_instant(&spec, "2024-06-01T09:00", "UTC", DefaultTimePolicy::StartOfDay)
///     .unwrap();
/// assert_eq!(instant.as_str(), "2024-06-10T00:00:00+00:00");
/// ```
pub fn resolve_instant(
    spec: &PartialDateSpec,
    current_time: &str,
    timezone: &str,
    policy: DefaultTimePolicy,
) -> Result<ResolvedInstant> {
    let tz = parse_timezone(timezone)?;
    let now = parse_instant(current_time, &tz)?;
    let resolved = resolve_datetime(spec, &now, policy)?;
    Ok(ResolvedInstant(format_instant(&resolved)))
}

/// Typed form of [`resolve_instant`] for callers that already hold "now".
pub fn resolve_datetime(
    spec: &PartialDateSpec,
    now: &DateTime<Tz>,
    policy: DefaultTimePolicy,
) -> Result<DateTime<Tz>> {
    let axis = resolve_date_axis(spec, now)?;
    let local = apply_time_axis(axis.local, spec, policy)?;
    localize(local, &now.timezone())
}

/// Resolve only the date axis of `spec`, starting from `now`.
///
/// The first rule whose field is present wins: explicit `day`, then
/// `iso_weekday`, then `relative_offsets`. With none present the result is
/// `now` with [`DateRule::Unchanged`].
pub fn resolve_date_axis(spec: &PartialDateSpec, now: &DateTime<Tz>) -> Result<DateAxis> {
    let now_local = now.naive_local();

    if let Some(day) = &spec.day {
        let day: u32 = day.parse("day")?;
        return Ok(DateAxis {
            rule: DateRule::ExplicitDay,
            local: explicit_day(spec, now_local, day)?,
        });
    }

    if let Some(weekday) = &spec.iso_weekday {
        let weekday: u32 = weekday.parse("isoWeekday")?;
        return Ok(DateAxis {
            rule: DateRule::IsoWeekday,
            local: iso_weekday_in_anchor(spec, now_local, weekday)?,
        });
    }

    if !spec.relative_offsets.is_empty() {
        let totals = OffsetTotals::sum(&spec.relative_offsets);
        let sign = spec.relative_change.unwrap_or_default().sign();
        return Ok(DateAxis {
            rule: DateRule::RelativeOffsets,
            local: totals.apply(now, sign)?,
        });
    }

    Ok(DateAxis {
        rule: DateRule::Unchanged,
        local: now_local,
    })
}

/// Apply the time axis of `spec` to a wall-clock datetime.
///
/// An explicit `hour` (with `minute`, default 0) wins over `time`; with
/// neither, `policy` decides. Explicit and policy times have zero seconds.
pub fn apply_time_axis(
    local: NaiveDateTime,
    spec: &PartialDateSpec,
    policy: DefaultTimePolicy,
) -> Result<NaiveDateTime> {
    let date = local.date();

    if let Some(hour) = &spec.hour {
        let hour: u32 = hour.parse("hour")?;
        let minute: u32 = spec
            .minute
            .as_ref()
            .map(|m| m.parse("minute"))
            .transpose()?
            .unwrap_or(0);
        return Ok(date.and_time(clock_time(hour, minute, "hour")?));
    }

    if let Some(time) = &spec.time {
        return Ok(date.and_time(parse_clock_time(time, "time")?));
    }

    match policy {
        DefaultTimePolicy::Keep => Ok(local),
        DefaultTimePolicy::StartOfDay => Ok(date.and_time(clock_time(0, 0, "time")?)),
        DefaultTimePolicy::EndOfDay => Ok(date.and_time(clock_time(23, 59, "time")?)),
    }
}

// ── Date-axis rules ─────────────────────────────────────────────────────────

/// Rule 1: an explicit day-of-month, in the given year/month when both are
/// present, otherwise in the current one. The time of day is kept.
fn explicit_day(spec: &PartialDateSpec, now: NaiveDateTime, day: u32) -> Result<NaiveDateTime> {
    let date = match (&spec.year, &spec.month) {
        (Some(year), Some(month)) => {
            let year: i32 = year.parse("year")?;
            let month: u32 = month.parse("month")?;
            chrono::NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                TemporalError::InvalidDatetime(format!("no such date: {year}-{month:02}-{day:02}"))
            })?
        }
        _ => now.date().with_day(day).ok_or_else(|| {
            TemporalError::InvalidDatetime(format!(
                "day {day} does not exist in {}-{:02}",
                now.year(),
                now.month()
            ))
        })?,
    };
    Ok(date.and_time(now.time()))
}

/// Rule 2: the requested ISO weekday relative to an anchor.
///
/// The anchor is the first of the given month at 00:00 when a year or month
/// is present (the other filled in from "now"), otherwise "now" itself.
fn iso_weekday_in_anchor(
    spec: &PartialDateSpec,
    now: NaiveDateTime,
    weekday: u32,
) -> Result<NaiveDateTime> {
    if !(1..=7).contains(&weekday) {
        return Err(TemporalError::field("isoWeekday", weekday.to_string()));
    }

    let anchor = if spec.year.is_some() || spec.month.is_some() {
        let year = spec
            .year
            .as_ref()
            .map(|y| y.parse::<i32>("year"))
            .transpose()?
            .unwrap_or_else(|| now.year());
        let month = spec
            .month
            .as_ref()
            .map(|m| m.parse::<u32>("month"))
            .transpose()?
            .unwrap_or_else(|| now.month());
        first_of_month(year, month)?.and_time(clock_time(0, 0, "time")?)
    } else {
        now
    };

    let date = align_to_iso_weekday(anchor.date(), weekday).ok_or_else(|| {
        TemporalError::InvalidDatetime(format!("weekday {weekday} out of range from {anchor}"))
    })?;
    Ok(date.and_time(anchor.time()))
}

/// Per-unit sums of a spec's relative offsets.
///
/// Summing first and applying each unit once keeps "1 month + 1 month" from
/// clamping twice at a short month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct OffsetTotals {
    minutes: i64,
    hours: i64,
    days: i64,
    weeks: i64,
    months: i64,
    years: i64,
}

impl OffsetTotals {
    fn sum(offsets: &[RelativeOffset]) -> Self {
        let mut totals = OffsetTotals::default();
        for offset in offsets {
            let value = i64::from(offset.value);
            let slot = match offset.unit {
                OffsetUnit::Minute => &mut totals.minutes,
                OffsetUnit::Hour => &mut totals.hours,
                OffsetUnit::Day => &mut totals.days,
                OffsetUnit::Week => &mut totals.weeks,
                OffsetUnit::Month => &mut totals.months,
                OffsetUnit::Year => &mut totals.years,
            };
            *slot += value;
        }
        totals
    }

    /// Apply the totals in the fixed order minute, hour, day, week, month,
    /// year. Minutes and hours move the instant; the rest move the local date.
    fn apply(&self, now: &DateTime<Tz>, sign: i64) -> Result<NaiveDateTime> {
        let out_of_range =
            || TemporalError::InvalidDatetime("relative offset out of range".to_string());

        let mut instant = *now;
        for delta in [
            TimeDelta::try_minutes(sign * self.minutes),
            TimeDelta::try_hours(sign * self.hours),
        ] {
            instant = instant
                .checked_add_signed(delta.ok_or_else(out_of_range)?)
                .ok_or_else(out_of_range)?;
        }

        let mut local = instant.naive_local();
        for delta in [
            TimeDelta::try_days(sign * self.days),
            TimeDelta::try_weeks(sign * self.weeks),
        ] {
            local = local
                .checked_add_signed(delta.ok_or_else(out_of_range)?)
                .ok_or_else(out_of_range)?;
        }

        for months in [self.months, self.years * 12] {
            local = shift_months(local, sign, months).ok_or_else(out_of_range)?;
        }
        Ok(local)
    }
}

/// Calendar-month arithmetic. A day that does not exist in the target month
/// clamps to its last day.
fn shift_months(local: NaiveDateTime, sign: i64, months: i64) -> Option<NaiveDateTime> {
    let months = Months::new(u32::try_from(months).ok()?);
    if sign >= 0 {
        local.checked_add_months(months)
    } else {
        local.checked_sub_months(months)
    }
}
