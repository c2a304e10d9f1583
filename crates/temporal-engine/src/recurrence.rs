//! Recurrence rule construction and monthly-pattern derivation.
//!
//! A [`RecurrenceDescriptor`] becomes a validated [`RecurrenceRule`], which
//! renders to a provider-ready `RRULE:` string. When a descriptor combines
//! `byMonthDay` with `byWeekDay`, the rule is materialized through a
//! [`Materializer`] and the day-of-month, weekday and week-of-month values
//! it actually produces are read off the concrete occurrences.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::calendar::{
    iso_weekday, localize, parse_instant, parse_local_datetime, parse_plain_date, parse_timezone,
    week_of_month,
};
use crate::error::{Result, TemporalError};
use crate::materialize::{Materializer, RruleMaterializer};
use crate::model::{DayCode, Frequency, RecurrenceDescriptor};

/// Default ceiling on materialized occurrences: two years of a daily rule.
pub const DEFAULT_MAX_OCCURRENCES: u16 = 730;

/// Largest accepted `max_occurrences`. Overflow is detected by asking for one more.
pub const MAX_OCCURRENCES_LIMIT: u16 = u16::MAX - 1;

/// Tuning for recurrence materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceOptions {
    /// Rules producing more occurrences than this fail with
    /// [`TemporalError::MaterializationOverflow`]. At most
    /// [`MAX_OCCURRENCES_LIMIT`].
    pub max_occurrences: u16,
}

impl Default for RecurrenceOptions {
    fn default() -> Self {
        Self {
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
        }
    }
}

// ── RecurrenceRule ──────────────────────────────────────────────────────────

/// How a rule terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleBound {
    Count(u32),
    /// Last instant an occurrence may start, in UTC.
    Until(DateTime<Utc>),
}

/// A validated recurrence rule in a specific timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    pub by_week_day: Vec<DayCode>,
    pub by_month_day: Vec<u8>,
    pub bound: RuleBound,
    /// DTSTART; needed only for materialization.
    pub start: Option<DateTime<Tz>>,
    pub timezone: Tz,
}

impl RecurrenceRule {
    /// Validate `descriptor`, returning `Ok(None)` when it lacks a frequency,
    /// an interval or a bound.
    ///
    /// `count` wins when both `count` and `until` are given.
    pub fn from_descriptor(
        descriptor: &RecurrenceDescriptor,
        timezone: Tz,
    ) -> Result<Option<Self>> {
        let (Some(frequency), Some(interval)) = (descriptor.frequency, descriptor.interval) else {
            return Ok(None);
        };
        let bound = match (descriptor.count, descriptor.until.as_deref()) {
            (Some(count), _) => RuleBound::Count(count),
            (None, Some(until)) => RuleBound::Until(parse_until(until, &timezone)?),
            (None, None) => return Ok(None),
        };

        if interval == 0 {
            return Err(TemporalError::InvalidRule("interval must be at least 1".to_string()));
        }
        if let RuleBound::Count(0) = bound {
            return Err(TemporalError::InvalidRule("count must be at least 1".to_string()));
        }
        if let Some(day) = descriptor.by_month_day.iter().find(|d| !(1..=31).contains(*d)) {
            return Err(TemporalError::InvalidRule(format!(
                "byMonthDay value {day} is outside 1-31"
            )));
        }
        if frequency == Frequency::Weekly && !descriptor.by_month_day.is_empty() {
            return Err(TemporalError::InvalidRule(
                "byMonthDay cannot be combined with a weekly frequency".to_string(),
            ));
        }

        let start = descriptor
            .start
            .as_deref()
            .map(|s| parse_instant(s, &timezone))
            .transpose()?;

        Ok(Some(Self {
            frequency,
            interval,
            by_week_day: descriptor.by_week_day.clone(),
            by_month_day: descriptor.by_month_day.clone(),
            bound,
            start,
            timezone,
        }))
    }

    /// The same rule anchored at `start`.
    pub fn with_start(mut self, start: DateTime<Tz>) -> Self {
        self.start = Some(start);
        self
    }

    /// The provider-facing rule line, e.g.
    /// `RRULE:FREQ=WEEKLY;INTERVAL=1;COUNT=6;BYDAY=MO,WE`.
    pub fn rrule_line(&self) -> String {
        let mut parts = vec![
            format!("FREQ={}", self.frequency.rule_code()),
            format!("INTERVAL={}", self.interval),
        ];
        match self.bound {
            RuleBound::Count(count) => parts.push(format!("COUNT={count}")),
            RuleBound::Until(until) => {
                parts.push(format!("UNTIL={}", until.format("%Y%m%dT%H%M%SZ")))
            }
        }
        if !self.by_week_day.is_empty() {
            let days: Vec<&str> = self.by_week_day.iter().map(|d| d.token()).collect();
            parts.push(format!("BYDAY={}", days.join(",")));
        }
        if !self.by_month_day.is_empty() {
            let days: Vec<String> = self.by_month_day.iter().map(|d| d.to_string()).collect();
            parts.push(format!("BYMONTHDAY={}", days.join(",")));
        }
        format!("RRULE:{}", parts.join(";"))
    }

    /// The `DTSTART` line for the rule's start, if it has one.
    pub fn dtstart_line(&self) -> Option<String> {
        let start = self.start?;
        Some(if self.timezone == chrono_tz::UTC {
            format!(
                "DTSTART:{}",
                start.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ")
            )
        } else {
            format!(
                "DTSTART;TZID={}:{}",
                self.timezone.name(),
                start.format("%Y%m%dT%H%M%S")
            )
        })
    }
}

/// `until` is a plain date (end of that local day), a local datetime, or an
/// RFC 3339 instant.
fn parse_until(s: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = parse_plain_date(s)
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .or_else(|| parse_local_datetime(s))
        .ok_or_else(|| TemporalError::InvalidDatetime(format!("until '{}'", s)))?;
    Ok(localize(naive, tz)?.with_timezone(&Utc))
}

// ── Built output ────────────────────────────────────────────────────────────

/// Monthly-pattern fields derived from materialized occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPattern {
    /// ISO weekday, Monday = 1 … Sunday = 7.
    pub weekday_of_month: u32,
    pub day_of_month: u32,
    /// 1-based ordinal week, see [`week_of_month`].
    pub week_of_month: u32,
}

/// The distinct values a set of occurrences takes, each in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceProfile {
    pub days_of_month: Vec<u32>,
    pub weekdays: Vec<u32>,
    pub weeks_of_month: Vec<u32>,
}

impl OccurrenceProfile {
    pub fn from_occurrences<T: TimeZone>(occurrences: &[DateTime<T>]) -> Self {
        let mut profile = Self::default();
        for occurrence in occurrences {
            let date = occurrence.date_naive();
            push_distinct(&mut profile.days_of_month, date.day());
            push_distinct(&mut profile.weekdays, iso_weekday(date));
            push_distinct(&mut profile.weeks_of_month, week_of_month(date));
        }
        profile
    }

    /// True when every occurrence agrees on all three values.
    pub fn is_uniform(&self) -> bool {
        self.days_of_month.len() <= 1 && self.weekdays.len() <= 1 && self.weeks_of_month.len() <= 1
    }

    /// The monthly pattern, taking the first occurrence's value for any field
    /// that varies. `None` for an empty occurrence set.
    pub fn pattern(&self) -> Option<MonthlyPattern> {
        Some(MonthlyPattern {
            weekday_of_month: *self.weekdays.first()?,
            day_of_month: *self.days_of_month.first()?,
            week_of_month: *self.weeks_of_month.first()?,
        })
    }
}

fn push_distinct(values: &mut Vec<u32>, value: u32) {
    if !values.contains(&value) {
        values.push(value);
    }
}

/// A recurrence ready to hand to a calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltRecurrence {
    pub rule_strings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_pattern: Option<MonthlyPattern>,
    /// Plain weekday list for providers that take digits, e.g. `"1, 3, "`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday_codes: Option<String>,
}

// ── Public API ──────────────────────────────────────────────────────────────

/// Build a recurrence with default options and the `rrule`-backed materializer.
///
/// Returns `Ok(None)` when the descriptor does not describe a recurrence.
///
/// # Examples
///
/// ```
/// use temporal_engine::{build_recurrence, DayCode, Frequency, RecurrenceDescriptor};
///
/// let descriptor = RecurrenceDescriptor::new(Frequency::Weekly, 1)
///     .with_week_days(&[DayCode::Mo, DayCode::We])
///     .with_count(6);
/// let built = build_recurrence(&descriptor, "UTC").unwrap().unwrap();
/// assert_eq!(built.rule_strings, vec!["RRULE:FREQ=WEEKLY;INTERVAL=1;COUNT=6;BYDAY=MO,WE"]);
/// assert_eq!(built.weekday_codes.as_deref(), Some("1, 3, "));
/// ```
pub fn build_recurrence(
    descriptor: &RecurrenceDescriptor,
    timezone: &str,
) -> Result<Option<BuiltRecurrence>> {
    build_recurrence_with(
        descriptor,
        timezone,
        &RecurrenceOptions::default(),
        &RruleMaterializer,
    )
}

/// Build a recurrence with explicit options and materializer.
///
/// # Errors
///
/// - [`TemporalError::InvalidTimezone`] / [`TemporalError::InvalidDatetime`]
///   for an unusable timezone, `until` or `start`
/// - [`TemporalError::InvalidRule`] for an invalid combination of fields, or
///   when a monthly pattern is needed but `start` is missing
/// - [`TemporalError::MaterializationOverflow`] when the rule produces more
///   than `options.max_occurrences` occurrences
pub fn build_recurrence_with<M: Materializer + ?Sized>(
    descriptor: &RecurrenceDescriptor,
    timezone: &str,
    options: &RecurrenceOptions,
    materializer: &M,
) -> Result<Option<BuiltRecurrence>> {
    let tz = parse_timezone(timezone)?;
    let Some(rule) = RecurrenceRule::from_descriptor(descriptor, tz)? else {
        return Ok(None);
    };

    let mut built = BuiltRecurrence {
        rule_strings: vec![rule.rrule_line()],
        monthly_pattern: None,
        weekday_codes: None,
    };

    if !rule.by_week_day.is_empty() {
        if rule.by_month_day.is_empty() {
            built.weekday_codes = Some(weekday_code_list(&rule.by_week_day));
        } else {
            let occurrences = materialize_capped(&rule, options, materializer)?;
            built.monthly_pattern = OccurrenceProfile::from_occurrences(&occurrences).pattern();
        }
    }

    Ok(Some(built))
}

/// Materialize `rule`, enforcing `options.max_occurrences`.
///
/// A `count` above the cap fails before any enumeration.
pub fn materialize_capped<M: Materializer + ?Sized>(
    rule: &RecurrenceRule,
    options: &RecurrenceOptions,
    materializer: &M,
) -> Result<Vec<DateTime<Tz>>> {
    let cap = options.max_occurrences;
    if cap > MAX_OCCURRENCES_LIMIT {
        return Err(TemporalError::InvalidRule(format!(
            "maxOccurrences must be at most {MAX_OCCURRENCES_LIMIT}"
        )));
    }
    if let RuleBound::Count(count) = rule.bound {
        if count > u32::from(cap) {
            return Err(TemporalError::MaterializationOverflow { cap });
        }
    }
    let occurrences = materializer.materialize(rule, cap)?;
    if occurrences.len() > usize::from(cap) {
        return Err(TemporalError::MaterializationOverflow { cap });
    }
    Ok(occurrences)
}

/// ISO weekday digits, each followed by `", "`: `[MO, WE]` → `"1, 3, "`.
pub fn weekday_code_list(days: &[DayCode]) -> String {
    days.iter()
        .map(|day| format!("{}, ", day.iso_number()))
        .collect()
}
