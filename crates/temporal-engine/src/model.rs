//! Input and output shapes shared by the resolvers.
//!
//! Inputs arrive as JSON produced by an upstream extraction step, so every
//! type here derives `Deserialize` with camelCase field names. Numeric date
//! fields are kept as [`FieldValue`] and parsed only when a resolver needs
//! them: a malformed value is reported at resolution time, naming the field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporalError};

// ── FieldValue ──────────────────────────────────────────────────────────────

/// A numeric field that the extractor may emit either as a JSON number or as
/// a numeric string (`10` or `"10"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(i64),
    Text(String),
}

impl FieldValue {
    /// Parse the value as `T`, reporting `field` on failure.
    pub fn parse<T: FromStr>(&self, field: &'static str) -> Result<T> {
        let text = match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.trim().to_string(),
        };
        text.parse::<T>()
            .map_err(|_| TemporalError::field(field, text.clone()))
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(i64::from(n))
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Number(i64::from(n))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

// ── Relative offsets ────────────────────────────────────────────────────────

/// Direction in which relative offsets are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativeChange {
    #[default]
    Add,
    Subtract,
}

impl RelativeChange {
    pub(crate) fn sign(self) -> i64 {
        match self {
            RelativeChange::Add => 1,
            RelativeChange::Subtract => -1,
        }
    }
}

/// Unit of a single relative offset. Plural spellings are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetUnit {
    #[serde(alias = "minutes")]
    Minute,
    #[serde(alias = "hours")]
    Hour,
    #[serde(alias = "days")]
    Day,
    #[serde(alias = "weeks")]
    Week,
    #[serde(alias = "months")]
    Month,
    #[serde(alias = "years")]
    Year,
}

/// One `{unit, value}` entry of `relativeOffsets`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeOffset {
    pub unit: OffsetUnit,
    pub value: u32,
}

impl RelativeOffset {
    pub fn new(unit: OffsetUnit, value: u32) -> Self {
        Self { unit, value }
    }
}

// ── PartialDateSpec ─────────────────────────────────────────────────────────

/// A possibly-incomplete date/time description.
///
/// The date axis is driven by at most one of `day`, `iso_weekday` and
/// `relative_offsets`, checked in that order. `hour`, `minute` and `time`
/// form an independent time axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialDateSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_weekday: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<FieldValue>,
    /// Clock time, `HH:mm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(
        default,
        alias = "relativeTimeChangeFromNow",
        skip_serializing_if = "Option::is_none"
    )]
    pub relative_change: Option<RelativeChange>,
    #[serde(
        default,
        alias = "relativeTimeFromNow",
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub relative_offsets: Vec<RelativeOffset>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<RelativeOffset>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<RelativeOffset>>::deserialize(deserializer)?.unwrap_or_default())
}

impl PartialDateSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: impl Into<FieldValue>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_month(mut self, month: impl Into<FieldValue>) -> Self {
        self.month = Some(month.into());
        self
    }

    pub fn with_day(mut self, day: impl Into<FieldValue>) -> Self {
        self.day = Some(day.into());
        self
    }

    pub fn with_iso_weekday(mut self, weekday: impl Into<FieldValue>) -> Self {
        self.iso_weekday = Some(weekday.into());
        self
    }

    pub fn with_hour(mut self, hour: impl Into<FieldValue>) -> Self {
        self.hour = Some(hour.into());
        self
    }

    pub fn with_minute(mut self, minute: impl Into<FieldValue>) -> Self {
        self.minute = Some(minute.into());
        self
    }

    pub fn with_time(mut self, time: &str) -> Self {
        self.time = Some(time.to_string());
        self
    }

    pub fn with_change(mut self, change: RelativeChange) -> Self {
        self.relative_change = Some(change);
        self
    }

    pub fn with_offset(mut self, unit: OffsetUnit, value: u32) -> Self {
        self.relative_offsets.push(RelativeOffset::new(unit, value));
        self
    }

    /// Whether any field that drives the date axis is present.
    pub fn has_date_axis(&self) -> bool {
        self.day.is_some() || self.iso_weekday.is_some() || !self.relative_offsets.is_empty()
    }
}

// ── DefaultTimePolicy ───────────────────────────────────────────────────────

/// What time of day to use when the date spec has no explicit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultTimePolicy {
    /// Leave the time produced by the date axis.
    #[default]
    Keep,
    /// 00:00.
    StartOfDay,
    /// 23:59.
    EndOfDay,
}

impl DefaultTimePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            DefaultTimePolicy::Keep => "keep",
            DefaultTimePolicy::StartOfDay => "start-of-day",
            DefaultTimePolicy::EndOfDay => "end-of-day",
        }
    }
}

impl fmt::Display for DefaultTimePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DefaultTimePolicy {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "keep" => Ok(DefaultTimePolicy::Keep),
            "start-of-day" | "start" => Ok(DefaultTimePolicy::StartOfDay),
            "end-of-day" | "end" => Ok(DefaultTimePolicy::EndOfDay),
            _ => Err(TemporalError::field("defaultTimePolicy", s)),
        }
    }
}

// ── Recurrence ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// The RFC 5545 `FREQ` value.
    pub fn rule_code(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

/// Two-letter weekday code as used in `BYDAY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayCode {
    Mo,
    Tu,
    We,
    Th,
    Fr,
    Sa,
    Su,
}

impl DayCode {
    pub fn token(self) -> &'static str {
        match self {
            DayCode::Mo => "MO",
            DayCode::Tu => "TU",
            DayCode::We => "WE",
            DayCode::Th => "TH",
            DayCode::Fr => "FR",
            DayCode::Sa => "SA",
            DayCode::Su => "SU",
        }
    }

    /// ISO 8601 weekday number, Monday = 1 … Sunday = 7.
    pub fn iso_number(self) -> u32 {
        match self {
            DayCode::Mo => 1,
            DayCode::Tu => 2,
            DayCode::We => 3,
            DayCode::Th => 4,
            DayCode::Fr => 5,
            DayCode::Sa => 6,
            DayCode::Su => 7,
        }
    }
}

/// A simple recurrence description as extracted from user input.
///
/// Only descriptors with a frequency, an interval and a bound (`count` or
/// `until`) describe a recurrence; anything less means "does not repeat".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_week_day: Vec<DayCode>,
    #[serde(default, alias = "ByMonthDay", skip_serializing_if = "Vec::is_empty")]
    pub by_month_day: Vec<u8>,
    #[serde(default, alias = "occurrence", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// `YYYY-MM-DD`, a local datetime, or an RFC 3339 instant.
    #[serde(default, alias = "endDate", skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    /// Start of the first occurrence (DTSTART).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
}

impl RecurrenceDescriptor {
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency: Some(frequency),
            interval: Some(interval),
            ..Self::default()
        }
    }

    pub fn with_week_days(mut self, days: &[DayCode]) -> Self {
        self.by_week_day = days.to_vec();
        self
    }

    pub fn with_month_days(mut self, days: &[u8]) -> Self {
        self.by_month_day = days.to_vec();
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_until(mut self, until: &str) -> Self {
        self.until = Some(until.to_string());
        self
    }

    pub fn with_start(mut self, start: &str) -> Self {
        self.start = Some(start.to_string());
        self
    }

    /// A copy without `byWeekDay` / `byMonthDay`.
    pub fn without_filters(&self) -> Self {
        Self {
            by_week_day: Vec::new(),
            by_month_day: Vec::new(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_accepts_number_and_string() {
        let spec: PartialDateSpec =
            serde_json::from_str(r#"{"day": "10", "month": 6, "year": 2024}"#).unwrap();
        assert_eq!(spec.day.unwrap().parse::<u32>("day").unwrap(), 10);
        assert_eq!(spec.month.unwrap().parse::<u32>("month").unwrap(), 6);
        assert_eq!(spec.year.unwrap().parse::<i32>("year").unwrap(), 2024);
    }

    #[test]
    fn test_field_value_parse_failure_names_field() {
        let err = FieldValue::from("ten").parse::<u32>("day").unwrap_err();
        assert_eq!(
            err,
            TemporalError::InvalidField {
                field: "day",
                value: "ten".to_string()
            }
        );
        assert!(err.is_parse_failure());
    }

    #[test]
    fn test_negative_number_fails_unsigned_parse() {
        assert!(FieldValue::from(-3).parse::<u32>("hour").is_err());
    }

    #[test]
    fn test_legacy_relative_field_names() {
        let spec: PartialDateSpec = serde_json::from_str(
            r#"{
                "relativeTimeChangeFromNow": "subtract",
                "relativeTimeFromNow": [{"unit": "days", "value": 2}, {"unit": "hour", "value": 1}]
            }"#,
        )
        .unwrap();
        assert_eq!(spec.relative_change, Some(RelativeChange::Subtract));
        assert_eq!(
            spec.relative_offsets,
            vec![
                RelativeOffset::new(OffsetUnit::Day, 2),
                RelativeOffset::new(OffsetUnit::Hour, 1)
            ]
        );
    }

    #[test]
    fn test_null_relative_fields() {
        let spec: PartialDateSpec =
            serde_json::from_str(r#"{"relativeChange": null, "relativeOffsets": null}"#).unwrap();
        assert!(spec.relative_change.is_none());
        assert!(spec.relative_offsets.is_empty());
        assert!(!spec.has_date_axis());
    }

    #[test]
    fn test_has_date_axis() {
        assert!(!PartialDateSpec::new().has_date_axis());
        assert!(!PartialDateSpec::new().with_year(2024).with_month(3).has_date_axis());
        assert!(PartialDateSpec::new().with_day(3).has_date_axis());
        assert!(PartialDateSpec::new().with_iso_weekday(3).has_date_axis());
        assert!(PartialDateSpec::new()
            .with_offset(OffsetUnit::Week, 1)
            .has_date_axis());
        assert!(!PartialDateSpec::new().with_hour(9).has_date_axis());
    }

    #[test]
    fn test_default_time_policy_round_trips_names() {
        for policy in [
            DefaultTimePolicy::Keep,
            DefaultTimePolicy::StartOfDay,
            DefaultTimePolicy::EndOfDay,
        ] {
            assert_eq!(policy.as_str().parse::<DefaultTimePolicy>().unwrap(), policy);
        }
        assert!("noon".parse::<DefaultTimePolicy>().is_err());
    }

    #[test]
    fn test_descriptor_from_extractor_json() {
        let descriptor: RecurrenceDescriptor = serde_json::from_str(
            r#"{
                "frequency": "weekly",
                "interval": 1,
                "byWeekDay": ["MO", "WE"],
                "occurrence": 6
            }"#,
        )
        .unwrap();
        assert_eq!(descriptor.frequency, Some(Frequency::Weekly));
        assert_eq!(descriptor.by_week_day, vec![DayCode::Mo, DayCode::We]);
        assert_eq!(descriptor.count, Some(6));
        assert!(descriptor.until.is_none());
    }

    #[test]
    fn test_day_code_iso_numbers() {
        assert_eq!(DayCode::Mo.iso_number(), 1);
        assert_eq!(DayCode::Su.iso_number(), 7);
        assert_eq!(DayCode::Th.token(), "TH");
    }
}
