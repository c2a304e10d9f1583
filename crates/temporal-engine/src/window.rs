//! Search windows built from a pair of partial date specs.
//!
//! An "old" reference spec and a "target" spec are each reduced to a plain
//! date through the date-axis rules of [`crate::instant`]; the time axis is
//! ignored. The resulting window is padded by one day on each side so that
//! an inclusive date-only range query still matches timestamps near a
//! timezone boundary.

use chrono::{DateTime, Days, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::calendar::{format_date, parse_instant, parse_timezone};
use crate::error::{Result, TemporalError};
use crate::instant::resolve_date_axis;
use crate::model::PartialDateSpec;

/// Days added before the earliest and after the latest resolved date.
pub const PADDING_DAYS: u64 = 1;

/// Forward search horizon when only one date resolves.
pub const FORWARD_HORIZON_WEEKS: u64 = 4;

/// An inclusive `YYYY-MM-DD` range. Both bounds are `None` when neither spec
/// carried a date-axis field; the caller chooses the fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchWindow {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl SearchWindow {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }
}

/// Resolve a search window from an optional reference spec and an optional
/// target spec.
///
/// # Errors
///
/// Returns the same parse errors as [`crate::resolve_instant`] for the
/// timezone, the current time, or any date-axis field of either spec.
///
/// # Examples
///
/// ```
/// use temporal_engine::{resolve_search_window, PartialDateSpec};
///
/// let old = PartialDateSpec::new().with_day("10");
/// let window =
///     resolve_search_window(Some(&old), Some(&PartialDateSpec::new()), "2024-06-01T09:00", "UTC")
///         .unwrap();
/// assert_eq!(window.start_date.as_deref(), Some("2024-06-09"));
/// assert_eq!(window.end_date.as_deref(), Some("2024-07-07"));
/// ```
pub fn resolve_search_window(
    old_spec: Option<&PartialDateSpec>,
    target_spec: Option<&PartialDateSpec>,
    current_time: &str,
    timezone: &str,
) -> Result<SearchWindow> {
    let tz = parse_timezone(timezone)?;
    let now = parse_instant(current_time, &tz)?;

    Ok(match resolve_search_dates(old_spec, target_spec, &now)? {
        Some((start, end)) => SearchWindow {
            start_date: Some(format_date(start)),
            end_date: Some(format_date(end)),
        },
        None => SearchWindow::default(),
    })
}

/// Typed form of [`resolve_search_window`]: the padded `(start, end)` dates,
/// or `None` when neither spec resolves.
pub fn resolve_search_dates(
    old_spec: Option<&PartialDateSpec>,
    target_spec: Option<&PartialDateSpec>,
    now: &DateTime<Tz>,
) -> Result<Option<(NaiveDate, NaiveDate)>> {
    let date_a = resolve_spec_date(old_spec, now)?;
    let date_b = resolve_spec_date(target_spec, now)?;

    let bounds = match (date_a, date_b) {
        (Some(a), Some(b)) => {
            let (earlier, later) = if a <= b { (a, b) } else { (b, a) };
            Some((pad_back(earlier)?, pad_forward(later, Days::new(PADDING_DAYS))?))
        }
        (Some(anchor), None) | (None, Some(anchor)) => {
            let start = pad_back(anchor)?;
            let end = pad_forward(start, Days::new(FORWARD_HORIZON_WEEKS * 7))?;
            Some((start, end))
        }
        (None, None) => None,
    };
    Ok(bounds)
}

/// The date a spec resolves to on the date axis alone, if it has one.
fn resolve_spec_date(
    spec: Option<&PartialDateSpec>,
    now: &DateTime<Tz>,
) -> Result<Option<NaiveDate>> {
    let Some(spec) = spec.filter(|spec| spec.has_date_axis()) else {
        return Ok(None);
    };
    Ok(Some(resolve_date_axis(spec, now)?.local.date()))
}

fn pad_back(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_sub_days(Days::new(PADDING_DAYS))
        .ok_or_else(|| TemporalError::InvalidDatetime(format!("window start out of range: {date}")))
}

fn pad_forward(date: NaiveDate, days: Days) -> Result<NaiveDate> {
    date.checked_add_days(days)
        .ok_or_else(|| TemporalError::InvalidDatetime(format!("window end out of range: {date}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OffsetUnit, RelativeChange};

    const NOW: &str = "2024-06-01T09:00";

    fn window(old: Option<&PartialDateSpec>, target: Option<&PartialDateSpec>) -> SearchWindow {
        resolve_search_window(old, target, NOW, "UTC").unwrap()
    }

    #[test]
    fn test_single_old_date_uses_forward_horizon() {
        let old = PartialDateSpec::new().with_day("10");
        let result = window(Some(&old), Some(&PartialDateSpec::new()));
        assert_eq!(result.start_date.as_deref(), Some("2024-06-09"));
        assert_eq!(result.end_date.as_deref(), Some("2024-07-07"));
    }

    #[test]
    fn test_single_target_date_uses_forward_horizon() {
        let target = PartialDateSpec::new().with_year(2024).with_month(12).with_day(30);
        let result = window(None, Some(&target));
        assert_eq!(result.start_date.as_deref(), Some("2024-12-29"));
        assert_eq!(result.end_date.as_deref(), Some("2025-01-26"));
    }

    #[test]
    fn test_both_dates_are_ordered_and_padded() {
        let old = PartialDateSpec::new().with_day(20);
        let target = PartialDateSpec::new().with_day(5);
        let result = window(Some(&old), Some(&target));
        assert_eq!(result.start_date.as_deref(), Some("2024-06-04"));
        assert_eq!(result.end_date.as_deref(), Some("2024-06-21"));
    }

    #[test]
    fn test_same_date_twice_pads_one_day_each_side() {
        let spec = PartialDateSpec::new().with_day(15);
        let result = window(Some(&spec), Some(&spec));
        assert_eq!(result.start_date.as_deref(), Some("2024-06-14"));
        assert_eq!(result.end_date.as_deref(), Some("2024-06-16"));
    }

    #[test]
    fn test_mixed_rules() {
        // Saturday 2024-06-01: weekday 1 → Monday 2024-06-03; 2 weeks back → 2024-05-18
        let old = PartialDateSpec::new()
            .with_offset(OffsetUnit::Week, 2)
            .with_change(RelativeChange::Subtract);
        let target = PartialDateSpec::new().with_iso_weekday(1);
        let result = window(Some(&old), Some(&target));
        assert_eq!(result.start_date.as_deref(), Some("2024-05-17"));
        assert_eq!(result.end_date.as_deref(), Some("2024-06-04"));
    }

    #[test]
    fn test_time_axis_is_ignored() {
        let old = PartialDateSpec::new().with_day(10).with_hour(23).with_minute(59);
        let result = window(Some(&old), None);
        assert_eq!(result.start_date.as_deref(), Some("2024-06-09"));
    }

    #[test]
    fn test_neither_resolves_gives_empty_window() {
        let time_only = PartialDateSpec::new().with_time("10:00");
        let result = window(Some(&time_only), None);
        assert!(result.is_empty());
        assert!(window(None, None).is_empty());
    }

    #[test]
    fn test_year_and_month_alone_do_not_anchor_a_window() {
        let month_only = PartialDateSpec::new().with_year(2024).with_month(9);
        let target = PartialDateSpec::new().with_day(12);
        let result = window(Some(&month_only), Some(&target));
        assert_eq!(result.start_date.as_deref(), Some("2024-06-11"));
        assert_eq!(result.end_date.as_deref(), Some("2024-07-09"));
    }

    #[test]
    fn test_malformed_field_bubbles() {
        let bad = PartialDateSpec::new().with_day("x");
        assert!(resolve_search_window(Some(&bad), None, NOW, "UTC").is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let old = PartialDateSpec::new().with_day(10);
        let json = serde_json::to_value(window(Some(&old), None)).unwrap();
        assert_eq!(json["startDate"], "2024-06-09");
        assert_eq!(json["endDate"], "2024-07-07");
    }
}
