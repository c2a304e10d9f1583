//! Expansion of a single event window into one window per occurrence.

use serde::Serialize;

use crate::calendar::{format_instant, parse_instant, parse_timezone};
use crate::error::{Result, TemporalError};
use crate::materialize::{Materializer, RruleMaterializer};
use crate::model::RecurrenceDescriptor;
use crate::recurrence::{materialize_capped, RecurrenceOptions, RecurrenceRule};

/// One occurrence of a recurring event window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringWindow {
    pub window_start_date: String,
    pub window_end_date: String,
}

/// Repeat `[window_start, window_end]` along the descriptor's frequency,
/// interval and bound.
///
/// Start and end are materialized as two sequences and zipped pairwise; the
/// shorter sequence decides the length. `byWeekDay` / `byMonthDay` are not
/// applied. An incomplete descriptor yields an empty list.
///
/// # Errors
///
/// - parse errors for the timezone or either bound
/// - [`TemporalError::InvalidDatetime`] when `window_end` precedes `window_start`
/// - [`TemporalError::InvalidRule`] / [`TemporalError::MaterializationOverflow`]
///   from the recurrence itself
///
/// # Examples
///
/// ```
/// use temporal_engine::{
///     expand_recurring_windows, Frequency, RecurrenceDescriptor, RecurrenceOptions,
/// };
///
/// let descriptor = RecurrenceDescriptor::new(Frequency::Weekly, 1).with_count(2);
/// let windows = expand_recurring_windows(
///     "2024-06-03T10:00",
///     "2024-06-03T11:00",
///     &descriptor,
///     "UTC",
///     &RecurrenceOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(windows.len(), 2);
/// assert_eq!(windows[1].window_start_date, "2024-06-10T10:00:00+00:00");
/// ```
pub fn expand_recurring_windows(
    window_start: &str,
    window_end: &str,
    descriptor: &RecurrenceDescriptor,
    timezone: &str,
    options: &RecurrenceOptions,
) -> Result<Vec<RecurringWindow>> {
    expand_recurring_windows_with(
        window_start,
        window_end,
        descriptor,
        timezone,
        options,
        &RruleMaterializer,
    )
}

/// [`expand_recurring_windows`] with an explicit materializer.
pub fn expand_recurring_windows_with<M: Materializer + ?Sized>(
    window_start: &str,
    window_end: &str,
    descriptor: &RecurrenceDescriptor,
    timezone: &str,
    options: &RecurrenceOptions,
    materializer: &M,
) -> Result<Vec<RecurringWindow>> {
    let tz = parse_timezone(timezone)?;
    let start = parse_instant(window_start, &tz)?;
    let end = parse_instant(window_end, &tz)?;
    if end < start {
        return Err(TemporalError::InvalidDatetime(format!(
            "window end {} precedes window start {}",
            format_instant(&end),
            format_instant(&start)
        )));
    }

    // Windows repeat on the base cadence only.
    let Some(rule) = RecurrenceRule::from_descriptor(&descriptor.without_filters(), tz)? else {
        return Ok(Vec::new());
    };

    let starts = materialize_capped(&rule.clone().with_start(start), options, materializer)?;
    let ends = materialize_capped(&rule.with_start(end), options, materializer)?;

    Ok(starts
        .iter()
        .zip(ends.iter())
        .map(|(s, e)| RecurringWindow {
            window_start_date: format_instant(s),
            window_end_date: format_instant(e),
        })
        .collect())
}
