//! Concrete occurrence generation for recurrence rules.
//!
//! The builder only needs "the first N occurrences of this rule", so the
//! seam is a one-method trait. [`RruleMaterializer`] answers it with the
//! `rrule` crate; tests substitute fixed occurrence lists.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::error::{Result, TemporalError};
use crate::recurrence::RecurrenceRule;

/// Produces the occurrences of a rule in the rule's timezone.
pub trait Materializer {
    /// Return at most `capacity + 1` occurrences in ascending order.
    ///
    /// Returning more than `capacity` tells the caller the rule overflows;
    /// an implementation may also fail with
    /// [`TemporalError::MaterializationOverflow`] itself.
    fn materialize(&self, rule: &RecurrenceRule, capacity: u16) -> Result<Vec<DateTime<Tz>>>;
}

/// [`Materializer`] backed by the `rrule` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RruleMaterializer;

impl Materializer for RruleMaterializer {
    fn materialize(&self, rule: &RecurrenceRule, capacity: u16) -> Result<Vec<DateTime<Tz>>> {
        let dtstart = rule.dtstart_line().ok_or_else(|| {
            TemporalError::InvalidRule("a start is required to materialize occurrences".to_string())
        })?;
        let text = format!("{}\n{}", dtstart, rule.rrule_line());

        let set = text
            .parse::<rrule::RRuleSet>()
            .map_err(|e| TemporalError::InvalidRule(e.to_string()))?;

        let limit = capacity.checked_add(1).ok_or_else(|| {
            TemporalError::InvalidRule(format!("capacity must be below {}", u16::MAX))
        })?;
        let result = set.all(limit);
        // `limited` is also set when exactly `limit` dates were collected.
        if result.limited && result.dates.len() < usize::from(limit) {
            return Err(TemporalError::InvalidRule(
                "occurrence search stopped before the rule ended".to_string(),
            ));
        }

        Ok(result
            .dates
            .into_iter()
            .map(|dt| dt.with_timezone(&rule.timezone))
            .collect())
    }
}
