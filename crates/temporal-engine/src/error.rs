//! Error types for temporal-engine operations.
//!
//! "Nothing to resolve" outcomes are not errors: a spec with no date-axis
//! field resolves to the current time, and an incomplete recurrence
//! descriptor yields `Ok(None)`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid field '{field}': '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("Invalid recurrence: {0}")]
    InvalidRule(String),

    #[error("Materialization overflow: recurrence produces more than {cap} occurrences")]
    MaterializationOverflow { cap: u16 },
}

impl TemporalError {
    pub(crate) fn field(field: &'static str, value: impl Into<String>) -> Self {
        TemporalError::InvalidField {
            field,
            value: value.into(),
        }
    }

    /// True for the errors caused by a value that failed to parse.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            TemporalError::InvalidTimezone(_)
                | TemporalError::InvalidDatetime(_)
                | TemporalError::InvalidField { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TemporalError>;
