//! # temporal-engine
//!
//! Deterministic date resolution and recurrence derivation for calendar
//! assistants.
//!
//! Natural-language extraction produces loose, partial date descriptions
//! ("the 10th", "next Wednesday", "in 2 weeks at 14:30"). This crate turns
//! them into absolute instants and search ranges relative to an explicit
//! current time and IANA timezone, and turns simple recurrence descriptors
//! into RFC 5545 rule strings plus the monthly-pattern fields some providers
//! need. Every operation is a pure function of its arguments; nothing here
//! reads the system clock.
//!
//! ## Modules
//!
//! - [`instant`]: partial date spec + now → one absolute instant
//! - [`window`]: two partial date specs → padded `YYYY-MM-DD` search range
//! - [`recurrence`]: descriptor → `RRULE:` strings, weekday codes, monthly pattern
//! - [`materialize`]: the [`Materializer`] seam and its `rrule`-backed implementation
//! - [`recurring`]: one event window → one window per occurrence
//! - [`duration`]: explicit or start/end-derived event length
//! - [`calendar`]: ISO-calendar primitives and the DST policy
//! - [`model`]: input types shared by the resolvers
//! - [`error`]: error types

pub mod calendar;
pub mod duration;
pub mod error;
pub mod instant;
pub mod materialize;
pub mod model;
pub mod recurrence;
pub mod recurring;
pub mod window;

pub use calendar::{
    align_to_iso_weekday, format_date, format_instant, iso_weekday, localize, parse_clock_time,
    parse_instant, parse_timezone, week_of_month,
};
pub use duration::{resolve_duration, DurationHint, DEFAULT_DURATION_MINUTES};
pub use error::{Result, TemporalError};
pub use instant::{
    apply_time_axis, resolve_date_axis, resolve_datetime, resolve_instant, DateAxis, DateRule,
    ResolvedInstant,
};
pub use materialize::{Materializer, RruleMaterializer};
pub use model::{
    DayCode, DefaultTimePolicy, FieldValue, Frequency, OffsetUnit, PartialDateSpec,
    RecurrenceDescriptor, RelativeChange, RelativeOffset,
};
pub use recurrence::{
    build_recurrence, build_recurrence_with, materialize_capped, weekday_code_list,
    BuiltRecurrence, MonthlyPattern, OccurrenceProfile, RecurrenceOptions, RecurrenceRule,
    RuleBound, DEFAULT_MAX_OCCURRENCES, MAX_OCCURRENCES_LIMIT,
};
pub use recurring::{expand_recurring_windows, expand_recurring_windows_with, RecurringWindow};
pub use window::{
    resolve_search_dates, resolve_search_window, SearchWindow, FORWARD_HORIZON_WEEKS, PADDING_DAYS,
};
