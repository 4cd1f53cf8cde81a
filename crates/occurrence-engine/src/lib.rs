//! # occurrence-engine
//!
//! Computes when a recurring date-based event next occurs.
//!
//! A rule such as "the second Wednesday of every other month, at most three
//! times" is described by an [`OccurrenceDefinition`], validated into an
//! [`OccurrenceRule`], and stepped one occurrence at a time with
//! [`next_occurrence_state`]. The caller keeps the small
//! [`OccurrenceState`] between steps; nothing is stored here.
//!
//! ```rust
//! use occurrence_engine::{
//!     next_occurrence_state, FixedClock, OccurrenceDefinition, OccurrenceRule,
//!     OccurrenceType, RepeatFrequency, RepeatSpecification,
//! };
//!
//! let definition = OccurrenceDefinition::new(OccurrenceType::DowOfMonth)
//!     .with_offset(2)
//!     .with_day_of_week(3)
//!     .with_repeat(RepeatSpecification::new(RepeatFrequency::Monthly, 2).with_max_repeats(3));
//! let rule = OccurrenceRule::try_from(&definition).unwrap();
//!
//! let clock = FixedClock("2020-10-07".parse().unwrap());
//! let first = next_occurrence_state(&rule, None, &clock);
//! assert_eq!(first.last_occurrence_date.unwrap().to_string(), "2020-10-14");
//!
//! let second = next_occurrence_state(&rule, Some(&first), &clock);
//! assert_eq!(second.last_occurrence_date.unwrap().to_string(), "2020-12-09");
//! ```
//!
//! ## Modules
//!
//! - [`calendar`] — `CalendarDate` normalization and day/month/year arithmetic
//! - [`repeat`] — repeat frequencies and termination (`advance`)
//! - [`occurrence`] — occurrence types, definitions and validation
//! - [`resolver`] — next-date placement per occurrence type
//! - [`state`] — occurrence state transitions and the lazy iterator
//! - [`clock`] — injectable source of "today"
//! - [`error`] — Error types

pub mod calendar;
pub mod clock;
pub mod error;
pub mod occurrence;
pub mod repeat;
pub mod resolver;
pub mod state;

pub use calendar::{CalendarDate, DateParts, Normalized};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DefinitionField, OccurrenceError};
pub use occurrence::{
    validate_occurrence_definition, OccurrenceDefinition, OccurrenceRule, OccurrenceType, Placement,
};
pub use repeat::{
    validate_repeat_specification, RepeatFrequency, RepeatPolicy, RepeatSpecification,
};
pub use state::{next_occurrence_state, OccurrenceState, Occurrences};
