//! Repeat frequencies and the single place repeat termination is decided.
//!
//! A [`RepeatSpecification`] is the raw form a caller builds or deserializes;
//! [`RepeatPolicy`] is its checked form, produced by
//! [`validate_repeat_specification`]. [`advance`] is what every occurrence
//! resolver calls to move a reference date on to the next repetition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::calendar::{CalendarDate, DateParts};
use crate::error::{OccurrenceError, Result};

/// How often an occurrence repeats.
///
/// Unknown names fail to deserialize with
/// [`OccurrenceError::RepeatTypeInvalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepeatFrequency {
    #[default]
    NoRepeat,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RepeatFrequency {
    pub const ALL: [RepeatFrequency; 5] = [
        RepeatFrequency::NoRepeat,
        RepeatFrequency::Daily,
        RepeatFrequency::Weekly,
        RepeatFrequency::Monthly,
        RepeatFrequency::Yearly,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RepeatFrequency::NoRepeat => "NO_REPEAT",
            RepeatFrequency::Daily => "DAILY",
            RepeatFrequency::Weekly => "WEEKLY",
            RepeatFrequency::Monthly => "MONTHLY",
            RepeatFrequency::Yearly => "YEARLY",
        }
    }

    /// Whether the frequency needs a `period`.
    pub fn has_period(&self) -> bool {
        !matches!(self, RepeatFrequency::NoRepeat)
    }

    /// Moves `reference` forward by `period` units of this frequency.
    /// `NoRepeat` never moves.
    pub fn advance(&self, period: u32, reference: CalendarDate) -> CalendarDate {
        let period = i64::from(period);
        match self {
            RepeatFrequency::NoRepeat => reference,
            RepeatFrequency::Daily => reference.add_days(period),
            RepeatFrequency::Weekly => reference.add_days(period * 7),
            RepeatFrequency::Monthly => reference.add_months(period),
            RepeatFrequency::Yearly => reference.add_years(period),
        }
    }
}

impl fmt::Display for RepeatFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RepeatFrequency {
    type Err = OccurrenceError;

    fn from_str(s: &str) -> Result<Self> {
        RepeatFrequency::ALL
            .into_iter()
            .find(|frequency| frequency.name() == s)
            .ok_or_else(|| OccurrenceError::RepeatTypeInvalid(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for RepeatFrequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw repeat settings as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatSpecification {
    pub frequency: RepeatFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<i32>,
    /// No repetition may land after this date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_date: Option<DateParts>,
    /// No more than this many repetitions. `0` means the occurrence happens
    /// once and is never repeated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_repeats: Option<i32>,
}

impl RepeatSpecification {
    pub fn new(frequency: RepeatFrequency, period: i32) -> Self {
        Self {
            frequency,
            period: Some(period),
            ..Self::default()
        }
    }

    pub fn no_repeat() -> Self {
        Self::default()
    }

    pub fn with_final_date(mut self, final_date: impl Into<DateParts>) -> Self {
        self.final_date = Some(final_date.into());
        self
    }

    pub fn with_max_repeats(mut self, max_repeats: i32) -> Self {
        self.max_repeats = Some(max_repeats);
        self
    }
}

/// Checked repeat settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatPolicy {
    pub frequency: RepeatFrequency,
    pub period: u32,
    pub final_date: Option<CalendarDate>,
    pub max_repeats: Option<u32>,
}

impl RepeatPolicy {
    /// `true` for every frequency but `NoRepeat`.
    pub fn is_repeating(&self) -> bool {
        self.frequency != RepeatFrequency::NoRepeat
    }
}

/// Validates a repeat specification on its own, independent of the
/// occurrence type it is attached to.
///
/// `NoRepeat` is always valid; its other fields are ignored.
///
/// # Errors
/// - `PeriodRequired` if the frequency repeats and `period` is missing or negative.
/// - `FinalDateInvalid` if `final_date` is not a real date.
/// - `MaxRepeatsInvalid` if `max_repeats` is negative.
pub fn validate_repeat_specification(spec: &RepeatSpecification) -> Result<RepeatPolicy> {
    if !spec.frequency.has_period() {
        return Ok(RepeatPolicy {
            frequency: RepeatFrequency::NoRepeat,
            period: 0,
            final_date: None,
            max_repeats: None,
        });
    }

    let period = spec
        .period
        .and_then(|p| u32::try_from(p).ok())
        .ok_or(OccurrenceError::PeriodRequired)?;

    let final_date = match spec.final_date {
        Some(parts) if parts.is_valid() => Some(CalendarDate::normalize(parts).date),
        Some(_) => return Err(OccurrenceError::FinalDateInvalid),
        None => None,
    };

    let max_repeats = spec
        .max_repeats
        .map(|m| u32::try_from(m).map_err(|_| OccurrenceError::MaxRepeatsInvalid))
        .transpose()?;

    Ok(RepeatPolicy {
        frequency: spec.frequency,
        period,
        final_date,
        max_repeats,
    })
}

/// Computes the reference date for the next repetition.
///
/// Returns `None` when the repeat is exhausted. With `occurrence_count == 0`
/// nothing has happened yet, so `reference` comes back unchanged. The final
/// date bound is inclusive.
pub fn advance(
    policy: Option<&RepeatPolicy>,
    reference: CalendarDate,
    occurrence_count: u32,
) -> Option<CalendarDate> {
    if occurrence_count == 0 {
        return Some(reference);
    }

    let policy = match policy {
        Some(policy) if policy.is_repeating() => policy,
        _ => {
            debug!(%reference, occurrence_count, "no repeat, occurrence exhausted");
            return None;
        }
    };

    if let Some(max_repeats) = policy.max_repeats {
        if occurrence_count >= max_repeats {
            debug!(occurrence_count, max_repeats, "max repeats reached");
            return None;
        }
    }

    let candidate = policy.frequency.advance(policy.period, reference);
    if let Some(final_date) = policy.final_date {
        if candidate > final_date {
            debug!(%candidate, %final_date, "repeat passes final date");
            return None;
        }
    }

    Some(candidate)
}
