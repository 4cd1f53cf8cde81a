//! Occurrence types, raw occurrence definitions and their validation.
//!
//! An [`OccurrenceDefinition`] is what a caller builds (or deserializes):
//! an [`OccurrenceType`] tag plus whichever optional fields that type uses.
//! Validation turns it into an [`OccurrenceRule`], whose [`Placement`]
//! carries exactly the checked fields its variant needs, so the resolver
//! never has to deal with a missing or out-of-range field.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::calendar::weekday_from_sunday;
use crate::error::{DefinitionField, OccurrenceError, Result};
use crate::repeat::{validate_repeat_specification, RepeatFrequency, RepeatPolicy, RepeatSpecification};

/// The natural period an occurrence type places its date within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Week,
    Month,
    Year,
}

/// How the occurrence date is specified.
///
/// Unknown names fail to deserialize with
/// [`OccurrenceError::OccurrenceTypeInvalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccurrenceType {
    /// A day of the week (`dayOfWeek`).
    DayOfWeek,
    /// `offset` days after the first of the month, pinned to the last day.
    DayOfMonth,
    /// `offset` days before the last of the month, pinned to the first day.
    DayEndOfMonth,
    /// The `offset`-th `dayOfWeek` of the month.
    DowOfMonth,
    /// The `offset`-th `dayOfWeek` counting back from the end of the month.
    DowEndOfMonth,
    /// `offset` days after the first of `month`.
    DayOfSpecificMonth,
    /// `offset` days before the last of `month`.
    DayEndOfSpecificMonth,
    /// The `offset`-th `dayOfWeek` of `month`.
    DowOfSpecificMonth,
    /// The `offset`-th `dayOfWeek` counting back from the end of `month`.
    DowEndOfSpecificMonth,
    /// `offset` days after January 1.
    DayOfYear,
    /// `offset` days before December 31.
    DayEndOfYear,
    /// The `offset`-th `dayOfWeek` of the year; January 1 is the first
    /// occurrence of whatever day of the week it falls on.
    DowOfYear,
    /// The `offset`-th `dayOfWeek` counting back from December 31.
    DowEndOfYear,
}

const WEEK_FREQUENCIES: &[RepeatFrequency] = &[RepeatFrequency::NoRepeat, RepeatFrequency::Weekly];
const MONTH_FREQUENCIES: &[RepeatFrequency] = &[
    RepeatFrequency::NoRepeat,
    RepeatFrequency::Monthly,
    RepeatFrequency::Yearly,
];
const YEAR_FREQUENCIES: &[RepeatFrequency] = &[RepeatFrequency::NoRepeat, RepeatFrequency::Yearly];

impl OccurrenceType {
    pub const ALL: [OccurrenceType; 13] = [
        OccurrenceType::DayOfWeek,
        OccurrenceType::DayOfMonth,
        OccurrenceType::DayEndOfMonth,
        OccurrenceType::DowOfMonth,
        OccurrenceType::DowEndOfMonth,
        OccurrenceType::DayOfSpecificMonth,
        OccurrenceType::DayEndOfSpecificMonth,
        OccurrenceType::DowOfSpecificMonth,
        OccurrenceType::DowEndOfSpecificMonth,
        OccurrenceType::DayOfYear,
        OccurrenceType::DayEndOfYear,
        OccurrenceType::DowOfYear,
        OccurrenceType::DowEndOfYear,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OccurrenceType::DayOfWeek => "DAY_OF_WEEK",
            OccurrenceType::DayOfMonth => "DAY_OF_MONTH",
            OccurrenceType::DayEndOfMonth => "DAY_END_OF_MONTH",
            OccurrenceType::DowOfMonth => "DOW_OF_MONTH",
            OccurrenceType::DowEndOfMonth => "DOW_END_OF_MONTH",
            OccurrenceType::DayOfSpecificMonth => "DAY_OF_SPECIFIC_MONTH",
            OccurrenceType::DayEndOfSpecificMonth => "DAY_END_OF_SPECIFIC_MONTH",
            OccurrenceType::DowOfSpecificMonth => "DOW_OF_SPECIFIC_MONTH",
            OccurrenceType::DowEndOfSpecificMonth => "DOW_END_OF_SPECIFIC_MONTH",
            OccurrenceType::DayOfYear => "DAY_OF_YEAR",
            OccurrenceType::DayEndOfYear => "DAY_END_OF_YEAR",
            OccurrenceType::DowOfYear => "DOW_OF_YEAR",
            OccurrenceType::DowEndOfYear => "DOW_END_OF_YEAR",
        }
    }

    pub fn has_offset(&self) -> bool {
        !matches!(self, OccurrenceType::DayOfWeek)
    }

    /// Smallest legal `offset`: 1 for the n-th weekday types, 0 otherwise.
    pub fn offset_min(&self) -> i32 {
        match self {
            OccurrenceType::DowOfMonth
            | OccurrenceType::DowEndOfMonth
            | OccurrenceType::DowOfSpecificMonth
            | OccurrenceType::DowEndOfSpecificMonth
            | OccurrenceType::DowOfYear
            | OccurrenceType::DowEndOfYear => 1,
            _ => 0,
        }
    }

    pub fn has_day_of_week(&self) -> bool {
        matches!(
            self,
            OccurrenceType::DayOfWeek
                | OccurrenceType::DowOfMonth
                | OccurrenceType::DowEndOfMonth
                | OccurrenceType::DowOfSpecificMonth
                | OccurrenceType::DowEndOfSpecificMonth
                | OccurrenceType::DowOfYear
                | OccurrenceType::DowEndOfYear
        )
    }

    pub fn has_specific_month(&self) -> bool {
        matches!(
            self,
            OccurrenceType::DayOfSpecificMonth
                | OccurrenceType::DayEndOfSpecificMonth
                | OccurrenceType::DowOfSpecificMonth
                | OccurrenceType::DowEndOfSpecificMonth
        )
    }

    /// Whether `offset` counts back from the end of the month or year.
    pub fn is_from_end(&self) -> bool {
        matches!(
            self,
            OccurrenceType::DayEndOfMonth
                | OccurrenceType::DowEndOfMonth
                | OccurrenceType::DayEndOfSpecificMonth
                | OccurrenceType::DowEndOfSpecificMonth
                | OccurrenceType::DayEndOfYear
                | OccurrenceType::DowEndOfYear
        )
    }

    pub fn cycle(&self) -> Cycle {
        match self {
            OccurrenceType::DayOfWeek => Cycle::Week,
            OccurrenceType::DayOfMonth
            | OccurrenceType::DayEndOfMonth
            | OccurrenceType::DowOfMonth
            | OccurrenceType::DowEndOfMonth => Cycle::Month,
            _ => Cycle::Year,
        }
    }

    pub fn allowed_frequencies(&self) -> &'static [RepeatFrequency] {
        match self.cycle() {
            Cycle::Week => WEEK_FREQUENCIES,
            Cycle::Month => MONTH_FREQUENCIES,
            Cycle::Year => YEAR_FREQUENCIES,
        }
    }

    pub fn allows_frequency(&self, frequency: RepeatFrequency) -> bool {
        self.allowed_frequencies().contains(&frequency)
    }
}

impl fmt::Display for OccurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OccurrenceType {
    type Err = OccurrenceError;

    fn from_str(s: &str) -> Result<Self> {
        OccurrenceType::ALL
            .into_iter()
            .find(|occurrence_type| occurrence_type.name() == s)
            .ok_or_else(|| OccurrenceError::OccurrenceTypeInvalid(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for OccurrenceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// A raw occurrence definition as a caller builds it.
///
/// Which optional fields matter depends on `occurrence_type`; the others are
/// ignored. Use [`OccurrenceRule::try_from`] to check it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceDefinition {
    pub occurrence_type: OccurrenceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i32>,
    /// 0 = Sunday ... 6 = Saturday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<i32>,
    /// 0 = January ... 11 = December.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatSpecification>,
}

impl OccurrenceDefinition {
    pub fn new(occurrence_type: OccurrenceType) -> Self {
        Self {
            occurrence_type,
            offset: None,
            day_of_week: None,
            month: None,
            repeat: None,
        }
    }

    pub fn with_offset(mut self, offset: i32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_day_of_week(mut self, day_of_week: i32) -> Self {
        self.day_of_week = Some(day_of_week);
        self
    }

    pub fn with_month(mut self, month: i32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_repeat(mut self, repeat: RepeatSpecification) -> Self {
        self.repeat = Some(repeat);
        self
    }

    fn checked_offset(&self) -> Result<u32> {
        let min = self.occurrence_type.offset_min();
        self.offset
            .filter(|offset| *offset >= min)
            .and_then(|offset| u32::try_from(offset).ok())
            .ok_or(OccurrenceError::FieldInvalid(DefinitionField::Offset { min }))
    }

    fn checked_day_of_week(&self) -> Result<Weekday> {
        self.day_of_week
            .and_then(weekday_from_sunday)
            .ok_or(OccurrenceError::FieldInvalid(DefinitionField::DayOfWeek))
    }

    fn checked_month(&self) -> Result<u32> {
        self.month
            .filter(|month| (0..12).contains(month))
            .map(|month| month as u32)
            .ok_or(OccurrenceError::FieldInvalid(DefinitionField::Month))
    }
}

/// Where within its cycle an occurrence lands, with checked fields.
///
/// `nth` values are always at least 1 and `month` is zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    DayOfWeek { weekday: Weekday },
    DayOfMonth { offset: u32 },
    DayEndOfMonth { offset: u32 },
    DowOfMonth { nth: u32, weekday: Weekday },
    DowEndOfMonth { nth: u32, weekday: Weekday },
    DayOfSpecificMonth { offset: u32, month: u32 },
    DayEndOfSpecificMonth { offset: u32, month: u32 },
    DowOfSpecificMonth { nth: u32, weekday: Weekday, month: u32 },
    DowEndOfSpecificMonth { nth: u32, weekday: Weekday, month: u32 },
    DayOfYear { offset: u32 },
    DayEndOfYear { offset: u32 },
    DowOfYear { nth: u32, weekday: Weekday },
    DowEndOfYear { nth: u32, weekday: Weekday },
}

impl Placement {
    pub fn occurrence_type(&self) -> OccurrenceType {
        match self {
            Placement::DayOfWeek { .. } => OccurrenceType::DayOfWeek,
            Placement::DayOfMonth { .. } => OccurrenceType::DayOfMonth,
            Placement::DayEndOfMonth { .. } => OccurrenceType::DayEndOfMonth,
            Placement::DowOfMonth { .. } => OccurrenceType::DowOfMonth,
            Placement::DowEndOfMonth { .. } => OccurrenceType::DowEndOfMonth,
            Placement::DayOfSpecificMonth { .. } => OccurrenceType::DayOfSpecificMonth,
            Placement::DayEndOfSpecificMonth { .. } => OccurrenceType::DayEndOfSpecificMonth,
            Placement::DowOfSpecificMonth { .. } => OccurrenceType::DowOfSpecificMonth,
            Placement::DowEndOfSpecificMonth { .. } => OccurrenceType::DowEndOfSpecificMonth,
            Placement::DayOfYear { .. } => OccurrenceType::DayOfYear,
            Placement::DayEndOfYear { .. } => OccurrenceType::DayEndOfYear,
            Placement::DowOfYear { .. } => OccurrenceType::DowOfYear,
            Placement::DowEndOfYear { .. } => OccurrenceType::DowEndOfYear,
        }
    }

    fn from_definition(definition: &OccurrenceDefinition) -> Result<Self> {
        let d = definition;
        Ok(match d.occurrence_type {
            OccurrenceType::DayOfWeek => Placement::DayOfWeek {
                weekday: d.checked_day_of_week()?,
            },
            OccurrenceType::DayOfMonth => Placement::DayOfMonth {
                offset: d.checked_offset()?,
            },
            OccurrenceType::DayEndOfMonth => Placement::DayEndOfMonth {
                offset: d.checked_offset()?,
            },
            OccurrenceType::DowOfMonth => Placement::DowOfMonth {
                nth: d.checked_offset()?,
                weekday: d.checked_day_of_week()?,
            },
            OccurrenceType::DowEndOfMonth => Placement::DowEndOfMonth {
                nth: d.checked_offset()?,
                weekday: d.checked_day_of_week()?,
            },
            OccurrenceType::DayOfSpecificMonth => Placement::DayOfSpecificMonth {
                offset: d.checked_offset()?,
                month: d.checked_month()?,
            },
            OccurrenceType::DayEndOfSpecificMonth => Placement::DayEndOfSpecificMonth {
                offset: d.checked_offset()?,
                month: d.checked_month()?,
            },
            OccurrenceType::DowOfSpecificMonth => Placement::DowOfSpecificMonth {
                nth: d.checked_offset()?,
                weekday: d.checked_day_of_week()?,
                month: d.checked_month()?,
            },
            OccurrenceType::DowEndOfSpecificMonth => Placement::DowEndOfSpecificMonth {
                nth: d.checked_offset()?,
                weekday: d.checked_day_of_week()?,
                month: d.checked_month()?,
            },
            OccurrenceType::DayOfYear => Placement::DayOfYear {
                offset: d.checked_offset()?,
            },
            OccurrenceType::DayEndOfYear => Placement::DayEndOfYear {
                offset: d.checked_offset()?,
            },
            OccurrenceType::DowOfYear => Placement::DowOfYear {
                nth: d.checked_offset()?,
                weekday: d.checked_day_of_week()?,
            },
            OccurrenceType::DowEndOfYear => Placement::DowEndOfYear {
                nth: d.checked_offset()?,
                weekday: d.checked_day_of_week()?,
            },
        })
    }
}

/// A validated occurrence definition, ready to be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceRule {
    pub placement: Placement,
    pub repeat: Option<RepeatPolicy>,
}

impl OccurrenceRule {
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            repeat: None,
        }
    }

    pub fn occurrence_type(&self) -> OccurrenceType {
        self.placement.occurrence_type()
    }

    /// `true` when a repeat is attached and its frequency is not `NoRepeat`.
    pub fn is_repeating(&self) -> bool {
        self.repeat.is_some_and(|repeat| repeat.is_repeating())
    }
}

impl TryFrom<&OccurrenceDefinition> for OccurrenceRule {
    type Error = OccurrenceError;

    /// Checks, in order: the fields the occurrence type needs, that the
    /// repeat frequency is allowed for the type, then the repeat itself.
    fn try_from(definition: &OccurrenceDefinition) -> Result<Self> {
        let placement = Placement::from_definition(definition)?;

        let repeat = match &definition.repeat {
            Some(spec) => {
                let occurrence_type = definition.occurrence_type;
                if !occurrence_type.allows_frequency(spec.frequency) {
                    return Err(OccurrenceError::RepeatTypeNotAllowedForOccurrenceType {
                        occurrence_type,
                        frequency: spec.frequency,
                    });
                }
                Some(validate_repeat_specification(spec)?)
            }
            None => None,
        };

        Ok(Self { placement, repeat })
    }
}

impl TryFrom<OccurrenceDefinition> for OccurrenceRule {
    type Error = OccurrenceError;

    fn try_from(definition: OccurrenceDefinition) -> Result<Self> {
        OccurrenceRule::try_from(&definition)
    }
}

/// Checks an occurrence definition without evaluating it.
///
/// Validation is advisory: it reports the first constraint that fails and
/// never adjusts the definition.
///
/// # Errors
/// - `FieldInvalid` for a missing or out-of-range `offset`, `dayOfWeek` or `month`.
/// - `RepeatTypeNotAllowedForOccurrenceType` when the repeat frequency does not
///   fit the occurrence type.
/// - `PeriodRequired`, `FinalDateInvalid` or `MaxRepeatsInvalid` from the
///   repeat specification.
pub fn validate_occurrence_definition(definition: &OccurrenceDefinition) -> Result<()> {
    OccurrenceRule::try_from(definition).map(|_| ()).map_err(|err| {
        debug!(occurrence_type = %definition.occurrence_type, error = %err, "occurrence definition rejected");
        err
    })
}
