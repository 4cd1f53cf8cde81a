//! Error types for occurrence-engine operations.

use std::fmt;

use thiserror::Error;

use crate::occurrence::OccurrenceType;
use crate::repeat::RepeatFrequency;

/// A field of an occurrence definition that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionField {
    /// `offset` is missing or below the occurrence type's minimum.
    Offset { min: i32 },
    /// `dayOfWeek` is missing or outside `0..7`.
    DayOfWeek,
    /// `month` is missing or outside `0..12`.
    Month,
}

impl fmt::Display for DefinitionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionField::Offset { min } => write!(f, "offset (must be at least {})", min),
            DefinitionField::DayOfWeek => write!(f, "dayOfWeek (must be 0-6, 0 = Sunday)"),
            DefinitionField::Month => write!(f, "month (must be 0-11, 0 = January)"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OccurrenceError {
    #[error("Invalid field: {0}")]
    FieldInvalid(DefinitionField),

    #[error("Repeat type {frequency} is not allowed for occurrence type {occurrence_type}")]
    RepeatTypeNotAllowedForOccurrenceType {
        occurrence_type: OccurrenceType,
        frequency: RepeatFrequency,
    },

    #[error("A non-negative repeat period is required")]
    PeriodRequired,

    #[error("The repeat final date is not a valid date")]
    FinalDateInvalid,

    #[error("The maximum repeat count must not be negative")]
    MaxRepeatsInvalid,

    #[error("Invalid occurrence type: {0}")]
    OccurrenceTypeInvalid(String),

    #[error("Invalid repeat type: {0}")]
    RepeatTypeInvalid(String),

    #[error("Invalid date: {0}")]
    DateParse(String),
}

pub type Result<T> = std::result::Result<T, OccurrenceError>;
