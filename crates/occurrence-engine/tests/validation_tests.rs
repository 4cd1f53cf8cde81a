//! Tests for occurrence-definition validation.

use chrono::Weekday;
use occurrence_engine::{
    validate_occurrence_definition, DefinitionField, OccurrenceDefinition, OccurrenceError,
    OccurrenceRule, OccurrenceType, Placement, RepeatFrequency, RepeatSpecification,
};

fn repeat(frequency: RepeatFrequency) -> RepeatSpecification {
    RepeatSpecification::new(frequency, 1)
}

/// A definition with every field its type needs, set to a valid value.
fn complete(occurrence_type: OccurrenceType) -> OccurrenceDefinition {
    let mut definition = OccurrenceDefinition::new(occurrence_type);
    if occurrence_type.has_offset() {
        definition = definition.with_offset(occurrence_type.offset_min());
    }
    if occurrence_type.has_day_of_week() {
        definition = definition.with_day_of_week(1);
    }
    if occurrence_type.has_specific_month() {
        definition = definition.with_month(1);
    }
    definition
}

// ---------------------------------------------------------------------------
// Occurrence type names
// ---------------------------------------------------------------------------

#[test]
fn type_names_round_trip() {
    for occurrence_type in OccurrenceType::ALL {
        assert_eq!(
            occurrence_type.name().parse::<OccurrenceType>(),
            Ok(occurrence_type)
        );
        let json = serde_json::to_string(&occurrence_type).unwrap();
        assert_eq!(json, format!("\"{}\"", occurrence_type.name()));
    }
}

#[test]
fn unknown_type_is_rejected() {
    assert_eq!(
        "DAY_OF_FORTNIGHT".parse::<OccurrenceType>(),
        Err(OccurrenceError::OccurrenceTypeInvalid(
            "DAY_OF_FORTNIGHT".to_string()
        ))
    );
}

#[test]
fn unknown_type_in_json_reports_invalid_type() {
    let err = serde_json::from_str::<OccurrenceDefinition>(
        r#"{"occurrenceType":"DAY_OF_FORTNIGHT","offset":1}"#,
    )
    .unwrap_err();
    assert!(
        err.to_string()
            .starts_with("Invalid occurrence type: DAY_OF_FORTNIGHT"),
        "{err}"
    );
}

#[test]
fn unknown_frequency_in_json_reports_invalid_repeat_type() {
    let err = serde_json::from_str::<OccurrenceDefinition>(
        r#"{"occurrenceType":"DAY_OF_MONTH","offset":1,
            "repeat":{"frequency":"FORTNIGHTLY","period":1}}"#,
    )
    .unwrap_err();
    assert!(
        err.to_string().starts_with("Invalid repeat type: FORTNIGHTLY"),
        "{err}"
    );
}

#[test]
fn type_metadata() {
    assert!(!OccurrenceType::DayOfWeek.has_offset());
    assert_eq!(OccurrenceType::DayOfMonth.offset_min(), 0);
    assert_eq!(OccurrenceType::DowEndOfYear.offset_min(), 1);
    assert!(OccurrenceType::DowEndOfSpecificMonth.is_from_end());
    assert!(!OccurrenceType::DowOfSpecificMonth.is_from_end());
    assert!(OccurrenceType::DayEndOfSpecificMonth.has_specific_month());
    assert!(!OccurrenceType::DayOfYear.has_day_of_week());
}

// ---------------------------------------------------------------------------
// Field checks
// ---------------------------------------------------------------------------

#[test]
fn every_complete_definition_is_valid() {
    for occurrence_type in OccurrenceType::ALL {
        let definition = complete(occurrence_type);
        assert_eq!(
            validate_occurrence_definition(&definition),
            Ok(()),
            "{occurrence_type}"
        );
        let rule = OccurrenceRule::try_from(&definition).unwrap();
        assert_eq!(rule.occurrence_type(), occurrence_type);
        assert!(!rule.is_repeating());
    }
}

#[test]
fn day_of_week_is_required_and_ranged() {
    let missing = OccurrenceDefinition::new(OccurrenceType::DayOfWeek);
    assert_eq!(
        validate_occurrence_definition(&missing),
        Err(OccurrenceError::FieldInvalid(DefinitionField::DayOfWeek))
    );
    for bad in [-1, 7] {
        let definition = OccurrenceDefinition::new(OccurrenceType::DowOfMonth)
            .with_offset(1)
            .with_day_of_week(bad);
        assert_eq!(
            validate_occurrence_definition(&definition),
            Err(OccurrenceError::FieldInvalid(DefinitionField::DayOfWeek))
        );
    }
}

#[test]
fn offset_minimum_depends_on_type() {
    let day = OccurrenceDefinition::new(OccurrenceType::DayOfMonth).with_offset(-1);
    assert_eq!(
        validate_occurrence_definition(&day),
        Err(OccurrenceError::FieldInvalid(DefinitionField::Offset { min: 0 }))
    );

    let nth = OccurrenceDefinition::new(OccurrenceType::DowOfMonth)
        .with_offset(0)
        .with_day_of_week(1);
    assert_eq!(
        validate_occurrence_definition(&nth),
        Err(OccurrenceError::FieldInvalid(DefinitionField::Offset { min: 1 }))
    );

    let missing = OccurrenceDefinition::new(OccurrenceType::DayEndOfYear);
    assert_eq!(
        validate_occurrence_definition(&missing),
        Err(OccurrenceError::FieldInvalid(DefinitionField::Offset { min: 0 }))
    );
}

#[test]
fn month_is_required_and_ranged() {
    for bad in [None, Some(-1), Some(12)] {
        let mut definition =
            OccurrenceDefinition::new(OccurrenceType::DayOfSpecificMonth).with_offset(3);
        definition.month = bad;
        assert_eq!(
            validate_occurrence_definition(&definition),
            Err(OccurrenceError::FieldInvalid(DefinitionField::Month))
        );
    }
}

#[test]
fn unused_fields_are_ignored() {
    let definition = OccurrenceDefinition::new(OccurrenceType::DayOfMonth)
        .with_offset(5)
        .with_day_of_week(42)
        .with_month(-7);
    let rule = OccurrenceRule::try_from(definition).unwrap();
    assert_eq!(rule.placement, Placement::DayOfMonth { offset: 5 });
}

#[test]
fn placement_carries_checked_fields() {
    let definition = OccurrenceDefinition::new(OccurrenceType::DowEndOfSpecificMonth)
        .with_offset(3)
        .with_day_of_week(0)
        .with_month(1);
    let rule = OccurrenceRule::try_from(&definition).unwrap();
    assert_eq!(
        rule.placement,
        Placement::DowEndOfSpecificMonth {
            nth: 3,
            weekday: Weekday::Sun,
            month: 1,
        }
    );
}

// ---------------------------------------------------------------------------
// Repeat compatibility
// ---------------------------------------------------------------------------

#[test]
fn day_of_week_rejects_monthly_repeat() {
    let definition = OccurrenceDefinition::new(OccurrenceType::DayOfWeek)
        .with_day_of_week(0)
        .with_repeat(repeat(RepeatFrequency::Monthly));
    assert_eq!(
        validate_occurrence_definition(&definition),
        Err(OccurrenceError::RepeatTypeNotAllowedForOccurrenceType {
            occurrence_type: OccurrenceType::DayOfWeek,
            frequency: RepeatFrequency::Monthly,
        })
    );
}

#[test]
fn allowed_frequencies_per_cycle() {
    let cases = [
        (OccurrenceType::DayOfWeek, RepeatFrequency::Weekly, true),
        (OccurrenceType::DayOfWeek, RepeatFrequency::Yearly, false),
        (OccurrenceType::DayOfMonth, RepeatFrequency::Monthly, true),
        (OccurrenceType::DayOfMonth, RepeatFrequency::Yearly, true),
        (OccurrenceType::DayOfMonth, RepeatFrequency::Weekly, false),
        (OccurrenceType::DowEndOfMonth, RepeatFrequency::Monthly, true),
        (OccurrenceType::DayOfSpecificMonth, RepeatFrequency::Yearly, true),
        (OccurrenceType::DayOfSpecificMonth, RepeatFrequency::Monthly, false),
        (OccurrenceType::DayOfYear, RepeatFrequency::Yearly, true),
        (OccurrenceType::DowOfYear, RepeatFrequency::Weekly, false),
    ];
    for (occurrence_type, frequency, allowed) in cases {
        let definition = complete(occurrence_type).with_repeat(repeat(frequency));
        assert_eq!(
            validate_occurrence_definition(&definition).is_ok(),
            allowed,
            "{occurrence_type} with {frequency}"
        );
    }
}

#[test]
fn daily_and_no_repeat() {
    for occurrence_type in OccurrenceType::ALL {
        assert!(!occurrence_type.allows_frequency(RepeatFrequency::Daily));
        assert!(occurrence_type.allows_frequency(RepeatFrequency::NoRepeat));
        let definition = complete(occurrence_type).with_repeat(RepeatSpecification::no_repeat());
        assert_eq!(validate_occurrence_definition(&definition), Ok(()));
    }
}

#[test]
fn repeat_specification_errors_surface() {
    let definition = complete(OccurrenceType::DayOfMonth).with_repeat(RepeatSpecification {
        frequency: RepeatFrequency::Monthly,
        ..RepeatSpecification::default()
    });
    assert_eq!(
        validate_occurrence_definition(&definition),
        Err(OccurrenceError::PeriodRequired)
    );

    let definition = complete(OccurrenceType::DayOfMonth)
        .with_repeat(repeat(RepeatFrequency::Monthly).with_max_repeats(-2));
    assert_eq!(
        validate_occurrence_definition(&definition),
        Err(OccurrenceError::MaxRepeatsInvalid)
    );
}

#[test]
fn field_errors_come_before_repeat_errors() {
    let definition = OccurrenceDefinition::new(OccurrenceType::DayOfWeek)
        .with_repeat(RepeatSpecification::new(RepeatFrequency::Monthly, -1));
    assert_eq!(
        validate_occurrence_definition(&definition),
        Err(OccurrenceError::FieldInvalid(DefinitionField::DayOfWeek))
    );

    let definition = OccurrenceDefinition::new(OccurrenceType::DayOfWeek)
        .with_day_of_week(2)
        .with_repeat(RepeatSpecification::new(RepeatFrequency::Monthly, -1));
    assert!(matches!(
        validate_occurrence_definition(&definition),
        Err(OccurrenceError::RepeatTypeNotAllowedForOccurrenceType { .. })
    ));
}

// ---------------------------------------------------------------------------
// JSON form
// ---------------------------------------------------------------------------

#[test]
fn definition_deserializes_from_camel_case() {
    let definition: OccurrenceDefinition = serde_json::from_str(
        r#"{"occurrenceType":"DOW_OF_MONTH","offset":2,"dayOfWeek":3,
            "repeat":{"frequency":"MONTHLY","period":2,"maxRepeats":3}}"#,
    )
    .unwrap();
    assert_eq!(
        definition,
        OccurrenceDefinition::new(OccurrenceType::DowOfMonth)
            .with_offset(2)
            .with_day_of_week(3)
            .with_repeat(RepeatSpecification::new(RepeatFrequency::Monthly, 2).with_max_repeats(3))
    );
    let rule = OccurrenceRule::try_from(&definition).unwrap();
    assert!(rule.is_repeating());
}

#[test]
fn error_messages_name_the_problem() {
    let err = OccurrenceError::FieldInvalid(DefinitionField::Offset { min: 1 });
    assert_eq!(err.to_string(), "Invalid field: offset (must be at least 1)");
    let err = OccurrenceError::RepeatTypeNotAllowedForOccurrenceType {
        occurrence_type: OccurrenceType::DayOfWeek,
        frequency: RepeatFrequency::Monthly,
    };
    assert_eq!(
        err.to_string(),
        "Repeat type MONTHLY is not allowed for occurrence type DAY_OF_WEEK"
    );
}
