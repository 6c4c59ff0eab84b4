//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Uses both custom validators and the `validator` crate for derive macros.

use crate::units::WeightUnit;
use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Heaviest load accepted for a single set, in kilograms
pub const MAX_SET_WEIGHT: f64 = 1000.0;

/// Lightest plate denomination accepted (fractional change plates)
pub const MIN_PLATE_WEIGHT: f64 = 0.25;

/// Most reps accepted for a single set
pub const MAX_REPS: u32 = 1000;

/// Largest single calorie adjustment
pub const MAX_CALORIE_DELTA: i64 = 50_000;

/// Largest body measurement value (cm, in, kg or lbs)
pub const MAX_MEASUREMENT: f64 = 1000.0;

/// Longest countdown the timer accepts (24 hours)
pub const MAX_COUNTDOWN_SECONDS: u64 = 86_400;

/// Leading numeric prefix of a form input, e.g. "62.5kg" -> "62.5"
static NUMBER_PREFIX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").ok());

/// Heaviest set load in `unit`, rounded down to a whole number
pub fn max_set_weight(unit: WeightUnit) -> f64 {
    unit.from_kg(MAX_SET_WEIGHT).floor()
}

/// Validate the weight of a set logged in `unit`
pub fn validate_set_weight_in(weight: f64, unit: WeightUnit) -> Result<(), String> {
    let max = max_set_weight(unit);
    if weight.is_finite() && weight > max {
        return Err(format!("Weight must be at most {}{}", max, unit.abbreviation()));
    }
    validate_set_weight(unit.to_kg(weight))
}

/// Validate the weight of a set in kilograms
pub fn validate_set_weight(weight: f64) -> Result<(), String> {
    if weight.is_nan() || weight.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight < 0.0 {
        return Err("Weight cannot be negative".to_string());
    }
    if weight > MAX_SET_WEIGHT {
        return Err(format!("Weight must be at most {}", MAX_SET_WEIGHT));
    }
    Ok(())
}

/// Validate the rep count of a set
pub fn validate_reps(reps: u32) -> Result<(), String> {
    if reps > MAX_REPS {
        return Err(format!("Reps must be at most {}", MAX_REPS));
    }
    Ok(())
}

/// Validate a calorie adjustment (negative values are corrections)
pub fn validate_calorie_delta(delta: i64) -> Result<(), String> {
    if delta.abs() > MAX_CALORIE_DELTA {
        return Err("Calorie value unreasonably high".to_string());
    }
    Ok(())
}

/// Validate a body measurement
pub fn validate_measurement(value: f64) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err("Measurement must be a valid number".to_string());
    }
    if value < 0.0 {
        return Err("Measurement cannot be negative".to_string());
    }
    if value > MAX_MEASUREMENT {
        return Err(format!("Measurement must be at most {}", MAX_MEASUREMENT));
    }
    Ok(())
}

/// Validate a countdown length in seconds
pub fn validate_countdown_seconds(seconds: u64) -> Result<(), String> {
    if seconds == 0 {
        return Err("Timer must be at least 1 second".to_string());
    }
    if seconds > MAX_COUNTDOWN_SECONDS {
        return Err("Timer cannot exceed 24 hours".to_string());
    }
    Ok(())
}

/// Validate a plate denomination
pub fn validate_plate(plate: f64) -> Result<(), String> {
    if plate.is_nan() || plate.is_infinite() {
        return Err("Plate weight must be a valid number".to_string());
    }
    if plate <= 0.0 {
        return Err("Plate weight must be positive".to_string());
    }
    if plate < MIN_PLATE_WEIGHT {
        return Err(format!("Plate weight must be at least {}", MIN_PLATE_WEIGHT));
    }
    Ok(())
}

/// Lenient numeric parse of a form input.
///
/// Reads the leading number and ignores trailing text ("80kg" is 80).
/// Anything without a leading number, or that overflows, is 0.
pub fn parse_number_or_zero(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let Some(re) = NUMBER_PREFIX.as_ref() else {
        return trimmed.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0);
    };

    re.find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn field_display_label(field_name: &str) -> &str {
    match field_name {
        "weight" => "Weight",
        "reps" => "Reps",
        "calories" => "Calories",
        "neck" => "Neck",
        "shoulders" => "Shoulders",
        "chest" => "Chest",
        "biceps_left" => "Biceps (Left)",
        "biceps_right" => "Biceps (Right)",
        "forearms" => "Forearms",
        "waist" => "Waist",
        "hips" => "Hips",
        "thigh_left" => "Thigh (Left)",
        "thigh_right" => "Thigh (Right)",
        "calves" => "Calves",
        "custom_measurement" => "Custom Measurement",
        "timer" => "Timer",
        "bar_weight" => "Bar Weight",
        "plates" => "Plates",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}

impl From<ValidationError> for crate::errors::DomainError {
    fn from(err: ValidationError) -> Self {
        crate::errors::DomainError::Validation(err.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_validate_set_weight() {
        assert!(validate_set_weight(0.0).is_ok());
        assert!(validate_set_weight(142.5).is_ok());
        assert!(validate_set_weight(1000.0).is_ok());
        assert!(validate_set_weight(-2.5).is_err());
        assert!(validate_set_weight(1000.5).is_err());
        assert!(validate_set_weight(f64::NAN).is_err());
        assert!(validate_set_weight(f64::INFINITY).is_err());
    }

    #[test]
    fn test_set_weight_cap_follows_unit() {
        assert_eq!(max_set_weight(WeightUnit::Kg), 1000.0);
        assert_eq!(max_set_weight(WeightUnit::Lbs), 2204.0);

        assert!(validate_set_weight_in(1000.0, WeightUnit::Kg).is_ok());
        assert!(validate_set_weight_in(1001.0, WeightUnit::Kg).is_err());
        assert!(validate_set_weight_in(1001.0, WeightUnit::Lbs).is_ok());
        assert!(validate_set_weight_in(2204.0, WeightUnit::Lbs).is_ok());
        assert_eq!(
            validate_set_weight_in(2205.0, WeightUnit::Lbs).unwrap_err(),
            "Weight must be at most 2204lbs"
        );
        assert!(validate_set_weight_in(-1.0, WeightUnit::Lbs).is_err());
        assert!(validate_set_weight_in(f64::NAN, WeightUnit::Lbs).is_err());
    }

    #[test]
    fn test_validate_reps() {
        assert!(validate_reps(0).is_ok());
        assert!(validate_reps(1000).is_ok());
        assert!(validate_reps(1001).is_err());
    }

    #[test]
    fn test_validate_calorie_delta() {
        assert!(validate_calorie_delta(-300).is_ok());
        assert!(validate_calorie_delta(50_000).is_ok());
        assert!(validate_calorie_delta(-50_001).is_err());
    }

    #[test]
    fn test_validate_countdown_seconds() {
        assert!(validate_countdown_seconds(1).is_ok());
        assert!(validate_countdown_seconds(86_400).is_ok());
        assert!(validate_countdown_seconds(0).is_err());
        assert!(validate_countdown_seconds(86_401).is_err());
    }

    #[test]
    fn test_validate_plate() {
        assert!(validate_plate(1.25).is_ok());
        assert!(validate_plate(0.0).is_err());
        assert!(validate_plate(-5.0).is_err());
        assert!(validate_plate(f64::NAN).is_err());
        assert!(validate_plate(0.25).is_ok());
        assert!(validate_plate(0.001).is_err());
    }

    // =========================================================================
    // Lenient Parsing Tests
    // =========================================================================

    #[rstest]
    #[case("80", 80.0)]
    #[case(" 62.5 ", 62.5)]
    #[case("80kg", 80.0)]
    #[case(".5", 0.5)]
    #[case("-10", -10.0)]
    #[case("1e2", 100.0)]
    #[case("", 0.0)]
    #[case("abc", 0.0)]
    #[case("kg80", 0.0)]
    #[case("1e999", 0.0)]
    fn test_parse_number_or_zero(#[case] raw: &str, #[case] expected: f64) {
        assert_eq!(parse_number_or_zero(raw), expected);
    }

    #[test]
    fn test_field_display_labels() {
        assert_eq!(field_display_label("biceps_left"), "Biceps (Left)");
        assert_eq!(field_display_label("thigh_right"), "Thigh (Right)");
        assert_eq!(field_display_label("unknown_field"), "unknown_field");
    }

    #[test]
    fn test_validation_error() {
        let err = ValidationError::new("waist", "cannot be negative");
        assert_eq!(err.display_label, "Waist");
        assert_eq!(err.user_message(), "Waist: cannot be negative");

        let domain: crate::errors::DomainError = err.into();
        assert_eq!(
            domain.to_string(),
            "Validation error: Waist: cannot be negative"
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_valid_set_weight_range(weight in 0.0f64..=1000.0) {
            prop_assert!(validate_set_weight(weight).is_ok());
        }

        #[test]
        fn prop_invalid_set_weight_above_max(weight in 1000.01f64..5000.0) {
            prop_assert!(validate_set_weight(weight).is_err());
        }

        /// Property: formatting a number and parsing it back is lossless
        #[test]
        fn prop_parse_number_roundtrip(value in -10_000.0f64..10_000.0) {
            let parsed = parse_number_or_zero(&value.to_string());
            prop_assert_eq!(parsed, value);
        }

        /// Property: lenient parse never yields a non-finite value
        #[test]
        fn prop_parse_number_always_finite(raw in ".*") {
            prop_assert!(parse_number_or_zero(&raw).is_finite());
        }
    }
}
