//! Unit conversion module
//!
//! Lifting weights are logged in the user's unit and body measurements in
//! centimeters or inches. Conversions happen at the edges (display, input);
//! business logic works in whatever unit a record was logged in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kilograms per pound factor
const KG_PER_LB: f64 = 0.453_592_37;

/// Centimeters per inch factor
const CM_PER_INCH: f64 = 2.54;

// ============================================================================
// Weight Units
// ============================================================================

/// Weight unit for lifted loads and body weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl WeightUnit {
    /// Convert from this unit to kilograms
    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lbs => value * KG_PER_LB,
        }
    }

    /// Convert from kilograms to this unit
    pub fn from_kg(&self, kg: f64) -> f64 {
        match self {
            WeightUnit::Kg => kg,
            WeightUnit::Lbs => kg / KG_PER_LB,
        }
    }

    /// Get the unit abbreviation
    pub fn abbreviation(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "lbs" | "lb" | "pound" | "pounds" => Ok(WeightUnit::Lbs),
            _ => Err(format!("Unknown weight unit: {}", s)),
        }
    }
}

// ============================================================================
// Length Units (body measurements)
// ============================================================================

/// Length unit for tape measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Cm,
    In,
}

impl LengthUnit {
    /// Convert from this unit to centimeters
    pub fn to_cm(&self, value: f64) -> f64 {
        match self {
            LengthUnit::Cm => value,
            LengthUnit::In => value * CM_PER_INCH,
        }
    }

    /// Convert from centimeters to this unit
    pub fn from_cm(&self, cm: f64) -> f64 {
        match self {
            LengthUnit::Cm => cm,
            LengthUnit::In => cm / CM_PER_INCH,
        }
    }

    /// Get the unit abbreviation
    pub fn abbreviation(&self) -> &'static str {
        match self {
            LengthUnit::Cm => "cm",
            LengthUnit::In => "in",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

// ============================================================================
// Unit System Preference
// ============================================================================

/// The persisted "units" preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Weight unit used by this system
    pub fn weight(&self) -> WeightUnit {
        match self {
            UnitSystem::Metric => WeightUnit::Kg,
            UnitSystem::Imperial => WeightUnit::Lbs,
        }
    }

    /// Length unit used by this system
    pub fn length(&self) -> LengthUnit {
        match self {
            UnitSystem::Metric => LengthUnit::Cm,
            UnitSystem::Imperial => LengthUnit::In,
        }
    }

    /// Stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(format!("Unknown unit system: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // =========================================================================
    // Weight Unit Tests
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: Weight conversion round-trip preserves value
        #[test]
        fn prop_weight_roundtrip_kg(kg in 0.5f64..1000.0) {
            let lbs = WeightUnit::Lbs.from_kg(kg);
            let back_to_kg = WeightUnit::Lbs.to_kg(lbs);
            prop_assert!(((kg - back_to_kg) / kg).abs() < 1e-6,
                "Round-trip failed: {} -> {} -> {}", kg, lbs, back_to_kg);
        }

        #[test]
        fn prop_kg_identity(kg in 0.0f64..1000.0) {
            prop_assert_eq!(WeightUnit::Kg.to_kg(kg), kg);
            prop_assert_eq!(WeightUnit::Kg.from_kg(kg), kg);
        }
    }

    #[test]
    fn test_known_weight_conversions() {
        // A 45 lb plate is about 20.4 kg
        let kg = WeightUnit::Lbs.to_kg(45.0);
        assert!((kg - 20.4117).abs() < 0.001);

        let lbs = WeightUnit::Lbs.from_kg(100.0);
        assert!((lbs - 220.462).abs() < 0.001);

        // The factor is kilograms in one pound
        assert_eq!(WeightUnit::Lbs.to_kg(1.0), KG_PER_LB);
        assert!(KG_PER_LB < 1.0);
    }

    #[test]
    fn test_known_length_conversions() {
        assert!((LengthUnit::In.to_cm(10.0) - 25.4).abs() < 1e-9);
        assert!((LengthUnit::In.from_cm(254.0) - 100.0).abs() < 1e-9);
        assert_eq!(LengthUnit::Cm.to_cm(42.0), 42.0);
    }

    #[test]
    fn test_unit_system_mapping() {
        assert_eq!(UnitSystem::Metric.weight(), WeightUnit::Kg);
        assert_eq!(UnitSystem::Imperial.weight(), WeightUnit::Lbs);
        assert_eq!(UnitSystem::Imperial.length(), LengthUnit::In);
        assert_eq!(UnitSystem::default(), UnitSystem::Metric);
    }

    // =========================================================================
    // String Parsing Tests
    // =========================================================================

    #[test]
    fn test_weight_unit_parsing() {
        assert_eq!("kg".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert_eq!("KGS".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert_eq!("lbs".parse::<WeightUnit>().unwrap(), WeightUnit::Lbs);
        assert_eq!("pounds".parse::<WeightUnit>().unwrap(), WeightUnit::Lbs);
        assert!("stone".parse::<WeightUnit>().is_err());
    }

    #[test]
    fn test_unit_system_parsing() {
        assert_eq!("imperial".parse::<UnitSystem>().unwrap(), UnitSystem::Imperial);
        assert_eq!(" Metric ".parse::<UnitSystem>().unwrap(), UnitSystem::Metric);
        assert!("nautical".parse::<UnitSystem>().is_err());
    }
}
