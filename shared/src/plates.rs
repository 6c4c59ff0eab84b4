//! Barbell plate calculator
//!
//! Greedy largest-first loading over exact decimals, so a reported total is
//! always the true sum of bar and plates. Targets are capped at the heaviest
//! set the app accepts, which keeps the plate list short.

use crate::errors::{DomainError, DomainResult};
use crate::units::WeightUnit;
use crate::validation::{max_set_weight, validate_plate, MIN_PLATE_WEIGHT};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bar and the plate denominations available for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateConfig {
    bar_weight: Decimal,
    available_plates: Vec<Decimal>,
    unit: WeightUnit,
}

impl PlateConfig {
    /// Build a config. Plates are sorted heaviest first and deduplicated.
    pub fn new(bar_weight: Decimal, plates: Vec<Decimal>, unit: WeightUnit) -> DomainResult<Self> {
        if bar_weight.is_sign_negative() {
            return Err(DomainError::Validation(
                "Bar weight cannot be negative".to_string(),
            ));
        }
        if let Some(bad) = plates.iter().find(|p| **p <= Decimal::ZERO) {
            return Err(DomainError::Validation(format!(
                "Plate weight must be positive, got {}",
                bad
            )));
        }
        let min_plate = Decimal::try_from(MIN_PLATE_WEIGHT).unwrap_or(Decimal::ZERO);
        if let Some(bad) = plates.iter().find(|p| **p < min_plate) {
            return Err(DomainError::Validation(format!(
                "Plate weight must be at least {}, got {}",
                MIN_PLATE_WEIGHT, bad
            )));
        }

        let mut available_plates = plates;
        available_plates.sort_by(|a, b| b.cmp(a));
        available_plates.dedup();

        Ok(Self {
            bar_weight,
            available_plates,
            unit,
        })
    }

    /// Build a config from float inputs (form fields, JS callers)
    pub fn from_f64(bar_weight: f64, plates: &[f64], unit: WeightUnit) -> DomainResult<Self> {
        let bar = to_decimal(bar_weight, "Bar weight")?;
        let plates = plates
            .iter()
            .map(|p| {
                validate_plate(*p).map_err(DomainError::Validation)?;
                to_decimal(*p, "Plate weight")
            })
            .collect::<DomainResult<Vec<_>>>()?;
        Self::new(bar, plates, unit)
    }

    /// Olympic bar in kilograms
    pub fn kilograms() -> Self {
        Self {
            bar_weight: Decimal::from(20),
            available_plates: vec![
                Decimal::from(25),
                Decimal::from(20),
                Decimal::from(15),
                Decimal::from(10),
                Decimal::from(5),
                Decimal::new(25, 1),
                Decimal::new(125, 2),
            ],
            unit: WeightUnit::Kg,
        }
    }

    /// Standard bar in pounds
    pub fn pounds() -> Self {
        Self {
            bar_weight: Decimal::from(45),
            available_plates: vec![
                Decimal::from(45),
                Decimal::from(35),
                Decimal::from(25),
                Decimal::from(10),
                Decimal::from(5),
                Decimal::new(25, 1),
            ],
            unit: WeightUnit::Lbs,
        }
    }

    pub fn for_unit(unit: WeightUnit) -> Self {
        match unit {
            WeightUnit::Kg => Self::kilograms(),
            WeightUnit::Lbs => Self::pounds(),
        }
    }

    /// Same plates, different bar
    pub fn with_bar_weight(mut self, bar_weight: Decimal) -> DomainResult<Self> {
        if bar_weight.is_sign_negative() {
            return Err(DomainError::Validation(
                "Bar weight cannot be negative".to_string(),
            ));
        }
        self.bar_weight = bar_weight;
        Ok(self)
    }

    pub fn bar_weight(&self) -> Decimal {
        self.bar_weight
    }

    pub fn available_plates(&self) -> &[Decimal] {
        &self.available_plates
    }

    pub fn unit(&self) -> WeightUnit {
        self.unit
    }
}

fn to_decimal(value: f64, what: &str) -> DomainResult<Decimal> {
    Decimal::try_from(value)
        .map(|d| d.normalize())
        .map_err(|_| DomainError::Validation(format!("{} must be a valid number", what)))
}

/// How close the loaded bar came to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlateOutcome {
    Exact,
    EmptyBar,
    BelowBar,
    /// The target needs `shortfall` more than the plates can make
    Closest { shortfall: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateSolution {
    pub plates_per_side: Vec<Decimal>,
    pub total_weight: Decimal,
    pub outcome: PlateOutcome,
    pub unit: WeightUnit,
}

impl PlateSolution {
    pub fn is_exact(&self) -> bool {
        matches!(self.outcome, PlateOutcome::Exact | PlateOutcome::EmptyBar)
    }

    /// User-facing note, `None` when the target was hit with plates
    pub fn message(&self) -> Option<String> {
        match self.outcome {
            PlateOutcome::Exact => None,
            PlateOutcome::EmptyBar => Some("Empty bar".to_string()),
            PlateOutcome::BelowBar => Some("Target weight is less than bar weight".to_string()),
            PlateOutcome::Closest { .. } => Some(format!(
                "Closest match: {}{} (can't reach exact weight)",
                self.total_weight.normalize(),
                self.unit.abbreviation()
            )),
        }
    }
}

/// Heaviest target accepted for `unit`
pub fn max_target(unit: WeightUnit) -> Decimal {
    Decimal::from(max_set_weight(unit) as i64)
}

/// Plates to load on each side to reach `target`.
///
/// Fails when `target` is above [`max_target`] for the config's unit.
pub fn calculate_plates(target: Decimal, config: &PlateConfig) -> DomainResult<PlateSolution> {
    let max = max_target(config.unit);
    if target > max {
        return Err(DomainError::Validation(format!(
            "Target weight must be at most {}{}",
            max,
            config.unit.abbreviation()
        )));
    }

    let bar = config.bar_weight;
    let per_side = (target - bar) / Decimal::TWO;

    if per_side < Decimal::ZERO {
        return Ok(PlateSolution {
            plates_per_side: Vec::new(),
            total_weight: bar,
            outcome: PlateOutcome::BelowBar,
            unit: config.unit,
        });
    }
    if per_side.is_zero() {
        return Ok(PlateSolution {
            plates_per_side: Vec::new(),
            total_weight: bar,
            outcome: PlateOutcome::EmptyBar,
            unit: config.unit,
        });
    }

    let mut remaining = per_side;
    let mut plates = Vec::new();
    for &plate in &config.available_plates {
        let count = (remaining / plate).floor();
        let Some(n) = count.to_usize().filter(|n| *n > 0) else {
            continue;
        };
        plates.extend(std::iter::repeat(plate).take(n));
        remaining -= plate * count;
    }

    let loaded: Decimal = plates.iter().copied().sum();
    let total_weight = total_from_per_side(loaded, bar);
    let outcome = if remaining.is_zero() {
        PlateOutcome::Exact
    } else {
        PlateOutcome::Closest {
            shortfall: remaining * Decimal::TWO,
        }
    };

    Ok(PlateSolution {
        plates_per_side: plates,
        total_weight,
        outcome,
        unit: config.unit,
    })
}

/// Total on the bar given what is loaded on one side
pub fn total_from_per_side(per_side: Decimal, bar_weight: Decimal) -> Decimal {
    bar_weight + per_side * Decimal::TWO
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn decs(values: &[&str]) -> Vec<Decimal> {
        values.iter().map(|s| dec(s)).collect()
    }

    // =========================================================================
    // Config Tests
    // =========================================================================

    #[test]
    fn test_config_sorts_and_dedups() {
        let config = PlateConfig::new(dec("20"), decs(&["5", "25", "5", "10"]), WeightUnit::Kg).unwrap();
        assert_eq!(config.available_plates(), decs(&["25", "10", "5"]).as_slice());
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(PlateConfig::new(dec("-1"), decs(&["5"]), WeightUnit::Kg).is_err());
        assert!(PlateConfig::new(dec("20"), decs(&["5", "0"]), WeightUnit::Kg).is_err());
        assert!(PlateConfig::from_f64(20.0, &[f64::NAN], WeightUnit::Kg).is_err());
        assert!(PlateConfig::from_f64(f64::INFINITY, &[5.0], WeightUnit::Kg).is_err());
    }

    #[test]
    fn test_config_from_f64_is_exact() {
        let config = PlateConfig::from_f64(20.0, &[1.25, 2.5], WeightUnit::Kg).unwrap();
        assert_eq!(config.available_plates(), decs(&["2.5", "1.25"]).as_slice());
    }

    // =========================================================================
    // Solver Tests
    // =========================================================================

    #[rstest]
    #[case("100", &["25", "15"])]
    #[case("60", &["20"])]
    #[case("102.5", &["25", "15", "1.25"])]
    #[case("142.5", &["25", "25", "10", "1.25"])]
    #[case("22.5", &["1.25"])]
    fn test_kg_exact(#[case] target: &str, #[case] expected: &[&str]) {
        let solution = calculate_plates(dec(target), &PlateConfig::kilograms()).unwrap();
        assert_eq!(solution.plates_per_side, decs(expected));
        assert_eq!(solution.total_weight, dec(target));
        assert_eq!(solution.outcome, PlateOutcome::Exact);
        assert_eq!(solution.message(), None);
    }

    #[rstest]
    #[case("135", &["45"])]
    #[case("225", &["45", "45"])]
    #[case("185", &["45", "25"])]
    fn test_lbs_exact(#[case] target: &str, #[case] expected: &[&str]) {
        let solution = calculate_plates(dec(target), &PlateConfig::pounds()).unwrap();
        assert_eq!(solution.plates_per_side, decs(expected));
        assert!(solution.is_exact());
    }

    #[test]
    fn test_empty_bar() {
        let solution = calculate_plates(dec("20"), &PlateConfig::kilograms()).unwrap();
        assert!(solution.plates_per_side.is_empty());
        assert_eq!(solution.outcome, PlateOutcome::EmptyBar);
        assert_eq!(solution.message().as_deref(), Some("Empty bar"));
    }

    #[test]
    fn test_below_bar() {
        let solution = calculate_plates(dec("15"), &PlateConfig::kilograms()).unwrap();
        assert_eq!(solution.total_weight, dec("20"));
        assert_eq!(solution.outcome, PlateOutcome::BelowBar);
        assert_eq!(
            solution.message().as_deref(),
            Some("Target weight is less than bar weight")
        );
    }

    #[test]
    fn test_closest_match() {
        let solution = calculate_plates(dec("101"), &PlateConfig::kilograms()).unwrap();
        assert_eq!(solution.plates_per_side, decs(&["25", "15"]));
        assert_eq!(solution.total_weight, dec("100"));
        assert_eq!(solution.outcome, PlateOutcome::Closest { shortfall: dec("1") });
        assert_eq!(
            solution.message().as_deref(),
            Some("Closest match: 100kg (can't reach exact weight)")
        );
    }

    #[test]
    fn test_closest_match_message_uses_unit() {
        let solution = calculate_plates(dec("137"), &PlateConfig::pounds()).unwrap();
        assert_eq!(
            solution.message().as_deref(),
            Some("Closest match: 135lbs (can't reach exact weight)")
        );
    }

    #[test]
    fn test_heaviest_target_is_solved() {
        let solution = calculate_plates(dec("1000"), &PlateConfig::kilograms()).unwrap();
        assert!(solution.is_exact());
        assert_eq!(solution.plates_per_side.len(), 20);
        assert_eq!(solution.plates_per_side[..19], [dec("25"); 19]);
        assert_eq!(solution.plates_per_side[19], dec("15"));

        assert_eq!(max_target(WeightUnit::Lbs), dec("2204"));
        assert!(calculate_plates(dec("2200"), &PlateConfig::pounds()).is_ok());
    }

    #[rstest]
    #[case("1000.5", WeightUnit::Kg)]
    #[case("1000000000000", WeightUnit::Kg)]
    #[case("2205", WeightUnit::Lbs)]
    fn test_oversized_target_rejected(#[case] target: &str, #[case] unit: WeightUnit) {
        let err = calculate_plates(dec(target), &PlateConfig::for_unit(unit)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_config_rejects_tiny_plates() {
        assert!(PlateConfig::new(dec("20"), decs(&["0.01"]), WeightUnit::Kg).is_err());
        assert!(PlateConfig::from_f64(20.0, &[0.000001], WeightUnit::Kg).is_err());
        assert!(PlateConfig::new(dec("20"), decs(&["0.25"]), WeightUnit::Kg).is_ok());
    }

    #[test]
    fn test_total_from_per_side() {
        assert_eq!(total_from_per_side(dec("41.25"), dec("20")), dec("102.5"));
        assert_eq!(total_from_per_side(Decimal::ZERO, dec("45")), dec("45"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: total = bar + 2 x plates, never above target, heaviest first
        #[test]
        fn prop_solution_invariants(quarter_kgs in 80u32..2000) {
            let target = Decimal::new(quarter_kgs as i64 * 25, 2);
            let config = PlateConfig::kilograms();
            let solution = calculate_plates(target, &config).unwrap();

            let per_side: Decimal = solution.plates_per_side.iter().copied().sum();
            prop_assert_eq!(solution.total_weight, config.bar_weight() + per_side * Decimal::TWO);
            prop_assert!(solution.total_weight <= target);
            prop_assert!(solution.plates_per_side.windows(2).all(|w| w[0] >= w[1]));
        }

        /// Property: solving is deterministic
        #[test]
        fn prop_solution_deterministic(tenths in 0u32..5000) {
            let target = Decimal::new(tenths as i64, 1);
            let config = PlateConfig::pounds();
            prop_assert_eq!(calculate_plates(target, &config).unwrap(), calculate_plates(target, &config).unwrap());
        }

        /// Property: multiples of 2.5 kg above the bar are always exact
        #[test]
        fn prop_kg_multiples_of_two_and_a_half_exact(steps in 0u32..200) {
            let target = Decimal::from(20) + Decimal::new(25, 1) * Decimal::from(steps);
            let solution = calculate_plates(target, &PlateConfig::kilograms()).unwrap();
            prop_assert!(solution.is_exact());
            prop_assert_eq!(solution.total_weight, target);
        }
    }
}
