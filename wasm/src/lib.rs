//! NeuroLift WASM Module
//!
//! This crate provides WebAssembly bindings for the calculations the
//! workout screen runs on every keystroke: plate loading, clock display and
//! the next-weight hint.

use neurolift_shared::overload::{next_weight, DEFAULT_INCREMENT, LOW_REP_THRESHOLD};
use neurolift_shared::plates::{self, PlateConfig, PlateOutcome, PlateSolution};
use neurolift_shared::WeightUnit;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Plate solution with plain numbers for JavaScript
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlateSolutionJs {
    plates_per_side: Vec<f64>,
    total_weight: f64,
    outcome: &'static str,
    shortfall: Option<f64>,
    unit: &'static str,
    message: Option<String>,
}

impl From<&PlateSolution> for PlateSolutionJs {
    fn from(solution: &PlateSolution) -> Self {
        let (outcome, shortfall) = match solution.outcome {
            PlateOutcome::Exact => ("exact", None),
            PlateOutcome::EmptyBar => ("emptyBar", None),
            PlateOutcome::BelowBar => ("belowBar", None),
            PlateOutcome::Closest { shortfall } => ("closest", Some(to_f64(shortfall))),
        };

        Self {
            plates_per_side: solution.plates_per_side.iter().copied().map(to_f64).collect(),
            total_weight: to_f64(solution.total_weight),
            outcome,
            shortfall,
            unit: solution.unit.abbreviation(),
            message: solution.message(),
        }
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// Solve the plates for `target` with the standard bar and plates of `unit`
/// ("kg" or "lbs"). Returns the solution as JSON, or `{"error": ...}`.
#[wasm_bindgen]
pub fn calculate_plates_json(target: f64, unit: &str) -> String {
    let unit: WeightUnit = match unit.parse() {
        Ok(unit) => unit,
        Err(e) => return error_json(&e),
    };
    let target = match Decimal::try_from(target) {
        Ok(target) => target,
        Err(_) => return error_json("Target weight must be a valid number"),
    };

    let solution = match plates::calculate_plates(target, &PlateConfig::for_unit(unit)) {
        Ok(solution) => solution,
        Err(e) => return error_json(&e.to_string()),
    };
    serde_json::to_string(&PlateSolutionJs::from(&solution)).unwrap_or_else(|e| error_json(&e.to_string()))
}

/// Plates per side for a custom bar and plate set.
///
/// Invalid input yields an empty list.
#[wasm_bindgen]
pub fn plates_per_side(target: f64, bar_weight: f64, plates: &[f64]) -> Vec<f64> {
    let Ok(config) = PlateConfig::from_f64(bar_weight, plates, WeightUnit::Kg) else {
        return Vec::new();
    };
    let Ok(target) = Decimal::try_from(target) else {
        return Vec::new();
    };

    match plates::calculate_plates(target, &config) {
        Ok(solution) => solution.plates_per_side.into_iter().map(to_f64).collect(),
        Err(_) => Vec::new(),
    }
}

/// Bar total from the weight loaded on one side
#[wasm_bindgen]
pub fn total_from_per_side(per_side: f64, bar_weight: f64) -> f64 {
    match (Decimal::try_from(per_side), Decimal::try_from(bar_weight)) {
        (Ok(per_side), Ok(bar)) => to_f64(plates::total_from_per_side(per_side, bar)),
        _ => per_side * 2.0 + bar_weight,
    }
}

/// "MM:SS" for a number of seconds
#[wasm_bindgen]
pub fn format_clock(total_seconds: u32) -> String {
    neurolift_shared::format_clock(u64::from(total_seconds))
}

/// Weight to suggest after a session averaging `avg_weight` × `avg_reps`.
///
/// Low-rep sessions keep the weight (the hint is to add a rep instead).
#[wasm_bindgen]
pub fn suggest_next_weight(avg_weight: f64, avg_reps: f64, increment: f64) -> f64 {
    let increment = if increment.is_finite() && increment > 0.0 {
        increment
    } else {
        DEFAULT_INCREMENT
    };
    if avg_reps < LOW_REP_THRESHOLD {
        return avg_weight;
    }
    next_weight(avg_weight, increment)
}
