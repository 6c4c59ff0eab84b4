//! Daily calorie tracking
//!
//! One running total for the current day plus a week of past days. The first
//! time the tracker sees a new date it archives the previous day.

use crate::errors::{DomainError, DomainResult};
use crate::models::DailyCalorieLog;
use crate::validation::validate_calorie_delta;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Past days kept in the history
pub const HISTORY_DAYS: usize = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieTracker {
    /// Day the running total belongs to; `None` before first use
    pub date: Option<NaiveDate>,
    pub calories: i64,
    /// Newest first
    #[serde(default)]
    pub history: Vec<DailyCalorieLog>,
}

impl CalorieTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `today`, archiving the previous day if the date changed.
    ///
    /// Returns true when a day was archived.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        match self.date {
            Some(date) if date == today => false,
            Some(date) => {
                self.history.insert(
                    0,
                    DailyCalorieLog {
                        date,
                        calories: self.calories,
                    },
                );
                self.history.truncate(HISTORY_DAYS);
                self.calories = 0;
                self.date = Some(today);
                true
            }
            None => {
                self.date = Some(today);
                false
            }
        }
    }

    /// Add calories from form input. Negative amounts correct earlier entries.
    ///
    /// The day's total never drops below zero.
    pub fn add(&mut self, raw: &str) -> DomainResult<i64> {
        let amount = parse_calories(raw).ok_or_else(|| {
            DomainError::Validation(format!("Calories must be a whole number, got '{}'", raw.trim()))
        })?;
        validate_calorie_delta(amount).map_err(DomainError::Validation)?;

        self.calories = self.calories.saturating_add(amount).max(0);
        Ok(self.calories)
    }

    /// Zero today's total
    pub fn reset_day(&mut self) {
        self.calories = 0;
    }

    /// Average of the archived days, `None` when there are none
    pub fn weekly_average(&self) -> Option<i64> {
        if self.history.is_empty() {
            return None;
        }
        let total: i64 = self.history.iter().map(|d| d.calories).sum();
        Some((total as f64 / self.history.len() as f64).round() as i64)
    }
}

/// Whole calories from input; a fractional part is dropped
fn parse_calories(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() < i64::MAX as f64)
        .map(|v| v.trunc() as i64)
}
