//! Training statistics

use crate::models::{ActiveExercise, CompletedWorkout};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Workouts shown on the volume chart
pub const TREND_WINDOW: usize = 10;

/// Volume over completed sets only
pub fn workout_volume(exercises: &[ActiveExercise]) -> f64 {
    exercises
        .iter()
        .flat_map(|e| e.sets.iter())
        .filter(|s| s.completed)
        .map(|s| s.volume())
        .sum()
}

/// Profile header numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_workouts: usize,
    pub total_volume: f64,
    /// Rounded to a whole number, 0 without workouts
    pub average_volume: i64,
}

impl ProfileStats {
    pub fn from_workouts(workouts: &[CompletedWorkout]) -> Self {
        let total_workouts = workouts.len();
        let total_volume: f64 = workouts.iter().map(|w| w.total_volume).sum();
        let average_volume = if total_workouts == 0 {
            0
        } else {
            (total_volume / total_workouts as f64).round() as i64
        };

        Self {
            total_workouts,
            total_volume,
            average_volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumePoint {
    pub date: NaiveDate,
    pub total_volume: f64,
}

/// The most recent workouts, oldest first, for charting.
///
/// `history` is newest first. Fewer than two workouts make no trend.
pub fn volume_trend(history: &[CompletedWorkout]) -> Vec<VolumePoint> {
    if history.len() < 2 {
        return Vec::new();
    }
    history
        .iter()
        .take(TREND_WINDOW)
        .rev()
        .map(|w| VolumePoint {
            date: w.date,
            total_volume: w.total_volume,
        })
        .collect()
}
