//! Data models for the NeuroLift application
//!
//! Records serialize to camelCase JSON, which is also the document format
//! used by the remote store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh record id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Workouts
// ============================================================================

/// A single set of an exercise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub id: String,
    pub weight: f64,
    pub reps: u32,
    pub completed: bool,
}

impl WorkoutSet {
    /// An empty, not yet completed set
    pub fn empty() -> Self {
        Self {
            id: new_id(),
            weight: 0.0,
            reps: 0,
            completed: false,
        }
    }

    /// Volume of this set (weight x reps)
    pub fn volume(&self) -> f64 {
        self.weight * self.reps as f64
    }
}

/// An exercise in a live or completed session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveExercise {
    pub name: String,
    pub sets: Vec<WorkoutSet>,
}

impl ActiveExercise {
    /// A new exercise with one empty set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sets: vec![WorkoutSet::empty()],
        }
    }
}

/// A finished workout as stored in history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedWorkout {
    pub id: String,
    pub date: NaiveDate,
    pub duration_seconds: u64,
    pub exercises: Vec<ActiveExercise>,
    pub total_volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A saved list of exercises to start a session from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
    pub exercises: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl WorkoutTemplate {
    /// Create a template stamped at `now`
    pub fn new(name: impl Into<String>, exercises: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            exercises,
            created_at: now,
            updated_at: Some(now),
            deleted_at: None,
        }
    }
}

// ============================================================================
// Journal
// ============================================================================

/// Standard tape and scale measurements. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BodyMeasurements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neck: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoulders: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chest: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biceps_left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biceps_right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forearms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hips: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thigh_left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thigh_right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calves: Option<f64>,
}

impl BodyMeasurements {
    /// Field names paired with their values, in form order
    pub fn fields(&self) -> [(&'static str, Option<f64>); 12] {
        [
            ("weight", self.weight),
            ("neck", self.neck),
            ("shoulders", self.shoulders),
            ("chest", self.chest),
            ("biceps_left", self.biceps_left),
            ("biceps_right", self.biceps_right),
            ("forearms", self.forearms),
            ("waist", self.waist),
            ("hips", self.hips),
            ("thigh_left", self.thigh_left),
            ("thigh_right", self.thigh_right),
            ("calves", self.calves),
        ]
    }

    /// Overwrite every field that is set in `other`
    pub fn merge_from(&mut self, other: &BodyMeasurements) {
        fn take(slot: &mut Option<f64>, value: Option<f64>) {
            if value.is_some() {
                *slot = value;
            }
        }
        take(&mut self.weight, other.weight);
        take(&mut self.neck, other.neck);
        take(&mut self.shoulders, other.shoulders);
        take(&mut self.chest, other.chest);
        take(&mut self.biceps_left, other.biceps_left);
        take(&mut self.biceps_right, other.biceps_right);
        take(&mut self.forearms, other.forearms);
        take(&mut self.waist, other.waist);
        take(&mut self.hips, other.hips);
        take(&mut self.thigh_left, other.thigh_left);
        take(&mut self.thigh_right, other.thigh_right);
        take(&mut self.calves, other.calves);
    }

    /// True when no measurement is recorded
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, v)| v.is_none())
    }
}

/// A user-defined measurement (name, value, unit)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomMeasurement {
    pub id: String,
    pub name: String,
    pub value: f64,
    pub unit: String,
}

/// A body-measurement journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub measurements: BodyMeasurements,
    #[serde(default)]
    pub custom_measurements: Vec<CustomMeasurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Nutrition
// ============================================================================

/// Calories eaten on one past day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyCalorieLog {
    pub date: NaiveDate,
    pub calories: i64,
}

// ============================================================================
// Exercise history
// ============================================================================

/// Best values ever recorded for an exercise
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub max_weight: f64,
    pub max_reps: u32,
    pub max_volume: f64,
}

/// Last session and records for one exercise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseHistory {
    pub exercise_name: String,
    pub last_performed: NaiveDate,
    pub last_sets: Vec<WorkoutSet>,
    pub personal_record: PersonalRecord,
}

// ============================================================================
// Profile
// ============================================================================

/// Training goal picked during onboarding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrainingGoal {
    Strength,
    Hypertrophy,
    Endurance,
}

impl TrainingGoal {
    /// Stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingGoal::Strength => "strength",
            TrainingGoal::Hypertrophy => "hypertrophy",
            TrainingGoal::Endurance => "endurance",
        }
    }
}

impl std::str::FromStr for TrainingGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strength" => Ok(TrainingGoal::Strength),
            "hypertrophy" => Ok(TrainingGoal::Hypertrophy),
            "endurance" => Ok(TrainingGoal::Endurance),
            _ => Err(format!("Unknown training goal: {}", s)),
        }
    }
}
