//! Data export service
//!
//! Supports two formats:
//! - JSON: everything the app stores, structured
//! - CSV: workout history with one row per set, for spreadsheets

use crate::error::{ClientError, ClientResult};
use crate::repositories::{SettingsRepository, KEY_CALORIES};
use crate::services::{JournalService, ProfileService, TemplateService, WorkoutService};
use chrono::{DateTime, Utc};
use neurolift_shared::nutrition::CalorieTracker;
use neurolift_shared::{
    CompletedWorkout, ExerciseHistory, JournalEntry, TrainingGoal, UnitSystem, WorkoutTemplate,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

pub const EXPORT_VERSION: &str = "1.0";

/// Complete data export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataExport {
    pub export_version: String,
    pub exported_at: DateTime<Utc>,
    pub goal: Option<TrainingGoal>,
    pub units: UnitSystem,
    pub workouts: Vec<CompletedWorkout>,
    pub journal: Vec<JournalEntry>,
    pub templates: Vec<WorkoutTemplate>,
    pub exercise_histories: Vec<ExerciseHistory>,
    pub calories: CalorieTracker,
}

/// One set of one exercise of one workout
#[derive(Debug, Clone, Serialize)]
struct SetCsvRow {
    date: String,
    workout_id: String,
    duration_seconds: u64,
    exercise: String,
    set_number: usize,
    weight: f64,
    reps: u32,
    completed: bool,
    volume: f64,
}

/// Data export service
pub struct ExportService;

impl ExportService {
    /// Export all stored data
    pub async fn export(pool: &SqlitePool, now: DateTime<Utc>) -> ClientResult<DataExport> {
        let (workouts, journal, templates, histories) = tokio::join!(
            WorkoutService::history(pool),
            JournalService::list(pool),
            TemplateService::list(pool),
            WorkoutService::exercise_histories(pool),
        );
        let calories: CalorieTracker = SettingsRepository::get_parsed(pool, KEY_CALORIES, CalorieTracker::new()).await?;

        Ok(DataExport {
            export_version: EXPORT_VERSION.to_string(),
            exported_at: now,
            goal: ProfileService::goal(pool).await?,
            units: ProfileService::units(pool).await?,
            workouts: workouts?,
            journal: journal?,
            templates: templates?,
            exercise_histories: histories?,
            calories,
        })
    }

    /// Export all stored data as pretty-printed JSON
    pub async fn export_json(pool: &SqlitePool, now: DateTime<Utc>) -> ClientResult<String> {
        let export = Self::export(pool, now).await?;
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Export workout history as CSV, one row per set
    pub async fn export_workouts_csv(pool: &SqlitePool) -> ClientResult<String> {
        let workouts = WorkoutService::history(pool).await?;

        let rows: Vec<SetCsvRow> = workouts
            .iter()
            .flat_map(|w| {
                w.exercises.iter().flat_map(move |exercise| {
                    exercise.sets.iter().enumerate().map(move |(i, set)| SetCsvRow {
                        date: w.date.format("%Y-%m-%d").to_string(),
                        workout_id: w.id.clone(),
                        duration_seconds: w.duration_seconds,
                        exercise: exercise.name.clone(),
                        set_number: i + 1,
                        weight: set.weight,
                        reps: set.reps,
                        completed: set.completed,
                        volume: set.volume(),
                    })
                })
            })
            .collect();

        Self::to_csv(&rows)
    }

    /// Convert data to CSV string
    fn to_csv<T: Serialize>(data: &[T]) -> ClientResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| ClientError::Internal(anyhow::anyhow!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| ClientError::Internal(anyhow::anyhow!("CSV flush error: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| ClientError::Internal(anyhow::anyhow!("CSV encoding error: {}", e)))
    }
}
