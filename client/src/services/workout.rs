//! Workout history service
//!
//! Provides business logic for finished workouts:
//! - Saving a workout and refreshing per-exercise history
//! - History listing and deletion (tombstones)
//! - Progressive-overload suggestions and profile statistics

use crate::error::{ClientError, ClientResult};
use crate::repositories::{history_key, Collection, DocumentRepository, SettingsRepository, HISTORY_PREFIX};
use crate::state::AppState;
use chrono::{DateTime, Utc};
use neurolift_shared::overload::{suggest, update_histories};
use neurolift_shared::stats::{volume_trend, VolumePoint};
use neurolift_shared::{live, CompletedWorkout, ExerciseHistory, OverloadSuggestion, ProfileStats};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Workout service for business logic
pub struct WorkoutService;

impl WorkoutService {
    /// Store a finished workout and fold it into each exercise's history
    pub async fn save_completed(
        pool: &SqlitePool,
        mut workout: CompletedWorkout,
        now: DateTime<Utc>,
    ) -> ClientResult<CompletedWorkout> {
        workout.updated_at = Some(now);
        workout.deleted_at = None;

        DocumentRepository::save(pool, Collection::Workouts, &workout).await?;

        let mut existing = HashMap::new();
        for exercise in &workout.exercises {
            if existing.contains_key(&exercise.name) {
                continue;
            }
            if let Some(history) = Self::exercise_history(pool, &exercise.name).await? {
                existing.insert(exercise.name.clone(), history);
            }
        }

        for history in update_histories(&existing, &workout) {
            SettingsRepository::set_json(pool, &history_key(&history.exercise_name), &history).await?;
        }

        info!(
            workout_id = %workout.id,
            exercises = workout.exercises.len(),
            volume = workout.total_volume,
            "Workout saved"
        );
        Ok(workout)
    }

    /// Live workouts, newest date first
    pub async fn history(pool: &SqlitePool) -> ClientResult<Vec<CompletedWorkout>> {
        let all: Vec<CompletedWorkout> = DocumentRepository::load_all(pool, Collection::Workouts).await?;
        let mut workouts = live(&all);
        workouts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.updated_at.cmp(&a.updated_at)));
        Ok(workouts)
    }

    /// Tombstone a workout so the deletion syncs
    pub async fn delete(pool: &SqlitePool, id: &str, now: DateTime<Utc>) -> ClientResult<()> {
        let mut workout: CompletedWorkout = DocumentRepository::load(pool, Collection::Workouts, id)
            .await?
            .filter(|w: &CompletedWorkout| w.deleted_at.is_none())
            .ok_or_else(|| ClientError::NotFound(format!("workout {}", id)))?;

        workout.deleted_at = Some(now);
        workout.updated_at = Some(now);
        DocumentRepository::save(pool, Collection::Workouts, &workout).await?;

        debug!(workout_id = %id, "Workout deleted");
        Ok(())
    }

    /// Last session and records for an exercise
    pub async fn exercise_history(pool: &SqlitePool, name: &str) -> ClientResult<Option<ExerciseHistory>> {
        let history: Option<ExerciseHistory> = SettingsRepository::get_parsed(pool, &history_key(name), None).await?;
        Ok(history)
    }

    /// Every stored exercise history, ordered by exercise name
    pub async fn exercise_histories(pool: &SqlitePool) -> ClientResult<Vec<ExerciseHistory>> {
        let rows = SettingsRepository::list_prefixed(pool, HISTORY_PREFIX).await?;
        Ok(rows
            .into_iter()
            .filter_map(|(key, raw)| match serde_json::from_str(&raw) {
                Ok(history) => Some(history),
                Err(e) => {
                    warn!(key = %key, error = %e, "Skipping unreadable exercise history");
                    None
                }
            })
            .collect())
    }

    /// Suggested sets for the next session of an exercise
    pub async fn suggestion(state: &AppState, name: &str) -> ClientResult<Option<OverloadSuggestion>> {
        let training = &state.config().training;
        let history = Self::exercise_history(state.db(), name).await?;
        Ok(history.and_then(|h| suggest(&h, training.overload_increment, training.weight_unit)))
    }

    pub async fn stats(pool: &SqlitePool) -> ClientResult<ProfileStats> {
        let workouts = Self::history(pool).await?;
        Ok(ProfileStats::from_workouts(&workouts))
    }

    /// Volume of the most recent workouts, oldest first
    pub async fn volume_trend(pool: &SqlitePool) -> ClientResult<Vec<VolumePoint>> {
        let workouts = Self::history(pool).await?;
        Ok(volume_trend(&workouts))
    }
}
