//! Common test utilities for integration tests
//!
//! Every test gets its own in-memory SQLite database with migrations applied
//! and an in-memory remote store it can inspect or take offline.

#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use neurolift_client::{
    config::AppConfig,
    db,
    remote::{MemoryRemoteStore, RemoteStore},
    state::AppState,
};
use neurolift_shared::{ActiveExercise, CompletedWorkout, WorkoutSet};
use std::sync::Arc;

pub const TEST_USER: &str = "test-user";

/// Test application wrapper
pub struct TestApp {
    pub state: AppState,
    pub remote: MemoryRemoteStore,
}

impl TestApp {
    /// Create a test application with sync configured for `TEST_USER`
    pub async fn new() -> Self {
        Self::with_config(test_config(Some(TEST_USER))).await
    }

    /// Create a test application with no user id, so sync is skipped
    pub async fn without_user() -> Self {
        Self::with_config(test_config(None)).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let pool = db::create_pool("sqlite::memory:", 1)
            .await
            .expect("Failed to create test database pool");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let remote = MemoryRemoteStore::new();
        let shared: Arc<dyn RemoteStore> = Arc::new(remote.clone());
        let state = AppState::new(pool, config, shared);

        Self { state, remote }
    }

    /// A second device: its own database, the same remote store
    pub async fn second_device(&self) -> Self {
        let pool = db::create_pool("sqlite::memory:", 1)
            .await
            .expect("Failed to create test database pool");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let shared: Arc<dyn RemoteStore> = Arc::new(self.remote.clone());
        let state = AppState::new(pool, self.state.config().clone(), shared);

        Self {
            state,
            remote: self.remote.clone(),
        }
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        self.state.db()
    }
}

pub fn test_config(user_id: Option<&str>) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.database_url = "sqlite::memory:".to_string();
    config.remote.user_id = user_id.map(str::to_string);
    config
}

/// A fixed instant, offset by whole minutes
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

pub fn set(weight: f64, reps: u32, completed: bool) -> WorkoutSet {
    WorkoutSet {
        id: neurolift_shared::new_id(),
        weight,
        reps,
        completed,
    }
}

/// A finished workout with the given exercises; volume counts completed sets
pub fn workout(date: NaiveDate, exercises: Vec<(&str, Vec<WorkoutSet>)>) -> CompletedWorkout {
    let exercises: Vec<ActiveExercise> = exercises
        .into_iter()
        .map(|(name, sets)| ActiveExercise {
            name: name.to_string(),
            sets,
        })
        .collect();

    CompletedWorkout {
        id: neurolift_shared::new_id(),
        date,
        duration_seconds: 1800,
        total_volume: neurolift_shared::workout_volume(&exercises),
        exercises,
        updated_at: None,
        deleted_at: None,
    }
}
