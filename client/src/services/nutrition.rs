//! Calorie tracking service
//!
//! The tracker is a single settings value. Every read rolls it over to the
//! caller's date first so a new day always starts at zero.

use crate::error::ClientResult;
use crate::repositories::{SettingsRepository, KEY_CALORIES};
use chrono::NaiveDate;
use neurolift_shared::nutrition::CalorieTracker;
use sqlx::SqlitePool;
use tracing::info;

/// Nutrition service for business logic
pub struct NutritionService;

impl NutritionService {
    /// Today's tracker, archiving the previous day when the date changed
    pub async fn today(pool: &SqlitePool, today: NaiveDate) -> ClientResult<CalorieTracker> {
        let mut tracker: CalorieTracker =
            SettingsRepository::get_parsed(pool, KEY_CALORIES, CalorieTracker::new()).await?;

        let stamped = tracker.date.is_none();
        if tracker.roll_over(today) {
            info!(date = %today, "Calorie day rolled over");
            Self::store(pool, &tracker).await?;
        } else if stamped {
            Self::store(pool, &tracker).await?;
        }
        Ok(tracker)
    }

    /// Add calories from form input; unparsable input leaves the tracker unchanged
    pub async fn add(pool: &SqlitePool, raw: &str, today: NaiveDate) -> ClientResult<CalorieTracker> {
        let mut tracker = Self::today(pool, today).await?;
        tracker.add(raw)?;
        Self::store(pool, &tracker).await?;
        Ok(tracker)
    }

    pub async fn reset_day(pool: &SqlitePool, today: NaiveDate) -> ClientResult<CalorieTracker> {
        let mut tracker = Self::today(pool, today).await?;
        tracker.reset_day();
        Self::store(pool, &tracker).await?;
        Ok(tracker)
    }

    async fn store(pool: &SqlitePool, tracker: &CalorieTracker) -> ClientResult<()> {
        SettingsRepository::set_json(pool, KEY_CALORIES, tracker).await?;
        Ok(())
    }
}
