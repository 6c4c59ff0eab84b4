//! Profile service: training goal, unit system and lifetime stats

use crate::error::ClientResult;
use crate::repositories::{SettingsRepository, KEY_GOAL, KEY_UNITS};
use crate::services::WorkoutService;
use neurolift_shared::{ProfileStats, TrainingGoal, UnitSystem};
use sqlx::SqlitePool;
use tracing::warn;

/// Profile service for business logic
pub struct ProfileService;

impl ProfileService {
    pub async fn set_goal(pool: &SqlitePool, goal: TrainingGoal) -> ClientResult<()> {
        SettingsRepository::set_item(pool, KEY_GOAL, goal.as_str()).await?;
        Ok(())
    }

    /// The chosen goal, `None` before onboarding
    pub async fn goal(pool: &SqlitePool) -> ClientResult<Option<TrainingGoal>> {
        let Some(raw) = SettingsRepository::get_item(pool, KEY_GOAL).await? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(goal) => Ok(Some(goal)),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable goal");
                Ok(None)
            }
        }
    }

    pub async fn set_units(pool: &SqlitePool, units: UnitSystem) -> ClientResult<()> {
        SettingsRepository::set_item(pool, KEY_UNITS, units.as_str()).await?;
        Ok(())
    }

    /// The chosen unit system, metric when unset
    pub async fn units(pool: &SqlitePool) -> ClientResult<UnitSystem> {
        let Some(raw) = SettingsRepository::get_item(pool, KEY_UNITS).await? else {
            return Ok(UnitSystem::Metric);
        };
        match raw.parse() {
            Ok(units) => Ok(units),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable unit system");
                Ok(UnitSystem::Metric)
            }
        }
    }

    pub async fn stats(pool: &SqlitePool) -> ClientResult<ProfileStats> {
        WorkoutService::stats(pool).await
    }
}
