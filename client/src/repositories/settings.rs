//! Settings repository: a small key-value table for preferences and
//! per-exercise history

use anyhow::Result;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;
use tracing::warn;

/// Training goal picked during onboarding
pub const KEY_GOAL: &str = "goal";
/// Metric or imperial
pub const KEY_UNITS: &str = "units";
/// Calorie tracker state
pub const KEY_CALORIES: &str = "calories";
/// Prefix of per-exercise history keys
pub const HISTORY_PREFIX: &str = "history_";

/// Settings key holding an exercise's history
pub fn history_key(exercise_name: &str) -> String {
    format!("{}{}", HISTORY_PREFIX, exercise_name)
}

/// Settings repository for database operations
pub struct SettingsRepository;

impl SettingsRepository {
    /// Raw value of a key
    pub async fn get_item(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(pool)
            .await?;

        Ok(value)
    }

    /// Set a raw value
    pub async fn set_item(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp_millis())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Delete a key. Returns false when it was not set.
    pub async fn remove_item(pool: &SqlitePool, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM settings WHERE key = ?1")
            .bind(key)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Decode a JSON value, falling back when it is missing or unreadable
    pub async fn get_parsed<T: DeserializeOwned>(pool: &SqlitePool, key: &str, fallback: T) -> Result<T> {
        let Some(raw) = Self::get_item(pool, key).await? else {
            return Ok(fallback);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key = key, error = %e, "Unreadable setting, using fallback");
                Ok(fallback)
            }
        }
    }

    /// Store a value as JSON
    pub async fn set_json<T: Serialize>(pool: &SqlitePool, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        Self::set_item(pool, key, &raw).await
    }

    /// Every key starting with `prefix`, with its raw value
    pub async fn list_prefixed(pool: &SqlitePool, prefix: &str) -> Result<Vec<(String, String)>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT key, value FROM settings
            WHERE substr(key, 1, ?1) = ?2
            ORDER BY key
            "#,
        )
        .bind(prefix.chars().count() as i64)
        .bind(prefix)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}
