//! Per-collection sync bookkeeping

use super::documents::{from_millis, to_millis, Collection};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Sync status row from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncStatusRecord {
    pub collection: String,
    pub last_sync_at: i64,
    pub sync_count: i64,
}

impl SyncStatusRecord {
    pub fn last_sync_at(&self) -> Option<DateTime<Utc>> {
        from_millis(self.last_sync_at)
    }
}

/// Sync status repository for database operations
pub struct SyncStatusRepository;

impl SyncStatusRepository {
    /// When the collection last synced successfully, `None` if never
    pub async fn last_sync_at(pool: &SqlitePool, collection: Collection) -> Result<Option<DateTime<Utc>>> {
        Ok(Self::get(pool, collection)
            .await?
            .and_then(|record| record.last_sync_at()))
    }

    pub async fn get(pool: &SqlitePool, collection: Collection) -> Result<Option<SyncStatusRecord>> {
        let record = sqlx::query_as::<_, SyncStatusRecord>(
            "SELECT collection, last_sync_at, sync_count FROM sync_status WHERE collection = ?1",
        )
        .bind(collection.as_str())
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Record a successful sync at `at`
    pub async fn record_sync(pool: &SqlitePool, collection: Collection, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sync_status (collection, last_sync_at, sync_count)
            VALUES (?1, ?2, 1)
            ON CONFLICT (collection) DO UPDATE SET
                last_sync_at = excluded.last_sync_at,
                sync_count = sync_status.sync_count + 1
            "#,
        )
        .bind(collection.as_str())
        .bind(to_millis(at))
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Forget all sync history so the next sync pushes everything
    pub async fn clear(pool: &SqlitePool) -> Result<()> {
        sqlx::query("DELETE FROM sync_status").execute(pool).await?;
        Ok(())
    }
}
