//! Body-measurement journal service

use crate::error::ClientResult;
use crate::repositories::{Collection, DocumentRepository};
use chrono::{DateTime, NaiveDate, Utc};
use neurolift_shared::journal::{self, JournalDraft};
use neurolift_shared::JournalEntry;
use sqlx::SqlitePool;
use tracing::debug;

/// Journal service for business logic
pub struct JournalService;

impl JournalService {
    /// Visible entries, newest date first
    pub async fn list(pool: &SqlitePool) -> ClientResult<Vec<JournalEntry>> {
        let entries = Self::load(pool).await?;
        let mut visible: Vec<JournalEntry> = journal::visible(&entries).into_iter().cloned().collect();
        visible.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.updated_at.cmp(&a.updated_at)));
        Ok(visible)
    }

    pub async fn create(
        pool: &SqlitePool,
        draft: JournalDraft,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> ClientResult<JournalEntry> {
        let mut entries = Vec::new();
        let entry = journal::create(&mut entries, draft, today, now)?;
        DocumentRepository::save(pool, Collection::Journal, &entry).await?;

        debug!(entry_id = %entry.id, "Journal entry created");
        Ok(entry)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        draft: JournalDraft,
        now: DateTime<Utc>,
    ) -> ClientResult<JournalEntry> {
        let mut entries = Self::load(pool).await?;
        let entry = journal::update(&mut entries, id, draft, now)?;
        DocumentRepository::save(pool, Collection::Journal, &entry).await?;
        Ok(entry)
    }

    /// Tombstone an entry so the deletion syncs
    pub async fn delete(pool: &SqlitePool, id: &str, now: DateTime<Utc>) -> ClientResult<()> {
        let mut entries = Self::load(pool).await?;
        journal::delete(&mut entries, id, now)?;
        if let Some(entry) = entries.iter().find(|e| e.id == id) {
            DocumentRepository::save(pool, Collection::Journal, entry).await?;
        }

        debug!(entry_id = %id, "Journal entry deleted");
        Ok(())
    }

    async fn load(pool: &SqlitePool) -> ClientResult<Vec<JournalEntry>> {
        Ok(DocumentRepository::load_all(pool, Collection::Journal).await?)
    }
}
