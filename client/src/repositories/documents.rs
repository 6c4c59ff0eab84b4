//! Document repository for the local store
//!
//! Every synced record lives in `documents` as camelCase JSON, keyed by
//! collection and id. Timestamps are stored as epoch milliseconds.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use neurolift_shared::SyncRecord;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use tracing::warn;

/// Named group of documents, mirrored one-to-one in the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Workouts,
    Journal,
    Templates,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Workouts, Collection::Journal, Collection::Templates];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Workouts => "workouts",
            Collection::Journal => "journal",
            Collection::Templates => "templates",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workouts" => Ok(Collection::Workouts),
            "journal" => Ok(Collection::Journal),
            "templates" => Ok(Collection::Templates),
            _ => Err(format!("Unknown collection: {}", s)),
        }
    }
}

/// Document row from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRecord {
    pub collection: String,
    pub id: String,
    pub body: String,
    pub updated_at: Option<i64>,
    pub deleted_at: Option<i64>,
}

impl DocumentRecord {
    /// Decode the body into a record type
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .with_context(|| format!("Corrupt document {}/{}", self.collection, self.id))
    }
}

/// A document to write
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: String,
    pub body: serde_json::Value,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl NewDocument {
    /// Snapshot a record for storage
    pub fn from_record<T: SyncRecord + Serialize>(record: &T) -> Result<Self> {
        Ok(Self {
            id: record.id().to_string(),
            body: serde_json::to_value(record)?,
            updated_at: record.updated_at(),
            deleted_at: record.deleted_at(),
        })
    }
}

pub fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Document repository for database operations
pub struct DocumentRepository;

impl DocumentRepository {
    /// Insert or replace a document
    pub async fn upsert(pool: &SqlitePool, collection: Collection, doc: &NewDocument) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, updated_at, deleted_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (collection, id) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at,
                deleted_at = excluded.deleted_at
            "#,
        )
        .bind(collection.as_str())
        .bind(&doc.id)
        .bind(doc.body.to_string())
        .bind(doc.updated_at.map(to_millis))
        .bind(doc.deleted_at.map(to_millis))
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get a document by id
    pub async fn get(pool: &SqlitePool, collection: Collection, id: &str) -> Result<Option<DocumentRecord>> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            r#"
            SELECT collection, id, body, updated_at, deleted_at
            FROM documents
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// All documents of a collection, most recently updated first
    pub async fn list(pool: &SqlitePool, collection: Collection) -> Result<Vec<DocumentRecord>> {
        let records = sqlx::query_as::<_, DocumentRecord>(
            r#"
            SELECT collection, id, body, updated_at, deleted_at
            FROM documents
            WHERE collection = ?1
            ORDER BY updated_at DESC, id ASC
            "#,
        )
        .bind(collection.as_str())
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Documents updated at or after `since`; everything when `since` is `None`
    pub async fn list_changed_since(
        pool: &SqlitePool,
        collection: Collection,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<DocumentRecord>> {
        let Some(since) = since else {
            return Self::list(pool, collection).await;
        };

        let records = sqlx::query_as::<_, DocumentRecord>(
            r#"
            SELECT collection, id, body, updated_at, deleted_at
            FROM documents
            WHERE collection = ?1 AND updated_at >= ?2
            ORDER BY updated_at DESC, id ASC
            "#,
        )
        .bind(collection.as_str())
        .bind(to_millis(since))
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Replace a whole collection in one transaction
    pub async fn replace_all(pool: &SqlitePool, collection: Collection, docs: &[NewDocument]) -> Result<()> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM documents WHERE collection = ?1")
            .bind(collection.as_str())
            .execute(&mut *tx)
            .await?;

        for doc in docs {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO documents (collection, id, body, updated_at, deleted_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(collection.as_str())
            .bind(&doc.id)
            .bind(doc.body.to_string())
            .bind(doc.updated_at.map(to_millis))
            .bind(doc.deleted_at.map(to_millis))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Remove a document outright. Returns false when it did not exist.
    pub async fn delete_hard(pool: &SqlitePool, collection: Collection, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection.as_str())
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Store a typed record
    pub async fn save<T: SyncRecord + Serialize>(pool: &SqlitePool, collection: Collection, record: &T) -> Result<()> {
        let doc = NewDocument::from_record(record)?;
        Self::upsert(pool, collection, &doc).await
    }

    /// Load a typed record
    pub async fn load<T: DeserializeOwned>(pool: &SqlitePool, collection: Collection, id: &str) -> Result<Option<T>> {
        match Self::get(pool, collection, id).await? {
            Some(record) => Ok(Some(record.parse()?)),
            None => Ok(None),
        }
    }

    /// Load every record of a collection. Corrupt rows are skipped with a warning.
    pub async fn load_all<T: DeserializeOwned>(pool: &SqlitePool, collection: Collection) -> Result<Vec<T>> {
        let records = Self::list(pool, collection).await?;
        Ok(records
            .iter()
            .filter_map(|record| match record.parse() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(collection = %collection, id = %record.id, error = %e, "Skipping unreadable document");
                    None
                }
            })
            .collect())
    }
}
