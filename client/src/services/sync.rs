//! Local-first sync with the remote document store
//!
//! Each collection syncs independently:
//! 1. Push every local document changed since the last successful sync.
//!    Under last-write-wins a document is held back when the cloud already
//!    holds a copy the merge would prefer.
//! 2. Pull the cloud copy and merge it with the local one by id
//! 3. Write back local copies that won over a different cloud copy
//! 4. Record the sync time captured before step 1
//!
//! Local data is only rewritten after a successful pull, so an unreachable
//! remote never touches it.

use crate::error::{ClientError, ClientResult};
use crate::repositories::documents::from_millis;
use crate::repositories::{Collection, DocumentRepository, NewDocument, SyncStatusRepository};
use crate::state::AppState;
use chrono::{DateTime, Utc};
use metrics::counter;
use neurolift_shared::{
    merge_with_report, CompletedWorkout, JournalEntry, MergePolicy, MergeReport, SyncRecord, WorkoutTemplate,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Cloud `updatedAt` of each remote document, by id
type CloudStamps = HashMap<String, Option<DateTime<Utc>>>;

/// `updatedAt` of a document body; missing or unreadable counts as none
fn stamp_of(body: &Value) -> Option<DateTime<Utc>> {
    body.get("updatedAt")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn cloud_stamps(documents: &[Value]) -> CloudStamps {
    documents
        .iter()
        .filter_map(|doc| {
            let id = doc.get("id")?.as_str()?;
            Some((id.to_string(), stamp_of(doc)))
        })
        .collect()
}

/// Result of pulling one collection
struct Pulled {
    count: usize,
    merge: MergeReport,
    /// Local copies that beat a different cloud copy
    write_back: Vec<NewDocument>,
}

/// Outcome of syncing one collection
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSync {
    #[serde(serialize_with = "serialize_collection")]
    pub collection: Collection,
    pub pushed: usize,
    pub push_failures: usize,
    pub pulled: usize,
    pub merge: MergeReport,
    /// Pull or bookkeeping error; local data is untouched when set
    pub error: Option<String>,
}

impl CollectionSync {
    fn new(collection: Collection) -> Self {
        Self {
            collection,
            pushed: 0,
            push_failures: 0,
            pulled: 0,
            merge: MergeReport::default(),
            error: None,
        }
    }

    /// Pushed and pulled without errors
    pub fn is_clean(&self) -> bool {
        self.push_failures == 0 && self.error.is_none()
    }
}

fn serialize_collection<S: serde::Serializer>(collection: &Collection, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(collection.as_str())
}

/// Outcome of a full sync
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    /// Why nothing was attempted, e.g. no user id configured
    pub skipped: Option<String>,
    pub collections: Vec<CollectionSync>,
}

impl SyncReport {
    fn skipped(started_at: DateTime<Utc>, reason: &str) -> Self {
        Self {
            started_at,
            skipped: Some(reason.to_string()),
            collections: Vec::new(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    /// Every collection synced cleanly
    pub fn is_success(&self) -> bool {
        self.skipped.is_none() && self.collections.iter().all(CollectionSync::is_clean)
    }

    pub fn pushed(&self) -> usize {
        self.collections.iter().map(|c| c.pushed).sum()
    }

    pub fn pulled(&self) -> usize {
        self.collections.iter().map(|c| c.pulled).sum()
    }

    /// First error encountered, if any
    pub fn first_error(&self) -> Option<&str> {
        self.collections.iter().find_map(|c| c.error.as_deref())
    }
}

/// Sync service for business logic
pub struct SyncService;

impl SyncService {
    /// Push then pull every collection and record the sync.
    ///
    /// Skipped (not an error) when no user id is configured.
    pub async fn sync(state: &AppState) -> ClientResult<SyncReport> {
        let now = Utc::now();
        let Some(user_id) = state.sync_user() else {
            debug!("Sync skipped: no user configured");
            return Ok(SyncReport::skipped(now, "no user id configured"));
        };

        let mut collections = Vec::with_capacity(Collection::ALL.len());
        for collection in Collection::ALL {
            let mut outcome = CollectionSync::new(collection);

            if let Err(e) = Self::sync_collection(state, user_id, collection, &mut outcome).await {
                warn!(collection = %collection, error = %e, "Sync failed, local data untouched");
                outcome.error = Some(e.to_string());
            }

            // Failed pushes stay "changed since last sync" and retry next time
            if outcome.is_clean() {
                SyncStatusRepository::record_sync(state.db(), collection, now).await?;
            } else {
                counter!("neurolift_sync_failures_total", "collection" => collection.as_str()).increment(1);
            }
            collections.push(outcome);
        }

        let report = SyncReport {
            started_at: now,
            skipped: None,
            collections,
        };
        info!(
            pushed = report.pushed(),
            pulled = report.pulled(),
            success = report.is_success(),
            "Sync finished"
        );
        Ok(report)
    }

    /// Upload local changes of every collection without pulling
    pub async fn push_all(state: &AppState) -> ClientResult<Vec<CollectionSync>> {
        let user_id = state
            .sync_user()
            .ok_or_else(|| ClientError::InvalidState("sync is not configured".to_string()))?;

        let mut results = Vec::with_capacity(Collection::ALL.len());
        for collection in Collection::ALL {
            let cloud = Self::cloud_stamps_for_push(state, user_id, collection).await?;
            let (pushed, failures) = Self::push_collection(state, user_id, collection, cloud.as_ref()).await?;
            results.push(CollectionSync {
                pushed,
                push_failures: failures,
                ..CollectionSync::new(collection)
            });
        }
        Ok(results)
    }

    /// Download and merge every collection without pushing.
    ///
    /// Local copies that win the merge stay local until the next push.
    pub async fn pull_and_merge(state: &AppState) -> ClientResult<Vec<CollectionSync>> {
        let user_id = state
            .sync_user()
            .ok_or_else(|| ClientError::InvalidState("sync is not configured".to_string()))?;

        let mut results = Vec::with_capacity(Collection::ALL.len());
        for collection in Collection::ALL {
            let pulled = Self::pull_collection(state, user_id, collection).await?;
            results.push(CollectionSync {
                pulled: pulled.count,
                merge: pulled.merge,
                ..CollectionSync::new(collection)
            });
        }
        Ok(results)
    }

    /// Best-effort removal of a document from the cloud.
    ///
    /// Returns false when sync is not configured or the call failed.
    pub async fn delete_remote(state: &AppState, collection: Collection, id: &str) -> ClientResult<bool> {
        let Some(user_id) = state.sync_user() else {
            return Ok(false);
        };

        match state.remote().delete_document(user_id, collection, id).await {
            Ok(()) => {
                debug!(collection = %collection, id = %id, "Remote document deleted");
                Ok(true)
            }
            Err(e) => {
                warn!(collection = %collection, id = %id, error = %e, "Remote delete failed");
                Ok(false)
            }
        }
    }

    /// Push, pull and write back one collection, filling in `outcome`
    async fn sync_collection(
        state: &AppState,
        user_id: &str,
        collection: Collection,
        outcome: &mut CollectionSync,
    ) -> ClientResult<()> {
        let cloud = Self::cloud_stamps_for_push(state, user_id, collection).await?;
        let (pushed, failed) = Self::push_collection(state, user_id, collection, cloud.as_ref()).await?;
        outcome.pushed = pushed;
        outcome.push_failures = failed;

        let pulled = Self::pull_collection(state, user_id, collection).await?;
        outcome.pulled = pulled.count;
        outcome.merge = pulled.merge;

        let (pushed, failed) = Self::push_documents(state, user_id, collection, &pulled.write_back).await;
        outcome.pushed += pushed;
        outcome.push_failures += failed;
        Ok(())
    }

    /// Cloud stamps to check pushes against; `None` when every change is pushed
    async fn cloud_stamps_for_push(
        state: &AppState,
        user_id: &str,
        collection: Collection,
    ) -> ClientResult<Option<CloudStamps>> {
        match state.config().sync.policy {
            MergePolicy::CloudWins => Ok(None),
            MergePolicy::LastWriteWins => {
                let documents = state.remote().list_documents(user_id, collection).await?;
                Ok(Some(cloud_stamps(&documents)))
            }
        }
    }

    /// Push documents changed since the last sync. Returns (pushed, failed).
    ///
    /// With `cloud` set, a document is skipped when the cloud copy would win
    /// the merge anyway; the pull then brings that copy down.
    async fn push_collection(
        state: &AppState,
        user_id: &str,
        collection: Collection,
        cloud: Option<&CloudStamps>,
    ) -> ClientResult<(usize, usize)> {
        let policy = state.config().sync.policy;
        let since = SyncStatusRepository::last_sync_at(state.db(), collection).await?;
        let changed = DocumentRepository::list_changed_since(state.db(), collection, since).await?;

        let mut failed = 0;
        let mut outgoing = Vec::with_capacity(changed.len());
        for record in &changed {
            let body: Value = match serde_json::from_str(&record.body) {
                Ok(body) => body,
                Err(e) => {
                    warn!(collection = %collection, id = %record.id, error = %e, "Skipping unreadable document");
                    failed += 1;
                    continue;
                }
            };

            let stale = cloud
                .and_then(|stamps| stamps.get(&record.id))
                .is_some_and(|cloud_stamp| policy.cloud_stamp_wins(stamp_of(&body), *cloud_stamp));
            if stale {
                debug!(collection = %collection, id = %record.id, "Cloud copy is newer, not pushing");
                continue;
            }

            outgoing.push(NewDocument {
                id: record.id.clone(),
                body,
                updated_at: record.updated_at.and_then(from_millis),
                deleted_at: record.deleted_at.and_then(from_millis),
            });
        }

        let (pushed, push_failed) = Self::push_documents(state, user_id, collection, &outgoing).await;
        Ok((pushed, failed + push_failed))
    }

    /// Upload documents one by one. Returns (pushed, failed).
    async fn push_documents(
        state: &AppState,
        user_id: &str,
        collection: Collection,
        documents: &[NewDocument],
    ) -> (usize, usize) {
        let mut pushed = 0;
        let mut failed = 0;
        for doc in documents {
            match state.remote().put_document(user_id, collection, &doc.id, &doc.body).await {
                Ok(()) => pushed += 1,
                Err(e) => {
                    warn!(collection = %collection, id = %doc.id, error = %e, "Push failed");
                    failed += 1;
                }
            }
        }

        counter!("neurolift_sync_pushed_total", "collection" => collection.as_str()).increment(pushed as u64);
        debug!(collection = %collection, pushed, failed, "Push finished");
        (pushed, failed)
    }

    async fn pull_collection(state: &AppState, user_id: &str, collection: Collection) -> ClientResult<Pulled> {
        let policy = state.config().sync.policy;
        match collection {
            Collection::Workouts => Self::pull_typed::<CompletedWorkout>(state, user_id, collection, policy).await,
            Collection::Journal => Self::pull_typed::<JournalEntry>(state, user_id, collection, policy).await,
            Collection::Templates => Self::pull_typed::<WorkoutTemplate>(state, user_id, collection, policy).await,
        }
    }

    /// Fetch, merge and write back one collection of `T`
    async fn pull_typed<T>(
        state: &AppState,
        user_id: &str,
        collection: Collection,
        policy: MergePolicy,
    ) -> ClientResult<Pulled>
    where
        T: SyncRecord + Clone + Serialize + DeserializeOwned,
    {
        let documents = state.remote().list_documents(user_id, collection).await?;
        let count = documents.len();

        let cloud: Vec<T> = documents
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<T>(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(collection = %collection, error = %e, "Skipping unreadable remote document");
                    None
                }
            })
            .collect();

        let local: Vec<T> = DocumentRepository::load_all(state.db(), collection).await?;
        let (merged, merge) = merge_with_report(&local, &cloud, policy);

        if !merge.is_noop() {
            let docs = merged
                .iter()
                .map(NewDocument::from_record)
                .collect::<anyhow::Result<Vec<_>>>()?;
            DocumentRepository::replace_all(state.db(), collection, &docs).await?;
        }

        let mut cloud_by_id: HashMap<&str, &T> = HashMap::with_capacity(cloud.len());
        for record in &cloud {
            cloud_by_id.entry(record.id()).or_insert(record);
        }
        let write_back = merged
            .iter()
            .filter(|m| {
                cloud_by_id.get(m.id()).is_some_and(|c| {
                    c.updated_at() != m.updated_at() || c.deleted_at() != m.deleted_at()
                })
            })
            .map(NewDocument::from_record)
            .collect::<anyhow::Result<Vec<_>>>()?;

        counter!("neurolift_sync_pulled_total", "collection" => collection.as_str()).increment(count as u64);
        debug!(
            collection = %collection,
            pulled = count,
            taken = merge.taken_from_cloud,
            added = merge.added_from_cloud,
            write_back = write_back.len(),
            "Merge finished"
        );
        Ok(Pulled {
            count,
            merge,
            write_back,
        })
    }
}
