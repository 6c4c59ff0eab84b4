//! Local-first merge of record lists
//!
//! Local and cloud copies of a collection are merged by id. Deletions travel
//! as tombstones (records with `deleted_at` set) and merge like any other
//! record; callers drop them with [`live`] before display.

use crate::models::{CompletedWorkout, JournalEntry, WorkoutTemplate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A record that can be merged across devices
pub trait SyncRecord {
    fn id(&self) -> &str;

    /// Last modification; `None` sorts as oldest
    fn updated_at(&self) -> Option<DateTime<Utc>>;

    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn is_tombstone(&self) -> bool {
        self.deleted_at().is_some()
    }
}

macro_rules! impl_sync_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl SyncRecord for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn updated_at(&self) -> Option<DateTime<Utc>> {
                    self.updated_at
                }

                fn deleted_at(&self) -> Option<DateTime<Utc>> {
                    self.deleted_at
                }
            }
        )+
    };
}

impl_sync_record!(CompletedWorkout, JournalEntry, WorkoutTemplate);

/// How conflicting copies of the same id are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The cloud copy always replaces the local one
    CloudWins,
    /// The later `updated_at` wins; ties go to the cloud
    #[default]
    LastWriteWins,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergePolicy::CloudWins => "cloud_wins",
            MergePolicy::LastWriteWins => "last_write_wins",
        }
    }

    fn cloud_wins<T: SyncRecord>(&self, local: &T, cloud: &T) -> bool {
        self.cloud_stamp_wins(local.updated_at(), cloud.updated_at())
    }

    /// Whether a cloud copy stamped `cloud` replaces a local copy stamped `local`
    pub fn cloud_stamp_wins(&self, local: Option<DateTime<Utc>>, cloud: Option<DateTime<Utc>>) -> bool {
        match self {
            MergePolicy::CloudWins => true,
            MergePolicy::LastWriteWins => cloud >= local,
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cloud_wins" => Ok(MergePolicy::CloudWins),
            "last_write_wins" | "lww" => Ok(MergePolicy::LastWriteWins),
            _ => Err(format!("Unknown merge policy: {}", s)),
        }
    }
}

/// What a merge did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Local records kept as they were (local-only or newer than the cloud)
    pub kept_local: usize,
    /// Local records replaced by their cloud copy
    pub taken_from_cloud: usize,
    /// Cloud records that were not present locally
    pub added_from_cloud: usize,
}

impl MergeReport {
    /// True when the merge changed nothing locally
    pub fn is_noop(&self) -> bool {
        self.taken_from_cloud == 0 && self.added_from_cloud == 0
    }
}

/// Merge two lists by id.
///
/// Output order is local order, then cloud-only records in cloud order.
/// Each id appears once; a repeated id within one side keeps its first copy.
pub fn merge_by_id<T: SyncRecord + Clone>(local: &[T], cloud: &[T], policy: MergePolicy) -> Vec<T> {
    merge_with_report(local, cloud, policy).0
}

/// [`merge_by_id`] plus a count of what changed
pub fn merge_with_report<T: SyncRecord + Clone>(
    local: &[T],
    cloud: &[T],
    policy: MergePolicy,
) -> (Vec<T>, MergeReport) {
    let mut cloud_by_id: HashMap<&str, &T> = HashMap::with_capacity(cloud.len());
    for record in cloud {
        cloud_by_id.entry(record.id()).or_insert(record);
    }

    let mut report = MergeReport::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(local.len() + cloud.len());
    let mut merged = Vec::with_capacity(local.len() + cloud.len());

    for record in local {
        if !seen.insert(record.id()) {
            continue;
        }
        match cloud_by_id.get(record.id()) {
            Some(remote) if policy.cloud_wins(record, *remote) => {
                // An identical copy is not a change
                if remote.updated_at() != record.updated_at() || remote.deleted_at() != record.deleted_at() {
                    report.taken_from_cloud += 1;
                } else {
                    report.kept_local += 1;
                }
                merged.push((*remote).clone());
            }
            _ => {
                report.kept_local += 1;
                merged.push(record.clone());
            }
        }
    }

    for record in cloud {
        if seen.insert(record.id()) {
            report.added_from_cloud += 1;
            merged.push(record.clone());
        }
    }

    (merged, report)
}

/// Records that are not tombstones
pub fn live<T: SyncRecord + Clone>(records: &[T]) -> Vec<T> {
    records.iter().filter(|r| !r.is_tombstone()).cloned().collect()
}
