//! Database repositories
//!
//! Provides data access layer for the local SQLite store.

pub mod documents;
pub mod settings;
pub mod sync_status;

pub use documents::{Collection, DocumentRecord, DocumentRepository, NewDocument};
pub use settings::{history_key, SettingsRepository, HISTORY_PREFIX, KEY_CALORIES, KEY_GOAL, KEY_UNITS};
pub use sync_status::{SyncStatusRecord, SyncStatusRepository};
