//! Remote document store
//!
//! The cloud side of sync is an opaque key-value document service addressed
//! as `users/{uid}/{collection}/{id}`. Documents are the same camelCase JSON
//! the local store holds.

mod http;
mod memory;

pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;

use crate::error::ClientResult;
use crate::repositories::Collection;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for remote document storage operations.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create or overwrite a document
    async fn put_document(&self, user_id: &str, collection: Collection, id: &str, body: &Value) -> ClientResult<()>;

    /// Every document of a user's collection
    async fn list_documents(&self, user_id: &str, collection: Collection) -> ClientResult<Vec<Value>>;

    /// Remove a document. Removing a missing document succeeds.
    async fn delete_document(&self, user_id: &str, collection: Collection, id: &str) -> ClientResult<()>;
}
