//! In-memory remote store for tests and offline use

use super::RemoteStore;
use crate::error::{ClientError, ClientResult};
use crate::repositories::Collection;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

type Key = (String, Collection);

/// Remote store backed by a map, with a switch to simulate an outage
#[derive(Clone, Default)]
pub struct MemoryRemoteStore {
    documents: Arc<RwLock<HashMap<Key, BTreeMap<String, Value>>>>,
    offline: Arc<AtomicBool>,
    puts: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a 503 until switched back
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Current documents of a collection, ordered by id
    pub async fn documents(&self, user_id: &str, collection: Collection) -> Vec<Value> {
        let documents = self.documents.read().await;
        documents
            .get(&(user_id.to_string(), collection))
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Store a document directly, bypassing the offline switch and counters
    pub async fn seed(&self, user_id: &str, collection: Collection, id: &str, body: Value) {
        let mut documents = self.documents.write().await;
        documents
            .entry((user_id.to_string(), collection))
            .or_default()
            .insert(id.to_string(), body);
    }

    /// Number of successful puts so far
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of successful deletes so far
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> ClientResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Remote {
                status: 503,
                message: "remote store offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn put_document(&self, user_id: &str, collection: Collection, id: &str, body: &Value) -> ClientResult<()> {
        self.ensure_online()?;
        self.seed(user_id, collection, id, body.clone()).await;
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_documents(&self, user_id: &str, collection: Collection) -> ClientResult<Vec<Value>> {
        self.ensure_online()?;
        Ok(self.documents(user_id, collection).await)
    }

    async fn delete_document(&self, user_id: &str, collection: Collection, id: &str) -> ClientResult<()> {
        self.ensure_online()?;
        let mut documents = self.documents.write().await;
        if let Some(docs) = documents.get_mut(&(user_id.to_string(), collection)) {
            docs.remove(id);
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_list_delete() {
        let store = MemoryRemoteStore::new();
        store
            .put_document("u1", Collection::Workouts, "w1", &json!({"id": "w1"}))
            .await
            .unwrap();

        let docs = store.list_documents("u1", Collection::Workouts).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert!(store.list_documents("u2", Collection::Workouts).await.unwrap().is_empty());
        assert!(store.list_documents("u1", Collection::Journal).await.unwrap().is_empty());

        store.delete_document("u1", Collection::Workouts, "w1").await.unwrap();
        store.delete_document("u1", Collection::Workouts, "missing").await.unwrap();
        assert!(store.documents("u1", Collection::Workouts).await.is_empty());
        assert_eq!(store.put_count(), 1);
        assert_eq!(store.delete_count(), 2);
    }

    #[test]
    fn test_clones_share_documents() {
        let store = MemoryRemoteStore::new();
        let clone = store.clone();
        tokio_test::block_on(store.seed("u1", Collection::Journal, "j1", json!({"id": "j1"})));

        let docs = tokio_test::block_on(clone.documents("u1", Collection::Journal));
        assert_eq!(docs, vec![json!({"id": "j1"})]);
    }

    #[tokio::test]
    async fn test_offline_rejects_calls() {
        let store = MemoryRemoteStore::new();
        store.set_offline(true);

        let err = store.list_documents("u1", Collection::Templates).await.unwrap_err();
        assert!(err.is_transient());
        assert!(store
            .put_document("u1", Collection::Templates, "t1", &json!({}))
            .await
            .is_err());

        store.set_offline(false);
        assert!(store.list_documents("u1", Collection::Templates).await.is_ok());
    }
}
