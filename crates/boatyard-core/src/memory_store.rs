//! In-memory record store.
//!
//! Suitable for:
//! - Unit and integration tests
//! - Ephemeral instances that don't need persistence
//!
//! Records are kept per collection in id order, so `get_all` is
//! deterministic.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::{Error, Result};
use crate::models::{Collection, Record};
use crate::traits::RecordStore;

/// A thread-safe, in-memory [`RecordStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Collection, BTreeMap<String, Record>>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a batch of records. Useful for seeding fixtures.
    pub async fn seed(&self, collection: Collection, records: Vec<Record>) -> Result<()> {
        for record in records {
            self.save(collection, record).await?;
        }
        Ok(())
    }

    /// Number of records in a collection.
    pub async fn count(&self, collection: Collection) -> usize {
        self.tables
            .read()
            .await
            .get(&collection)
            .map(|t| t.len())
            .unwrap_or(0)
    }

    /// Total number of records across all collections.
    pub async fn total(&self) -> usize {
        self.tables.read().await.values().map(|t| t.len()).sum()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_all(&self, collection: Collection) -> Result<Vec<Record>> {
        Ok(self
            .tables
            .read()
            .await
            .get(&collection)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_by_id(&self, collection: Collection, id: &str) -> Result<Option<Record>> {
        Ok(self
            .tables
            .read()
            .await
            .get(&collection)
            .and_then(|t| t.get(id).cloned()))
    }

    async fn save(&self, collection: Collection, record: Record) -> Result<()> {
        let id = record.id().ok_or_else(|| {
            Error::InvalidInput(format!("Cannot save a {} without an id", collection.record_label()))
        })?;
        trace!(
            subsystem = "store",
            component = "memory",
            op = "save",
            collection = %collection,
            record_id = %id,
            "Saving record"
        );
        self.tables
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id, record);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        if let Some(table) = self.tables.write().await.get_mut(&collection) {
            table.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordFilter;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = MemoryStore::new();
        store
            .save(Collection::Clients, record(json!({"id": "C1", "name": "Acme"})))
            .await
            .unwrap();

        let found = store.get_by_id(Collection::Clients, "C1").await.unwrap();
        assert_eq!(found.unwrap().get("name"), Some(&json!("Acme")));
        assert!(store
            .get_by_id(Collection::Projects, "C1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_same_id() {
        let store = MemoryStore::new();
        store
            .save(Collection::Clients, record(json!({"id": "C1", "name": "Old"})))
            .await
            .unwrap();
        store
            .save(Collection::Clients, record(json!({"id": "C1", "name": "New"})))
            .await
            .unwrap();

        assert_eq!(store.count(Collection::Clients).await, 1);
        let all = store.get_all(Collection::Clients).await.unwrap();
        assert_eq!(all[0].get("name"), Some(&json!("New")));
    }

    #[tokio::test]
    async fn test_save_without_id_fails() {
        let store = MemoryStore::new();
        let err = store
            .save(Collection::Clients, record(json!({"name": "Anonymous"})))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let store = MemoryStore::new();
        store.delete(Collection::Users, "nobody").await.unwrap();
        store
            .seed(Collection::Users, vec![record(json!({"id": "U1"}))])
            .await
            .unwrap();
        store.delete(Collection::Users, "U1").await.unwrap();
        assert_eq!(store.total().await, 0);
    }

    #[tokio::test]
    async fn test_default_query_filters() {
        let store = MemoryStore::new();
        store
            .seed(
                Collection::Projects,
                vec![
                    record(json!({"id": "P1", "clientId": "C1"})),
                    record(json!({"id": "P2", "clientId": "C2"})),
                    record(json!({"id": "P3", "clientId": "C1"})),
                ],
            )
            .await
            .unwrap();

        let hits = store
            .query(Collection::Projects, &RecordFilter::new().eq("clientId", "C1"))
            .await
            .unwrap();
        let ids: Vec<_> = hits.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec!["P1".to_string(), "P3".to_string()]);
        assert!(store.exists(Collection::Projects, "P2").await.unwrap());
    }
}
