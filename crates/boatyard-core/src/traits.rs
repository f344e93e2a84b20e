//! Core traits for boatyard abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Collection, Record, RecordFilter};

// =============================================================================
// RECORD STORE
// =============================================================================

/// Generic key-value store of records, addressed by collection and id.
///
/// The transfer engine only ever talks to persistence through this trait.
/// There are no cross-collection transactions: every method is one
/// independent store call.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every record of a collection.
    async fn get_all(&self, collection: Collection) -> Result<Vec<Record>>;

    /// Fetch one record by its normalized id.
    async fn get_by_id(&self, collection: Collection, id: &str) -> Result<Option<Record>>;

    /// Insert or overwrite a record, keyed by its `id`.
    async fn save(&self, collection: Collection, record: Record) -> Result<()>;

    /// Delete a record. Deleting a missing id is not an error.
    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;

    /// Fetch the records matching a field-equality filter.
    async fn query(&self, collection: Collection, filter: &RecordFilter) -> Result<Vec<Record>> {
        Ok(self
            .get_all(collection)
            .await?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    /// Check if a record exists.
    async fn exists(&self, collection: Collection, id: &str) -> Result<bool> {
        Ok(self.get_by_id(collection, id).await?.is_some())
    }
}
