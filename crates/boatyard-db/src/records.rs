//! PostgreSQL record store.
//!
//! Every collection shares one table keyed by `(collection, id)`; the record
//! body is stored verbatim as JSONB so unknown fields survive a round trip.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, trace};

use boatyard_core::{Collection, Error, Record, RecordFilter, RecordStore, Result};

/// DDL for the record table. Mirrors the migration of the same name.
pub const SCHEMA_SQL: &str = include_str!("../../../migrations/20261001000000_sync_record.sql");

/// PostgreSQL implementation of RecordStore.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: Pool<Postgres>,
}

impl PgRecordStore {
    /// Create a new PgRecordStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create the record table and its index if they do not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        debug!(
            subsystem = "database",
            component = "records",
            op = "ensure_schema",
            "Record table ready"
        );
        Ok(())
    }

    /// Number of stored records in a collection.
    pub async fn count(&self, collection: Collection) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM sync_record WHERE collection = $1")
            .bind(collection.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.get("n"))
    }

    /// Remove every record of every collection.
    pub async fn clear_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sync_record")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}

fn decode_body(collection: Collection, body: JsonValue) -> Result<Record> {
    Record::from_value(body)
        .map_err(|e| Error::Store(format!("Corrupt {} row: {}", collection, e)))
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get_all(&self, collection: Collection) -> Result<Vec<Record>> {
        let rows = sqlx::query(
            r#"
            SELECT body
            FROM sync_record
            WHERE collection = $1
            ORDER BY id
            "#,
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| decode_body(collection, r.get::<JsonValue, _>("body")))
            .collect()
    }

    async fn get_by_id(&self, collection: Collection, id: &str) -> Result<Option<Record>> {
        let row = sqlx::query(
            r#"
            SELECT body
            FROM sync_record
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| decode_body(collection, r.get::<JsonValue, _>("body")))
            .transpose()
    }

    async fn save(&self, collection: Collection, record: Record) -> Result<()> {
        let id = record.id().ok_or_else(|| {
            Error::InvalidInput(format!("Cannot save {} record without an id", collection))
        })?;

        sqlx::query(
            r#"
            INSERT INTO sync_record (collection, id, body, updated_at_utc)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = EXCLUDED.body, updated_at_utc = EXCLUDED.updated_at_utc
            "#,
        )
        .bind(collection.as_str())
        .bind(&id)
        .bind(record.into_value())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        trace!(collection = %collection, record_id = %id, "Record saved");
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sync_record WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn query(&self, collection: Collection, filter: &RecordFilter) -> Result<Vec<Record>> {
        if filter.is_empty() {
            return self.get_all(collection).await;
        }

        let rows = sqlx::query(
            r#"
            SELECT body
            FROM sync_record
            WHERE collection = $1 AND body @> $2
            ORDER BY id
            "#,
        )
        .bind(collection.as_str())
        .bind(filter.as_json())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| decode_body(collection, r.get::<JsonValue, _>("body")))
            .collect()
    }

    async fn exists(&self, collection: Collection, id: &str) -> Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM sync_record WHERE collection = $1 AND id = $2) AS found",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.get("found"))
    }
}
