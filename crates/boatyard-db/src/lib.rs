//! # boatyard-db
//!
//! PostgreSQL persistence for boatyard.
//!
//! This crate provides:
//! - Connection pool management
//! - A [`RecordStore`] implementation keeping every collection in one JSONB table
//!
//! ## Example
//!
//! ```rust,ignore
//! use boatyard_db::{Database, ExportOptions, TransferContext, export_data};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/boatyard").await?;
//!     db.records.ensure_schema().await?;
//!
//!     let bundle = export_data(&db.records, &ExportOptions::default(), &TransferContext::new("cli")).await?;
//!     println!("{}", bundle.to_json_pretty()?);
//!     Ok(())
//! }
//! ```
pub mod pool;
pub mod records;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use boatyard_core::*;

pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use records::PgRecordStore;

/// Connection pool plus the repositories built on it.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Record store for every synchronizable collection.
    pub records: PgRecordStore,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            records: PgRecordStore::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
