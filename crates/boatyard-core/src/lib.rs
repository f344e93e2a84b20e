//! # boatyard-core
//!
//! Core types, traits, and the export/import engine for boatyard.
//!
//! The engine moves a versioned snapshot of the application's collections
//! between instances: [`export_data`] assembles a [`Bundle`],
//! [`preview_import`] dry-runs it against a store, and [`import_data`]
//! merges or replaces it back while honoring referential integrity,
//! append-only collections, and protected records.

pub mod error;
pub mod logging;
pub mod memory_store;
pub mod models;
pub mod traits;
pub mod transfer;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use memory_store::MemoryStore;
pub use models::*;
pub use traits::*;
pub use transfer::{
    check_schema_compatibility, export_data, import_data, order, preview_import,
    preview_import_with, validate_export_data, Bundle, Compatibility, ExportOptions,
    ImportMode, ImportOptions, ImportResult, Manifest, PreviewResult, Protectable,
    TransferContext, CURRENT_SCHEMA_VERSION,
};
