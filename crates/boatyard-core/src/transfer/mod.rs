//! Export/import of versioned data bundles between instances.

pub mod bundle;
pub mod collection;
pub mod compatibility;
pub mod export;
pub mod import;
pub mod manifest;
pub mod options;
pub mod preview;
pub mod protection;
pub mod validate;
pub mod version;


pub use bundle::{Bundle, RejectedEntry};
pub use collection::{
    dependencies, descriptor, order, CollectionDescriptor, ExportGroup, ForeignKey, DESCRIPTORS,
};
pub use compatibility::{check_schema_compatibility, Compatibility};
pub use export::{export_data, export_data_at, export_filename, strip_credentials, CREDENTIAL_FIELDS};
pub use import::{import_data, ImportResult};
pub use manifest::{
    build_manifest, collection_checksum, options_snapshot, ExportOptionsSnapshot, Manifest,
    TransferContext,
};
pub use options::{ExportOptions, ImportMode, ImportOptions};
pub use preview::{preview_import, preview_import_with, CollectionPreview, PreviewResult};
pub use protection::{LibraryPins, Protectable, Protection};
pub use validate::validate_export_data;
pub use version::{Version, CURRENT_SCHEMA_VERSION};
