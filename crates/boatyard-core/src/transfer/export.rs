//! Bundle assembly (export).

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::bundle::Bundle;
use super::manifest::{build_manifest, collection_checksum, TransferContext};
use super::options::ExportOptions;
use crate::error::Result;
use crate::models::{Collection, Record};
use crate::traits::RecordStore;

/// User fields removed unless `include_user_passwords` is set.
pub const CREDENTIAL_FIELDS: &[&str] = &["password", "passwordHash", "passwordSalt"];

/// Export every collection selected by `options` as a point-in-time copy.
///
/// Records are read unconditionally (no status or archival filtering).
/// Fails only when the store cannot be read.
pub async fn export_data(
    store: &dyn RecordStore,
    options: &ExportOptions,
    context: &TransferContext,
) -> Result<Bundle> {
    export_data_at(store, options, context, Utc::now()).await
}

/// [`export_data`] with an explicit export timestamp.
pub async fn export_data_at(
    store: &dyn RecordStore,
    options: &ExportOptions,
    context: &TransferContext,
    exported_at: DateTime<Utc>,
) -> Result<Bundle> {
    let start = Instant::now();

    if options.include_documents {
        warn!(
            subsystem = "transfer",
            component = "export",
            "includeDocuments is set, but documents are not part of the bundle format"
        );
    }

    let mut collections: Vec<(Collection, Vec<Record>)> = Vec::new();
    let mut counts = BTreeMap::new();
    let mut checksums = BTreeMap::new();

    for collection in options.collections() {
        let mut records = store.get_all(collection).await?;
        if collection == Collection::Users && !options.include_user_passwords {
            for record in &mut records {
                strip_credentials(record);
            }
        }

        debug!(
            subsystem = "transfer",
            component = "export",
            collection = %collection,
            result_count = records.len(),
            "Collection exported"
        );

        counts.insert(collection.as_str().to_string(), records.len());
        checksums.insert(
            collection.as_str().to_string(),
            collection_checksum(&records),
        );
        collections.push((collection, records));
    }

    let manifest = build_manifest(options, context, exported_at, counts, checksums);
    let mut bundle = Bundle::new(manifest);
    let total: usize = collections.iter().map(|(_, r)| r.len()).sum();
    for (collection, records) in collections {
        bundle.insert_collection(collection, records);
    }

    info!(
        subsystem = "transfer",
        component = "export",
        op = "export_data",
        operator = %context.operator,
        collections = bundle.present().len(),
        result_count = total,
        duration_ms = start.elapsed().as_millis() as u64,
        "Export complete"
    );

    Ok(bundle)
}

/// Remove credential fields from a user record.
pub fn strip_credentials(record: &mut Record) {
    for field in CREDENTIAL_FIELDS {
        record.remove(field);
    }
}

/// Download filename for a bundle exported at `at`.
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("boatyard-export-{}.json", at.format("%Y%m%d-%H%M%S"))
}
