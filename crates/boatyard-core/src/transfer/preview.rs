//! Compatibility and preview analysis (dry run).
//!
//! Tallies, per collection, how many incoming records are new and how many
//! already exist, and flags existing protected records that an import would
//! collide with. Never writes to the store.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::bundle::Bundle;
use super::collection::{descriptor, order};
use super::compatibility::check_schema_compatibility;
use super::manifest::collection_checksum;
use super::options::ImportOptions;
use super::protection::Protectable;
use crate::error::Result;
use crate::models::Collection;
use crate::traits::RecordStore;

/// Per-collection preview tallies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPreview {
    /// Incoming records with no existing match.
    pub new: usize,
    /// Incoming records whose id already exists.
    pub existing: usize,
    /// Existing matches that are protected (frozen or pinned). Only reported
    /// for collections whose records can be protected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<usize>,
}

/// Outcome of a preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    pub is_compatible: bool,
    pub warnings: Vec<String>,
    pub counts: BTreeMap<Collection, CollectionPreview>,
}

/// Preview an import of every collection in the bundle.
pub async fn preview_import(store: &dyn RecordStore, bundle: &Bundle) -> Result<PreviewResult> {
    preview_import_with(store, bundle, &ImportOptions::default()).await
}

/// Preview an import restricted to the collections `options` enables.
pub async fn preview_import_with(
    store: &dyn RecordStore,
    bundle: &Bundle,
    options: &ImportOptions,
) -> Result<PreviewResult> {
    let mut warnings = bundle_warnings(bundle);
    let mut counts = BTreeMap::new();

    let selected: Vec<Collection> = bundle
        .present()
        .into_iter()
        .filter(|c| options.includes(*c))
        .collect();

    for collection in order(&selected) {
        let records = bundle.collection(collection).unwrap_or_default();
        let protectable = descriptor(collection).protectable;
        let mut tally = CollectionPreview {
            conflicts: protectable.then_some(0),
            ..Default::default()
        };
        let mut missing_ids = 0usize;
        let mut seen: HashSet<String> = HashSet::new();

        for record in records {
            let Some(id) = record.id() else {
                missing_ids += 1;
                continue;
            };
            if !seen.insert(id.clone()) {
                continue;
            }
            match store.get_by_id(collection, &id).await? {
                Some(existing) => {
                    tally.existing += 1;
                    if existing.is_protected() {
                        if let Some(conflicts) = tally.conflicts.as_mut() {
                            *conflicts += 1;
                        }
                    }
                }
                None => tally.new += 1,
            }
        }

        let rejected = bundle.rejected(collection).len();
        if rejected > 0 {
            warnings.push(format!(
                "{} record(s) in '{}' are not JSON objects and will not be imported",
                rejected, collection
            ));
        }
        if missing_ids > 0 {
            warnings.push(format!(
                "{} record(s) in '{}' have no id and will not be imported",
                missing_ids, collection
            ));
        }
        if let Some(conflicts) = tally.conflicts.filter(|n| *n > 0) {
            warnings.push(format!(
                "{} existing record(s) in '{}' are protected (frozen or pinned) and will be kept as-is",
                conflicts, collection
            ));
        }

        debug!(
            subsystem = "transfer",
            component = "preview",
            collection = %collection,
            new = tally.new,
            existing = tally.existing,
            "Collection previewed"
        );
        counts.insert(collection, tally);
    }

    info!(
        subsystem = "transfer",
        component = "preview",
        op = "preview_import",
        schema_version = %bundle.manifest.schema_version,
        collections = counts.len(),
        warnings = warnings.len(),
        "Preview complete"
    );

    Ok(PreviewResult {
        // Reaching this point means the bundle passed structural validation.
        is_compatible: true,
        warnings,
        counts,
    })
}

/// Advisory warnings derived from the bundle alone.
pub(crate) fn bundle_warnings(bundle: &Bundle) -> Vec<String> {
    let manifest = &bundle.manifest;
    let mut warnings = check_schema_compatibility(&manifest.schema_version).warnings();

    for key in bundle.unrecognized() {
        warnings.push(format!(
            "Collection '{}' is not recognized by this version and will be ignored",
            key
        ));
    }

    for collection in bundle.present() {
        let records = bundle.collection(collection).unwrap_or_default();
        let carried = bundle.entry_count(collection);
        if let Some(expected) = manifest.counts.get(collection.as_str()) {
            if *expected != carried {
                warnings.push(format!(
                    "Manifest lists {} record(s) for '{}' but the bundle contains {}",
                    expected, collection, carried
                ));
            }
        }
        if let Some(expected) = manifest.checksums.get(collection.as_str()) {
            if *expected != collection_checksum(records) {
                warnings.push(format!(
                    "Checksum mismatch for '{}': contents changed since export",
                    collection
                ));
            }
        }
    }

    warnings
}
