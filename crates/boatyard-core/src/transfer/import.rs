//! Import executor: merge or replace a bundle back into a store.
//!
//! Collections are processed in dependency order so that every referenced
//! record is either already stored or was written earlier in the same pass.
//! Per-record problems (missing references, missing ids) are collected into
//! the result; only store failures abort the import. There is no rollback:
//! writes made before a failure stay committed.
//!
//! A replace pass never deletes a protected record, nor any record a
//! protected record still refers to (directly or through another kept
//! record). Those are reported in `preserved` and `warnings`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::bundle::Bundle;
use super::collection::{descriptor, order, CollectionDescriptor, ForeignKey, DESCRIPTORS};
use super::manifest::TransferContext;
use super::options::{ImportMode, ImportOptions};
use super::preview::bundle_warnings;
use super::protection::Protectable;
use crate::error::{Error, Result};
use crate::models::{Collection, Record};
use crate::traits::RecordStore;

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// True iff `errors` is empty.
    pub success: bool,
    pub imported: BTreeMap<Collection, usize>,
    pub skipped: BTreeMap<Collection, usize>,
    /// Protected existing records kept by a replace pass.
    pub preserved: BTreeMap<Collection, usize>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ImportResult {
    pub fn total_imported(&self) -> usize {
        self.imported.values().sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Ids known to resolve, per collection, during one import pass.
#[derive(Default)]
struct ResolvedIds(HashMap<Collection, HashSet<String>>);

impl ResolvedIds {
    fn contains(&self, collection: Collection, id: &str) -> bool {
        self.0.get(&collection).is_some_and(|ids| ids.contains(id))
    }

    fn insert(&mut self, collection: Collection, id: String) {
        self.0.entry(collection).or_default().insert(id);
    }
}

/// Records reachable from protected records through foreign keys, with the
/// protected record that anchors each one.
#[derive(Default)]
struct Anchors(HashMap<Collection, HashMap<String, String>>);

impl Anchors {
    fn referrer(&self, collection: Collection, id: &str) -> Option<&str> {
        self.0.get(&collection)?.get(id).map(String::as_str)
    }

    /// Returns false when the id was already anchored.
    fn insert(&mut self, collection: Collection, id: String, referrer: &str) -> bool {
        let ids = self.0.entry(collection).or_default();
        if ids.contains_key(&id) {
            return false;
        }
        ids.insert(id, referrer.to_string());
        true
    }

    fn len(&self) -> usize {
        self.0.values().map(HashMap::len).sum()
    }
}

/// Walk the foreign keys of every stored protected record.
async fn protected_anchors(store: &dyn RecordStore) -> Result<Anchors> {
    let mut anchors = Anchors::default();
    let mut pending: Vec<(Collection, Record, String)> = Vec::new();

    for desc in DESCRIPTORS.iter().filter(|d| d.protectable) {
        for record in store.get_all(desc.collection).await? {
            if !record.is_protected() {
                continue;
            }
            if let Some(id) = record.id() {
                let referrer = format!("{}/{}", desc.collection, id);
                pending.push((desc.collection, record, referrer));
            }
        }
    }

    while let Some((collection, record, referrer)) = pending.pop() {
        for fk in descriptor(collection).foreign_keys {
            let Some(target_id) = record.reference(fk.field) else {
                continue;
            };
            if !anchors.insert(fk.target, target_id.clone(), &referrer) {
                continue;
            }
            if let Some(target) = store.get_by_id(fk.target, &target_id).await? {
                pending.push((fk.target, target, referrer.clone()));
            }
        }
    }

    Ok(anchors)
}

/// Tallies for a single collection.
#[derive(Default)]
struct CollectionOutcome {
    imported: usize,
    skipped: usize,
    preserved: usize,
}

/// Write the bundle's enabled collections into `store`.
pub async fn import_data(
    store: &dyn RecordStore,
    bundle: &Bundle,
    options: &ImportOptions,
    context: &TransferContext,
) -> Result<ImportResult> {
    if bundle.manifest.schema_version.trim().is_empty() {
        return Err(Error::InvalidInput(
            "Manifest version is empty".to_string(),
        ));
    }

    let start = Instant::now();
    let mut result = ImportResult {
        warnings: bundle_warnings(bundle),
        ..Default::default()
    };
    let mut resolved = ResolvedIds::default();
    let anchors = if options.mode == ImportMode::Replace {
        protected_anchors(store).await?
    } else {
        Anchors::default()
    };

    let selected: Vec<Collection> = bundle
        .present()
        .into_iter()
        .filter(|c| options.includes(*c))
        .collect();

    info!(
        subsystem = "transfer",
        component = "import",
        op = "import_data",
        operator = %context.operator,
        mode = options.mode.as_str(),
        schema_version = %bundle.manifest.schema_version,
        collections = selected.len(),
        anchored = anchors.len(),
        "Import started"
    );

    for collection in order(&selected) {
        let outcome = import_collection(
            store,
            descriptor(collection),
            bundle,
            options,
            &anchors,
            &mut resolved,
            &mut result,
        )
        .await
        .inspect_err(|e| {
            error!(
                subsystem = "transfer",
                component = "import",
                collection = %collection,
                error = %e,
                "Import aborted by store failure"
            );
        })?;

        debug!(
            subsystem = "transfer",
            component = "import",
            collection = %collection,
            imported = outcome.imported,
            skipped = outcome.skipped,
            preserved = outcome.preserved,
            "Collection imported"
        );

        result.imported.insert(collection, outcome.imported);
        result.skipped.insert(collection, outcome.skipped);
        if outcome.preserved > 0 {
            result.preserved.insert(collection, outcome.preserved);
        }
    }

    result.success = result.errors.is_empty();

    info!(
        subsystem = "transfer",
        component = "import",
        op = "import_data",
        operator = %context.operator,
        mode = options.mode.as_str(),
        success = result.success,
        imported = result.total_imported(),
        skipped = result.total_skipped(),
        preserved = result.preserved.values().sum::<usize>(),
        error_count = result.errors.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Import complete"
    );

    Ok(result)
}

async fn import_collection(
    store: &dyn RecordStore,
    desc: &CollectionDescriptor,
    bundle: &Bundle,
    options: &ImportOptions,
    anchors: &Anchors,
    resolved: &mut ResolvedIds,
    result: &mut ImportResult,
) -> Result<CollectionOutcome> {
    let collection = desc.collection;
    let records = bundle.collection(collection).unwrap_or_default();
    let mut outcome = CollectionOutcome::default();
    let replacing = options.mode == ImportMode::Replace && !desc.append_only;

    // Protected ids that survived the clearing step of a replace pass.
    let mut kept: HashSet<String> = HashSet::new();
    if replacing {
        let incoming: HashSet<String> = records.iter().filter_map(Record::id).collect();
        let mut unidentified = 0usize;
        for existing in store.get_all(collection).await? {
            let Some(id) = existing.id() else {
                unidentified += 1;
                continue;
            };
            if existing.is_protected() {
                kept.insert(id);
            } else if let Some(referrer) = anchors.referrer(collection, &id) {
                // The incoming copy, if any, overwrites it below.
                if !incoming.contains(&id) {
                    outcome.preserved += 1;
                    result.warnings.push(format!(
                        "{}/{}: kept because protected {} refers to it",
                        collection, id, referrer
                    ));
                }
            } else {
                store.delete(collection, &id).await?;
            }
        }
        outcome.preserved += kept.len();
        if outcome.preserved > 0 {
            info!(
                subsystem = "transfer",
                component = "import",
                collection = %collection,
                preserved = outcome.preserved,
                "Protected records kept during replace"
            );
        }
        if unidentified > 0 {
            warn!(
                subsystem = "transfer",
                component = "import",
                collection = %collection,
                result_count = unidentified,
                "Existing records without an id left in place"
            );
            result.warnings.push(format!(
                "{} existing record(s) in '{}' have no id and were left in place",
                unidentified, collection
            ));
        }
    }

    for entry in bundle.rejected(collection) {
        result.errors.push(format!(
            "{}[{}]: record must be an object, got {}",
            collection, entry.index, entry.found
        ));
    }

    let mut seen: HashSet<String> = HashSet::new();
    for (idx, record) in records.iter().enumerate() {
        let Some(id) = record.id() else {
            result.errors.push(format!(
                "{}[{}]: record has no id",
                collection,
                bundle.source_index(collection, idx)
            ));
            continue;
        };
        if !seen.insert(id.clone()) {
            if desc.append_only {
                outcome.skipped += 1;
            } else {
                result
                    .errors
                    .push(format!("{}/{}: duplicate id in bundle", collection, id));
            }
            continue;
        }

        if let Some(message) = check_references(store, desc, record, &id, resolved).await? {
            warn!(
                subsystem = "transfer",
                component = "import",
                collection = %collection,
                record_id = %id,
                "{}",
                message
            );
            result.errors.push(message);
            continue;
        }

        if kept.contains(&id) {
            outcome.skipped += 1;
            result.warnings.push(format!(
                "{}/{}: existing {} is protected and was not replaced",
                collection,
                id,
                collection.record_label()
            ));
            resolved.insert(collection, id);
            continue;
        }

        if !replacing {
            if let Some(existing) = store.get_by_id(collection, &id).await? {
                resolved.insert(collection, id.clone());
                if desc.append_only || options.skip_conflicts {
                    outcome.skipped += 1;
                    continue;
                }
                if existing.is_protected() {
                    outcome.skipped += 1;
                    result.warnings.push(format!(
                        "{}/{}: existing {} is protected ({}) and was not overwritten",
                        collection,
                        id,
                        collection.record_label(),
                        existing.protection().reason()
                    ));
                    continue;
                }
            }
        }

        store.save(collection, record.clone()).await?;
        resolved.insert(collection, id);
        outcome.imported += 1;
    }

    Ok(outcome)
}

/// First unresolved reference of `record`, as a user-facing message.
async fn check_references(
    store: &dyn RecordStore,
    desc: &CollectionDescriptor,
    record: &Record,
    id: &str,
    resolved: &mut ResolvedIds,
) -> Result<Option<String>> {
    for fk in desc.foreign_keys {
        if let Some(problem) = check_reference(store, fk, record, resolved).await? {
            return Ok(Some(format!(
                "{}/{}: {} not found ({})",
                desc.collection,
                id,
                fk.target.record_label(),
                problem
            )));
        }
    }
    Ok(None)
}

async fn check_reference(
    store: &dyn RecordStore,
    fk: &ForeignKey,
    record: &Record,
    resolved: &mut ResolvedIds,
) -> Result<Option<String>> {
    let Some(target_id) = record.reference(fk.field) else {
        if record.has(fk.field) {
            return Ok(Some(format!("{} is not a valid id", fk.field)));
        }
        if fk.required {
            return Ok(Some(format!("{} missing", fk.field)));
        }
        return Ok(None);
    };

    if resolved.contains(fk.target, &target_id) {
        return Ok(None);
    }
    if store.get_by_id(fk.target, &target_id).await?.is_some() {
        resolved.insert(fk.target, target_id);
        return Ok(None);
    }
    Ok(Some(format!("{}={}", fk.field, target_id)))
}
