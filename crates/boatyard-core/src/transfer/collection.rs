//! Collection descriptor table.
//!
//! Static metadata for every synchronizable collection: which foreign keys
//! its records carry, whether it is append-only, whether its records may be
//! protected, and which export toggle selects it.
//!
//! The declared dependency graph is acyclic and the declaration order of
//! [`DESCRIPTORS`] is itself a valid topological order.

use crate::models::Collection;

/// A reference from a record field to a record in another collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Field on the dependent record holding the referenced id.
    pub field: &'static str,
    /// Collection the id must resolve in.
    pub target: Collection,
    /// Whether a missing or null value is itself a referential error.
    pub required: bool,
}

/// Export toggle group a collection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportGroup {
    Projects,
    Clients,
    Users,
    Library,
    AuditLog,
}

/// Static description of one collection.
#[derive(Debug, Clone, Copy)]
pub struct CollectionDescriptor {
    pub collection: Collection,
    pub foreign_keys: &'static [ForeignKey],
    /// Unioned on import, never cleared or overwritten.
    pub append_only: bool,
    /// Records may carry frozen-configuration or library-pin markers.
    pub protectable: bool,
    pub group: ExportGroup,
}

const fn fk(field: &'static str, target: Collection, required: bool) -> ForeignKey {
    ForeignKey {
        field,
        target,
        required,
    }
}

const fn library(collection: Collection, foreign_keys: &'static [ForeignKey]) -> CollectionDescriptor {
    CollectionDescriptor {
        collection,
        foreign_keys,
        append_only: false,
        protectable: false,
        group: ExportGroup::Library,
    }
}

/// Every synchronizable collection, in declaration order.
pub const DESCRIPTORS: [CollectionDescriptor; 14] = [
    CollectionDescriptor {
        collection: Collection::Users,
        foreign_keys: &[],
        append_only: false,
        protectable: false,
        group: ExportGroup::Users,
    },
    CollectionDescriptor {
        collection: Collection::Clients,
        foreign_keys: &[],
        append_only: false,
        protectable: false,
        group: ExportGroup::Clients,
    },
    library(Collection::Categories, &[]),
    library(
        Collection::Subcategories,
        &[fk("categoryId", Collection::Categories, true)],
    ),
    library(
        Collection::Articles,
        &[
            fk("categoryId", Collection::Categories, false),
            fk("subcategoryId", Collection::Subcategories, false),
        ],
    ),
    library(
        Collection::ArticleVersions,
        &[fk("articleId", Collection::Articles, true)],
    ),
    library(Collection::Kits, &[]),
    library(Collection::KitVersions, &[fk("kitId", Collection::Kits, true)]),
    library(Collection::Templates, &[]),
    library(Collection::Procedures, &[]),
    CollectionDescriptor {
        collection: Collection::BoatModels,
        foreign_keys: &[],
        append_only: false,
        protectable: true,
        group: ExportGroup::Library,
    },
    library(
        Collection::EquipmentItems,
        &[fk("boatModelId", Collection::BoatModels, false)],
    ),
    CollectionDescriptor {
        collection: Collection::Projects,
        foreign_keys: &[
            fk("clientId", Collection::Clients, true),
            fk("boatModelId", Collection::BoatModels, false),
        ],
        append_only: false,
        protectable: true,
        group: ExportGroup::Projects,
    },
    CollectionDescriptor {
        collection: Collection::AuditEntries,
        foreign_keys: &[],
        append_only: true,
        protectable: false,
        group: ExportGroup::AuditLog,
    },
];

/// Look up the descriptor of a collection.
pub fn descriptor(collection: Collection) -> &'static CollectionDescriptor {
    &DESCRIPTORS[declaration_index(collection)]
}

fn declaration_index(collection: Collection) -> usize {
    // DESCRIPTORS mirrors Collection::ALL, which mirrors the enum order.
    collection as usize
}

/// Collections whose records must exist before `collection`'s records can be written.
pub fn dependencies(collection: Collection) -> Vec<Collection> {
    let mut deps: Vec<Collection> = Vec::new();
    for key in descriptor(collection).foreign_keys {
        if !deps.contains(&key.target) {
            deps.push(key.target);
        }
    }
    deps
}

/// Sort a subset of collections so that every dependency precedes its
/// dependents. Dependencies outside the subset are ignored; ties are broken
/// by declaration order; duplicates are dropped.
pub fn order(subset: &[Collection]) -> Vec<Collection> {
    let mut pending: Vec<Collection> = Collection::ALL
        .iter()
        .copied()
        .filter(|c| subset.contains(c))
        .collect();
    let mut ordered: Vec<Collection> = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let ready = pending.iter().position(|candidate| {
            dependencies(*candidate)
                .iter()
                .all(|dep| !pending.contains(dep) || ordered.contains(dep))
        });
        match ready {
            Some(idx) => ordered.push(pending.remove(idx)),
            None => {
                tracing::error!(
                    subsystem = "transfer",
                    component = "collection",
                    remaining = ?pending,
                    "Cycle in collection dependency graph, falling back to declaration order"
                );
                ordered.append(&mut pending);
            }
        }
    }

    ordered
}
