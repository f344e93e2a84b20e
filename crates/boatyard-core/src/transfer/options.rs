//! Export and import options.
//!
//! Both structures enumerate every recognized toggle and reject unknown
//! keys on deserialization.

use serde::{Deserialize, Serialize};

use super::collection::{descriptor, ExportGroup};
use crate::models::Collection;

fn default_true() -> bool {
    true
}

// =============================================================================
// EXPORT
// =============================================================================

/// Which collections an export includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExportOptions {
    /// Export `projects`.
    #[serde(default = "default_true")]
    pub include_projects: bool,
    /// Export `clients`.
    #[serde(default = "default_true")]
    pub include_clients: bool,
    /// Export `users`.
    #[serde(default = "default_true")]
    pub include_users: bool,
    /// Keep credential fields on exported users. Off by default.
    #[serde(default)]
    pub include_user_passwords: bool,
    /// Export the shared library (articles, kits, categories, templates,
    /// procedures, boat models, equipment, and their versions).
    #[serde(default = "default_true")]
    pub include_library: bool,
    /// Export `auditEntries`.
    #[serde(default = "default_true")]
    pub include_audit_log: bool,
    /// Recorded in the manifest only. Binary documents are never bundled.
    #[serde(default)]
    pub include_documents: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_projects: true,
            include_clients: true,
            include_users: true,
            include_user_passwords: false,
            include_library: true,
            include_audit_log: true,
            include_documents: false,
        }
    }
}

impl ExportOptions {
    /// Every toggle on, credentials included.
    pub fn everything() -> Self {
        Self {
            include_projects: true,
            include_clients: true,
            include_users: true,
            include_user_passwords: true,
            include_library: true,
            include_audit_log: true,
            include_documents: true,
        }
    }

    /// Every toggle off. Produces a manifest-only bundle.
    pub fn nothing() -> Self {
        Self {
            include_projects: false,
            include_clients: false,
            include_users: false,
            include_user_passwords: false,
            include_library: false,
            include_audit_log: false,
            include_documents: false,
        }
    }

    /// Whether a collection is selected for export.
    pub fn includes(&self, collection: Collection) -> bool {
        match descriptor(collection).group {
            ExportGroup::Projects => self.include_projects,
            ExportGroup::Clients => self.include_clients,
            ExportGroup::Users => self.include_users,
            ExportGroup::Library => self.include_library,
            ExportGroup::AuditLog => self.include_audit_log,
        }
    }

    /// Selected collections in declaration order.
    pub fn collections(&self) -> Vec<Collection> {
        Collection::ALL
            .iter()
            .copied()
            .filter(|c| self.includes(*c))
            .collect()
    }
}

// =============================================================================
// IMPORT
// =============================================================================

/// How a collection that already holds data is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Only add; never delete existing records.
    #[default]
    Merge,
    /// Clear unprotected existing records first, then write incoming ones.
    Replace,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Merge => "merge",
            ImportMode::Replace => "replace",
        }
    }
}

/// Import mode, conflict policy, and one toggle per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImportOptions {
    #[serde(default)]
    pub mode: ImportMode,
    /// On an identity collision in merge mode, keep the existing record
    /// (true) or overwrite it with the incoming one (false).
    #[serde(default = "default_true")]
    pub skip_conflicts: bool,
    #[serde(default = "default_true")]
    pub users: bool,
    #[serde(default = "default_true")]
    pub clients: bool,
    #[serde(default = "default_true")]
    pub categories: bool,
    #[serde(default = "default_true")]
    pub subcategories: bool,
    #[serde(default = "default_true")]
    pub articles: bool,
    #[serde(default = "default_true")]
    pub article_versions: bool,
    #[serde(default = "default_true")]
    pub kits: bool,
    #[serde(default = "default_true")]
    pub kit_versions: bool,
    #[serde(default = "default_true")]
    pub templates: bool,
    #[serde(default = "default_true")]
    pub procedures: bool,
    #[serde(default = "default_true")]
    pub boat_models: bool,
    #[serde(default = "default_true")]
    pub equipment_items: bool,
    #[serde(default = "default_true")]
    pub projects: bool,
    #[serde(default = "default_true")]
    pub audit_entries: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            mode: ImportMode::Merge,
            skip_conflicts: true,
            users: true,
            clients: true,
            categories: true,
            subcategories: true,
            articles: true,
            article_versions: true,
            kits: true,
            kit_versions: true,
            templates: true,
            procedures: true,
            boat_models: true,
            equipment_items: true,
            projects: true,
            audit_entries: true,
        }
    }
}

impl ImportOptions {
    pub fn merge() -> Self {
        Self::default()
    }

    pub fn replace() -> Self {
        Self {
            mode: ImportMode::Replace,
            ..Self::default()
        }
    }

    pub fn with_skip_conflicts(mut self, skip_conflicts: bool) -> Self {
        self.skip_conflicts = skip_conflicts;
        self
    }

    /// Enable or disable a single collection.
    pub fn with_collection(mut self, collection: Collection, enabled: bool) -> Self {
        *self.toggle_mut(collection) = enabled;
        self
    }

    /// Whether a collection is enabled for import.
    pub fn includes(&self, collection: Collection) -> bool {
        match collection {
            Collection::Users => self.users,
            Collection::Clients => self.clients,
            Collection::Categories => self.categories,
            Collection::Subcategories => self.subcategories,
            Collection::Articles => self.articles,
            Collection::ArticleVersions => self.article_versions,
            Collection::Kits => self.kits,
            Collection::KitVersions => self.kit_versions,
            Collection::Templates => self.templates,
            Collection::Procedures => self.procedures,
            Collection::BoatModels => self.boat_models,
            Collection::EquipmentItems => self.equipment_items,
            Collection::Projects => self.projects,
            Collection::AuditEntries => self.audit_entries,
        }
    }

    fn toggle_mut(&mut self, collection: Collection) -> &mut bool {
        match collection {
            Collection::Users => &mut self.users,
            Collection::Clients => &mut self.clients,
            Collection::Categories => &mut self.categories,
            Collection::Subcategories => &mut self.subcategories,
            Collection::Articles => &mut self.articles,
            Collection::ArticleVersions => &mut self.article_versions,
            Collection::Kits => &mut self.kits,
            Collection::KitVersions => &mut self.kit_versions,
            Collection::Templates => &mut self.templates,
            Collection::Procedures => &mut self.procedures,
            Collection::BoatModels => &mut self.boat_models,
            Collection::EquipmentItems => &mut self.equipment_items,
            Collection::Projects => &mut self.projects,
            Collection::AuditEntries => &mut self.audit_entries,
        }
    }
}
