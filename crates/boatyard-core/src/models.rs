//! Core data models for boatyard.
//!
//! The transfer engine does not interpret business fields. It sees every
//! persisted entity as a [`Record`]: a JSON object with a stable `id`, stored
//! in one of the named [`Collection`]s.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// =============================================================================
// COLLECTIONS
// =============================================================================

/// A named collection of records that takes part in export/import.
///
/// The wire name (`as_str`) is the bundle key and the store table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Clients,
    Categories,
    Subcategories,
    Articles,
    ArticleVersions,
    Kits,
    KitVersions,
    Templates,
    Procedures,
    BoatModels,
    EquipmentItems,
    Projects,
    AuditEntries,
}

impl Collection {
    /// All collections in declaration order.
    pub const ALL: [Collection; 14] = [
        Collection::Users,
        Collection::Clients,
        Collection::Categories,
        Collection::Subcategories,
        Collection::Articles,
        Collection::ArticleVersions,
        Collection::Kits,
        Collection::KitVersions,
        Collection::Templates,
        Collection::Procedures,
        Collection::BoatModels,
        Collection::EquipmentItems,
        Collection::Projects,
        Collection::AuditEntries,
    ];

    /// Wire name used as bundle key and store table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Clients => "clients",
            Collection::Categories => "categories",
            Collection::Subcategories => "subcategories",
            Collection::Articles => "articles",
            Collection::ArticleVersions => "articleVersions",
            Collection::Kits => "kits",
            Collection::KitVersions => "kitVersions",
            Collection::Templates => "templates",
            Collection::Procedures => "procedures",
            Collection::BoatModels => "boatModels",
            Collection::EquipmentItems => "equipmentItems",
            Collection::Projects => "projects",
            Collection::AuditEntries => "auditEntries",
        }
    }

    /// Singular human-readable name of one record, used in error messages.
    pub fn record_label(&self) -> &'static str {
        match self {
            Collection::Users => "user",
            Collection::Clients => "client",
            Collection::Categories => "category",
            Collection::Subcategories => "subcategory",
            Collection::Articles => "article",
            Collection::ArticleVersions => "article version",
            Collection::Kits => "kit",
            Collection::KitVersions => "kit version",
            Collection::Templates => "template",
            Collection::Procedures => "procedure",
            Collection::BoatModels => "boat model",
            Collection::EquipmentItems => "equipment item",
            Collection::Projects => "project",
            Collection::AuditEntries => "audit entry",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown collection: {}", s))
    }
}

// Serialized as the bare wire name so that it can key JSON maps.
impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Collection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// Name of the identity field every record carries.
pub const ID_FIELD: &str = "id";

/// One persisted entity, carried verbatim as a JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, JsonValue>);

impl Record {
    /// Wrap an existing JSON object.
    pub fn new(fields: Map<String, JsonValue>) -> Self {
        Self(fields)
    }

    /// Build a record from an arbitrary JSON value, which must be an object.
    pub fn from_value(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(fields) => Ok(Self(fields)),
            other => Err(Error::InvalidInput(format!(
                "Record must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Normalized identity: a non-empty string, or an integer rendered in
    /// decimal. `None` when the record has no usable `id`.
    pub fn id(&self) -> Option<String> {
        self.reference(ID_FIELD)
    }

    /// Normalized value of a reference-like field (same rules as `id`).
    pub fn reference(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
            JsonValue::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
            _ => None,
        }
    }

    /// Whether a field is present with a non-null value.
    pub fn has(&self, field: &str) -> bool {
        !matches!(self.0.get(field), None | Some(JsonValue::Null))
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<JsonValue> {
        self.0.remove(field)
    }

    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.0)
    }
}

impl TryFrom<JsonValue> for Record {
    type Error = Error;

    fn try_from(value: JsonValue) -> Result<Self> {
        Record::from_value(value)
    }
}

impl From<Record> for JsonValue {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

/// JSON type name for diagnostics.
pub fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

// =============================================================================
// QUERY FILTER
// =============================================================================

/// Equality filter over top-level record fields.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    equals: BTreeMap<String, JsonValue>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.equals.insert(field.into(), value.into());
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.equals
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }

    /// The filter as a JSON object, suitable for JSONB containment queries.
    pub fn as_json(&self) -> JsonValue {
        JsonValue::Object(
            self.equals
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.equals.is_empty()
    }
}
