//! The exported document: a manifest plus zero or more collections.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::manifest::Manifest;
use super::validate::validate_export_data;
use crate::error::{Error, Result};
use crate::models::{json_type_name, Collection, Record};

/// A manifest and the collections that were exported.
///
/// An absent collection was not exported; an empty one was exported but
/// had no records. Top-level keys that name no known collection are kept
/// aside as `unrecognized` and never written; they do not fail the decode.
/// Entries of a collection array that are not JSON objects are likewise kept
/// aside as [`RejectedEntry`] values and reported per record on import.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub manifest: Manifest,
    collections: BTreeMap<Collection, Vec<Record>>,
    rejected: BTreeMap<Collection, Vec<RejectedEntry>>,
    unrecognized: Vec<String>,
}

/// A collection entry that is not a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedEntry {
    /// Position in the collection array as written in the bundle.
    pub index: usize,
    /// JSON type found instead of an object (e.g. "a string").
    pub found: &'static str,
}

impl Bundle {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            collections: BTreeMap::new(),
            rejected: BTreeMap::new(),
            unrecognized: Vec::new(),
        }
    }

    pub fn with_collection(mut self, collection: Collection, records: Vec<Record>) -> Self {
        self.insert_collection(collection, records);
        self
    }

    pub fn insert_collection(&mut self, collection: Collection, records: Vec<Record>) {
        self.collections.insert(collection, records);
    }

    /// Records of a collection, `None` when it was not exported.
    pub fn collection(&self, collection: Collection) -> Option<&[Record]> {
        self.collections.get(&collection).map(Vec::as_slice)
    }

    /// Collections present in the bundle, in declaration order.
    pub fn present(&self) -> Vec<Collection> {
        self.collections.keys().copied().collect()
    }

    /// Entries of `collection` that could not be decoded as records.
    pub fn rejected(&self, collection: Collection) -> &[RejectedEntry] {
        self.rejected.get(&collection).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of entries the bundle carries for `collection`, decodable or not.
    pub fn entry_count(&self, collection: Collection) -> usize {
        self.collection(collection).map_or(0, <[Record]>::len) + self.rejected(collection).len()
    }

    /// Position in the original array of the `idx`-th decoded record.
    pub fn source_index(&self, collection: Collection, idx: usize) -> usize {
        let mut pos = idx;
        for entry in self.rejected(collection) {
            if entry.index <= pos {
                pos += 1;
            } else {
                break;
            }
        }
        pos
    }

    /// Top-level keys that were ignored because no collection has that name.
    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }

    /// Validate and decode an inbound JSON document.
    pub fn from_value(value: JsonValue) -> Result<Self> {
        validate_export_data(&value).map_err(Error::InvalidInput)?;

        let JsonValue::Object(mut root) = value else {
            return Err(Error::InvalidInput("Export data must be an object".to_string()));
        };
        let manifest_value = root.remove("manifest").unwrap_or(JsonValue::Null);
        let manifest: Manifest = serde_json::from_value(manifest_value)
            .map_err(|e| Error::InvalidInput(format!("Invalid manifest: {}", e)))?;

        let mut bundle = Bundle::new(manifest);
        for (key, value) in root {
            let Ok(collection) = key.parse::<Collection>() else {
                bundle.unrecognized.push(key);
                continue;
            };
            let items = match value {
                JsonValue::Array(items) => items,
                other => {
                    return Err(Error::InvalidInput(format!(
                        "Collection '{}' must be an array, got {}",
                        key,
                        json_type_name(&other)
                    )))
                }
            };
            let mut records = Vec::with_capacity(items.len());
            let mut rejected = Vec::new();
            for (index, item) in items.into_iter().enumerate() {
                match item {
                    JsonValue::Object(fields) => records.push(Record::new(fields)),
                    other => rejected.push(RejectedEntry {
                        index,
                        found: json_type_name(&other),
                    }),
                }
            }
            if !rejected.is_empty() {
                bundle.rejected.insert(collection, rejected);
            }
            bundle.collections.insert(collection, records);
        }
        Ok(bundle)
    }

    /// Validate and decode a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)
            .map_err(|e| Error::InvalidInput(format!("Export data is not valid JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn to_value(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for Bundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.collections.len()))?;
        map.serialize_entry("manifest", &self.manifest)?;
        for (collection, records) in &self.collections {
            map.serialize_entry(collection.as_str(), records)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Bundle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Bundle::from_value(value).map_err(de::Error::custom)
    }
}
