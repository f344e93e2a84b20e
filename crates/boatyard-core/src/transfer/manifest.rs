//! Bundle manifest: provenance and scope of an export.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

use super::options::ExportOptions;
use super::version::CURRENT_SCHEMA_VERSION;
use crate::models::Record;

/// Snapshot of the export toggles, keyed by wire name.
pub type ExportOptionsSnapshot = BTreeMap<String, bool>;

/// Who runs a transfer, and with which application build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferContext {
    pub operator: String,
    pub app_version: String,
}

impl TransferContext {
    /// Context for `operator`, stamped with this crate's version.
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_app_version(mut self, app_version: impl Into<String>) -> Self {
        self.app_version = app_version.into();
        self
    }
}

/// Versioned bundle header.
///
/// Counts and checksums are keyed by collection wire name so that a manifest
/// written by a newer schema with extra collections still decodes.
///
/// Only `version` is structural. The provenance fields decode leniently:
/// values of the wrong type read as absent, and map entries of the wrong type
/// are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Bundle schema version (e.g., "1.0.0").
    #[serde(rename = "version")]
    pub schema_version: String,
    /// Application version that produced the bundle.
    #[serde(default, deserialize_with = "lenient_string")]
    pub app_version: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub exported_by: String,
    #[serde(default, deserialize_with = "lenient_map")]
    pub counts: BTreeMap<String, usize>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub options: ExportOptionsSnapshot,
    /// SHA-256 (hex) of each exported collection's compact JSON encoding.
    #[serde(
        default,
        deserialize_with = "lenient_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub checksums: BTreeMap<String, String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => parse_timestamp(&s),
        _ => None,
    })
}

fn lenient_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let JsonValue::Object(entries) = JsonValue::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| serde_json::from_value(value).ok().map(|v| (key, v)))
        .collect())
}

/// RFC 3339, or a bare `YYYY-MM-DD` date read as midnight UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s.trim()) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}

/// Build a manifest from values the assembler already computed.
pub fn build_manifest(
    options: &ExportOptions,
    context: &TransferContext,
    exported_at: DateTime<Utc>,
    counts: BTreeMap<String, usize>,
    checksums: BTreeMap<String, String>,
) -> Manifest {
    Manifest {
        schema_version: CURRENT_SCHEMA_VERSION.to_string(),
        app_version: context.app_version.clone(),
        exported_at: Some(exported_at),
        exported_by: context.operator.clone(),
        counts,
        options: options_snapshot(options),
        checksums,
    }
}

/// Flatten export options into their wire-named toggles.
pub fn options_snapshot(options: &ExportOptions) -> ExportOptionsSnapshot {
    match serde_json::to_value(options) {
        Ok(serde_json::Value::Object(map)) => map
            .into_iter()
            .filter_map(|(k, v)| v.as_bool().map(|b| (k, b)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// SHA-256 (hex) of a collection's compact JSON encoding.
pub fn collection_checksum(records: &[Record]) -> String {
    let mut hasher = Sha256::new();
    // Vec<Record> of JSON objects always serializes.
    hasher.update(serde_json::to_vec(records).unwrap_or_default());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_build_manifest_fields() {
        let mut counts = BTreeMap::new();
        counts.insert("clients".to_string(), 2);
        let ctx = TransferContext::new("anna").with_app_version("3.2.1");

        let manifest = build_manifest(&ExportOptions::default(), &ctx, at(), counts, BTreeMap::new());

        assert_eq!(manifest.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(manifest.app_version, "3.2.1");
        assert_eq!(manifest.exported_by, "anna");
        assert_eq!(manifest.exported_at, Some(at()));
        assert_eq!(manifest.counts.get("clients"), Some(&2));
        assert_eq!(manifest.options.get("includeUserPasswords"), Some(&false));
        assert_eq!(manifest.options.get("includeProjects"), Some(&true));
        assert_eq!(manifest.options.len(), 7);
    }

    #[test]
    fn test_manifest_wire_format() {
        let ctx = TransferContext::new("anna").with_app_version("3.2.1");
        let manifest = build_manifest(
            &ExportOptions::nothing(),
            &ctx,
            at(),
            BTreeMap::new(),
            BTreeMap::new(),
        );
        let value = serde_json::to_value(&manifest).unwrap();

        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["appVersion"], "3.2.1");
        assert_eq!(value["exportedAt"], "2026-05-04T12:30:00Z");
        assert_eq!(value["exportedBy"], "anna");
        assert_eq!(value["options"]["includeLibrary"], false);
        assert!(value.get("checksums").is_none());
    }

    #[test]
    fn test_minimal_manifest_decodes() {
        let manifest: Manifest = serde_json::from_value(json!({"version": "1.0.0"})).unwrap();
        assert_eq!(manifest.schema_version, "1.0.0");
        assert!(manifest.exported_at.is_none());
        assert!(manifest.counts.is_empty());
    }

    #[test]
    fn test_odd_provenance_decodes_leniently() {
        let manifest: Manifest = serde_json::from_value(json!({
            "version": "1.0.0",
            "appVersion": 3,
            "exportedBy": null,
            "exportedAt": "last tuesday",
            "counts": {"clients": 2, "projects": "two", "kits": -1},
            "options": {"format": "json", "includeUsers": false},
            "checksums": ["not", "a", "map"]
        }))
        .unwrap();

        assert_eq!(manifest.schema_version, "1.0.0");
        assert_eq!(manifest.app_version, "");
        assert_eq!(manifest.exported_by, "");
        assert!(manifest.exported_at.is_none());
        assert_eq!(manifest.counts.len(), 1);
        assert_eq!(manifest.counts.get("clients"), Some(&2));
        assert_eq!(manifest.options.len(), 1);
        assert_eq!(manifest.options.get("includeUsers"), Some(&false));
        assert!(manifest.checksums.is_empty());
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert_eq!(parse_timestamp("2026-05-04T12:30:00Z"), Some(at()));
        assert_eq!(parse_timestamp("2026-05-04T14:30:00+02:00"), Some(at()));
        assert_eq!(
            parse_timestamp("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("01/05/2024"), None);
    }

    #[test]
    fn test_checksum_is_stable_and_content_sensitive() {
        let a = vec![Record::from_value(json!({"id": "C1", "name": "Acme"})).unwrap()];
        let b = a.clone();
        let c = vec![Record::from_value(json!({"id": "C1", "name": "Acme Ltd"})).unwrap()];

        assert_eq!(collection_checksum(&a), collection_checksum(&b));
        assert_ne!(collection_checksum(&a), collection_checksum(&c));
        assert_eq!(collection_checksum(&a).len(), 64);
    }
}
