//! Structural validation of inbound export data.
//!
//! This is the first gate for anything read from outside: it checks shape,
//! not schema compatibility.

use serde_json::Value as JsonValue;

use crate::models::json_type_name;

/// Check that `data` is an object with a manifest carrying a version.
pub fn validate_export_data(data: &JsonValue) -> Result<(), String> {
    let root = match data {
        JsonValue::Null => return Err("Export data is null".to_string()),
        JsonValue::Object(root) => root,
        other => {
            return Err(format!(
                "Export data must be an object, got {}",
                json_type_name(other)
            ))
        }
    };

    let manifest = match root.get("manifest") {
        None | Some(JsonValue::Null) => {
            return Err("Export data is missing its manifest".to_string())
        }
        Some(JsonValue::Object(manifest)) => manifest,
        Some(other) => {
            return Err(format!(
                "Manifest must be an object, got {}",
                json_type_name(other)
            ))
        }
    };

    match manifest.get("version") {
        None | Some(JsonValue::Null) => Err("Manifest is missing a version".to_string()),
        Some(JsonValue::String(v)) if !v.trim().is_empty() => Ok(()),
        Some(JsonValue::String(_)) => Err("Manifest version is empty".to_string()),
        Some(other) => Err(format!(
            "Manifest version must be a string, got {}",
            json_type_name(other)
        )),
    }
}
