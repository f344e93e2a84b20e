//! Protected-record detection.
//!
//! A record is protected when its configuration is frozen or when it pins
//! fixed versions of shared library entries. Protection is read from the
//! record itself; nothing is tracked on the side. Protected records are
//! never deleted or overwritten by an import.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::models::Record;

/// Fixed library versions a record was built against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryPins {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boat_model_version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_catalog_version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_version_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub procedure_version_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_by: Option<String>,
}

impl LibraryPins {
    /// Whether at least one library version is pinned.
    pub fn pins_anything(&self) -> bool {
        self.boat_model_version_id.is_some()
            || self.equipment_catalog_version_id.is_some()
            || !self.template_version_ids.is_empty()
            || !self.procedure_version_ids.is_empty()
    }
}

/// Protection status of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Protection {
    pub frozen: bool,
    pub pinned: bool,
}

impl Protection {
    pub fn is_protected(&self) -> bool {
        self.frozen || self.pinned
    }

    /// Human-readable reason, empty when unprotected.
    pub fn reason(&self) -> &'static str {
        match (self.frozen, self.pinned) {
            (true, true) => "configuration frozen and library versions pinned",
            (true, false) => "configuration frozen",
            (false, true) => "library versions pinned",
            (false, false) => "",
        }
    }
}

/// Capability check: "is this record protected".
pub trait Protectable {
    fn protection(&self) -> Protection;

    fn is_protected(&self) -> bool {
        self.protection().is_protected()
    }
}

impl Protectable for Record {
    fn protection(&self) -> Protection {
        let frozen = is_true(self.get("isFrozen"))
            || is_true(self.get("configuration").and_then(|c| c.get("isFrozen")));

        let pinned = match self.get("libraryPins") {
            None | Some(JsonValue::Null) => false,
            Some(raw) => match serde_json::from_value::<LibraryPins>(raw.clone()) {
                Ok(pins) => pins.pins_anything(),
                Err(e) => {
                    // Unreadable pins are treated as pins: never destroy what
                    // we cannot interpret.
                    warn!(
                        subsystem = "transfer",
                        component = "protection",
                        record_id = self.id().as_deref().unwrap_or("?"),
                        error = %e,
                        "Unreadable libraryPins block, treating record as pinned"
                    );
                    true
                }
            },
        };

        Protection { frozen, pinned }
    }
}

fn is_true(value: Option<&JsonValue>) -> bool {
    matches!(value, Some(JsonValue::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: JsonValue) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_plain_record_is_unprotected() {
        let r = record(json!({"id": "P1", "clientId": "C1"}));
        assert!(!r.is_protected());
        assert_eq!(r.protection().reason(), "");
    }

    #[test]
    fn test_frozen_configuration() {
        let r = record(json!({"id": "P1", "configuration": {"isFrozen": true, "frozenAt": "2026-01-01"}}));
        let p = r.protection();
        assert!(p.frozen);
        assert!(!p.pinned);
        assert_eq!(p.reason(), "configuration frozen");

        let r = record(json!({"id": "M1", "isFrozen": true}));
        assert!(r.is_protected());

        let r = record(json!({"id": "P2", "configuration": {"isFrozen": false}}));
        assert!(!r.is_protected());
    }

    #[test]
    fn test_library_pins() {
        let r = record(json!({
            "id": "P1",
            "libraryPins": {
                "boatModelVersionId": "BMV-3",
                "templateVersionIds": ["T1@2"],
                "pinnedAt": "2026-03-01T10:00:00Z",
                "pinnedBy": "anna"
            }
        }));
        assert!(r.protection().pinned);
        assert_eq!(r.protection().reason(), "library versions pinned");
    }

    #[test]
    fn test_empty_pins_block_is_not_a_pin() {
        let r = record(json!({"id": "P1", "libraryPins": {"pinnedAt": "2026-03-01"}}));
        assert!(!r.is_protected());
        let r = record(json!({"id": "P1", "libraryPins": null}));
        assert!(!r.is_protected());
    }

    #[test]
    fn test_malformed_pins_are_treated_as_pinned() {
        let r = record(json!({"id": "P1", "libraryPins": "yes"}));
        assert!(r.is_protected());
    }

    #[test]
    fn test_frozen_and_pinned() {
        let r = record(json!({
            "id": "P1",
            "configuration": {"isFrozen": true},
            "libraryPins": {"procedureVersionIds": ["PR1@4"]}
        }));
        assert_eq!(
            r.protection().reason(),
            "configuration frozen and library versions pinned"
        );
    }
}
