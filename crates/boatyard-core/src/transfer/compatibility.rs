//! Bundle schema compatibility checking.
//!
//! Compatibility is advisory. Every class produces zero or more warning
//! strings for the operator; none of them blocks a preview or an import.

use super::version::{Version, CURRENT_SCHEMA_VERSION};

/// Result of comparing a bundle schema version with this engine's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// Same version.
    Compatible,

    /// Same major, older minor or patch. Shapes are a subset of ours.
    OlderMinor { bundle_version: String },

    /// Same major, newer minor. Unknown fields are carried verbatim.
    NewerMinor { bundle_version: String },

    /// Different major version.
    MajorMismatch { bundle_version: String },

    /// The version string is not `major.minor.patch`.
    Unparseable { bundle_version: String, reason: String },
}

impl Compatibility {
    /// Operator-facing warnings for this class.
    pub fn warnings(&self) -> Vec<String> {
        match self {
            Compatibility::Compatible | Compatibility::OlderMinor { .. } => Vec::new(),
            Compatibility::NewerMinor { bundle_version } => vec![format!(
                "Bundle was created with a newer schema version ({}) than current ({}); \
                 fields unknown to this version are imported as-is",
                bundle_version, CURRENT_SCHEMA_VERSION
            )],
            Compatibility::MajorMismatch { bundle_version } => vec![format!(
                "Bundle schema version {} may not be fully compatible with current schema version {}",
                bundle_version, CURRENT_SCHEMA_VERSION
            )],
            Compatibility::Unparseable {
                bundle_version,
                reason,
            } => vec![format!(
                "Bundle schema version '{}' could not be read ({}); the bundle may not be fully compatible",
                bundle_version, reason
            )],
        }
    }
}

/// Classify a bundle's manifest version against the current schema version.
pub fn check_schema_compatibility(bundle_version: &str) -> Compatibility {
    let current = Version::current();

    let bundle = match Version::parse(bundle_version) {
        Ok(v) => v,
        Err(reason) => {
            return Compatibility::Unparseable {
                bundle_version: bundle_version.to_string(),
                reason,
            }
        }
    };

    if bundle.major != current.major {
        return Compatibility::MajorMismatch {
            bundle_version: bundle_version.to_string(),
        };
    }

    match bundle.cmp(&current) {
        std::cmp::Ordering::Equal => Compatibility::Compatible,
        std::cmp::Ordering::Less => Compatibility::OlderMinor {
            bundle_version: bundle_version.to_string(),
        },
        std::cmp::Ordering::Greater if bundle.minor > current.minor => {
            Compatibility::NewerMinor {
                bundle_version: bundle_version.to_string(),
            }
        }
        // Newer patch only: same shapes.
        std::cmp::Ordering::Greater => Compatibility::Compatible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_version_compatible() {
        let result = check_schema_compatibility(CURRENT_SCHEMA_VERSION);
        assert_eq!(result, Compatibility::Compatible);
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_newer_patch_compatible() {
        assert_eq!(check_schema_compatibility("1.0.7"), Compatibility::Compatible);
    }

    #[test]
    fn test_newer_minor_warns() {
        let result = check_schema_compatibility("1.1.0");
        match &result {
            Compatibility::NewerMinor { bundle_version } => assert_eq!(bundle_version, "1.1.0"),
            _ => panic!("Expected NewerMinor, got {:?}", result),
        }
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_different_major_warns_but_is_advisory() {
        let result = check_schema_compatibility("2.0.0");
        assert_eq!(
            result,
            Compatibility::MajorMismatch {
                bundle_version: "2.0.0".to_string()
            }
        );
        let warnings = result.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("may not be fully compatible"));

        assert!(matches!(
            check_schema_compatibility("0.9.0"),
            Compatibility::MajorMismatch { .. }
        ));
    }

    #[test]
    fn test_invalid_version_warns() {
        let result = check_schema_compatibility("invalid");
        match &result {
            Compatibility::Unparseable { reason, .. } => {
                assert!(reason.contains("Invalid version format"));
            }
            _ => panic!("Expected Unparseable, got {:?}", result),
        }
        assert!(result.warnings()[0].contains("may not be fully compatible"));
    }
}
