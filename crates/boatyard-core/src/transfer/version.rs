//! Bundle schema versioning.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current bundle schema version written by this engine.
pub const CURRENT_SCHEMA_VERSION: &str = "1.0.0";

/// Semantic version for bundle compatibility checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Parse a version string (e.g., "1.0.0").
    ///
    /// Pre-release and build suffixes (`1.2.0-beta.1`, `1.2.0+abc`) are
    /// accepted and ignored.
    pub fn parse(s: &str) -> Result<Self, String> {
        let core = s
            .trim()
            .split(['-', '+'])
            .next()
            .unwrap_or_default();
        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(format!("Invalid version format: {}", s));
        }

        let major = parts[0]
            .parse::<u64>()
            .map_err(|_| format!("Invalid major version: {}", parts[0]))?;
        let minor = parts[1]
            .parse::<u64>()
            .map_err(|_| format!("Invalid minor version: {}", parts[1]))?;
        let patch = parts[2]
            .parse::<u64>()
            .map_err(|_| format!("Invalid patch version: {}", parts[2]))?;

        Ok(Version {
            major,
            minor,
            patch,
        })
    }

    /// The engine's own schema version.
    pub fn current() -> Self {
        // CURRENT_SCHEMA_VERSION is a well-formed literal; the fallback is unreachable.
        Version::parse(CURRENT_SCHEMA_VERSION).unwrap_or(Version {
            major: 1,
            minor: 0,
            patch: 0,
        })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse_valid() {
        let v = Version::parse("1.0.0").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 0);
        assert_eq!(v.patch, 0);

        let v = Version::parse("2.3.4").unwrap();
        assert_eq!(v, Version { major: 2, minor: 3, patch: 4 });
    }

    #[test]
    fn test_version_parse_ignores_prerelease_and_build() {
        assert_eq!(Version::parse("1.2.0-beta.1").unwrap().to_string(), "1.2.0");
        assert_eq!(Version::parse("1.2.3+build.7").unwrap().to_string(), "1.2.3");
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.0").is_err());
        assert!(Version::parse("1.0.0.0").is_err());
        assert!(Version::parse("a.b.c").is_err());
        assert!(Version::parse("1.0.x").is_err());
        assert!(Version::parse("").is_err());
    }

    #[test]
    fn test_version_ordering() {
        let v1 = Version::parse("1.0.0").unwrap();
        let v2 = Version::parse("1.0.1").unwrap();
        let v3 = Version::parse("1.1.0").unwrap();
        let v4 = Version::parse("2.0.0").unwrap();

        assert!(v1 < v2);
        assert!(v2 < v3);
        assert!(v3 < v4);
    }

    #[test]
    fn test_current_version_is_valid() {
        let current = Version::parse(CURRENT_SCHEMA_VERSION).unwrap();
        assert_eq!(current, Version::current());
    }
}
