//! Server configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `STORE_BACKEND` | `memory` (`memory` or `postgres`) |
//! | `DATABASE_URL` | `postgres://localhost/boatyard` |
//! | `MAX_BUNDLE_BYTES` | 64 MiB |

use std::str::FromStr;

use boatyard_core::{Error, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/boatyard";
pub const DEFAULT_MAX_BUNDLE_BYTES: usize = 64 * 1024 * 1024;

/// Where records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Postgres => "postgres",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            other => Err(Error::Config(format!(
                "STORE_BACKEND must be 'memory' or 'postgres', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    pub database_url: String,
    pub max_bundle_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backend: StoreBackend::Memory,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_bundle_bytes: DEFAULT_MAX_BUNDLE_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got '{}'", raw)))?,
            None => defaults.port,
        };
        let backend = match lookup("STORE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => defaults.backend,
        };
        let max_bundle_bytes = match lookup("MAX_BUNDLE_BYTES") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                Error::Config(format!("MAX_BUNDLE_BYTES must be a byte count, got '{}'", raw))
            })?,
            None => defaults.max_bundle_bytes,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            backend,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_bundle_bytes,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
