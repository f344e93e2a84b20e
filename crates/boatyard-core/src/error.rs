//! Error types for boatyard.

use thiserror::Error;

/// Result type alias using boatyard's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for boatyard operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Record store failed for a reason other than the database driver
    #[error("Store error: {0}")]
    Store(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    /// Whether this error means the backing store itself is unusable.
    ///
    /// Transfer operations abort on these; everything else is reported
    /// per record.
    pub fn is_fatal_store_error(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Store(_) | Error::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_store() {
        let err = Error::Store("storage unavailable".to_string());
        assert_eq!(err.to_string(), "Store error: storage unavailable");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("bundle has no manifest".to_string());
        assert_eq!(err.to_string(), "Invalid input: bundle has no manifest");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("unknown store backend".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown store backend");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => {
                assert!(!msg.is_empty());
            }
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_fatal_store_classification() {
        assert!(Error::Store("down".to_string()).is_fatal_store_error());
        assert!(Error::Io(std::io::Error::other("disk")).is_fatal_store_error());
        assert!(!Error::InvalidInput("bad".to_string()).is_fatal_store_error());
        assert!(!Error::NotFound("x".to_string()).is_fatal_store_error());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
