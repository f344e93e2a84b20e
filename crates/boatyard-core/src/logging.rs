//! Structured logging schema and field name constants for boatyard.
//!
//! All crates use these names for structured logging fields so that log
//! aggregation tools can query transfers, stores, and HTTP requests the same
//! way.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, record skipped or kept |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Per-collection decisions, config choices |
//! | TRACE | Per-record iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the HTTP request.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "transfer", "store", "database"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "export", "preview", "import", "memory", "records", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "export_data", "preview_import", "import_data", "save"
pub const OPERATION: &str = "op";

/// Operator performing an export or import.
pub const OPERATOR: &str = "operator";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Synchronized collection name (wire form, e.g. "articleVersions").
pub const COLLECTION: &str = "collection";

/// Record identity within its collection.
pub const RECORD_ID: &str = "record_id";

/// Import mode ("merge", "replace").
pub const IMPORT_MODE: &str = "mode";

/// Bundle schema version.
pub const SCHEMA_VERSION: &str = "schema_version";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned or written.
pub const RESULT_COUNT: &str = "result_count";

/// Number of records imported.
pub const IMPORTED: &str = "imported";

/// Number of records skipped.
pub const SKIPPED: &str = "skipped";

/// Number of protected records kept by a replace pass.
pub const PRESERVED: &str = "preserved";

/// Number of per-record errors.
pub const ERROR_COUNT: &str = "error_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Every field name in the schema.
pub const ALL_FIELDS: &[&str] = &[
    REQUEST_ID,
    SUBSYSTEM,
    COMPONENT,
    OPERATION,
    OPERATOR,
    COLLECTION,
    RECORD_ID,
    IMPORT_MODE,
    SCHEMA_VERSION,
    DURATION_MS,
    RESULT_COUNT,
    IMPORTED,
    SKIPPED,
    PRESERVED,
    ERROR_COUNT,
    SUCCESS,
    ERROR_MSG,
];
