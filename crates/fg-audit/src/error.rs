// error.rs — Error types for the audit subsystem.
//
// Uses `thiserror` to derive the standard Rust `Error` trait.
// A write failure here is treated by the gateway as fatal to the
// request: an unrecorded security decision is worse than a rejected one.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during audit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Failed to open or create the audit log file.
    #[error("failed to open audit log at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to append an event after the bounded retries were exhausted.
    #[error("failed to append audit event after {attempts} attempt(s): {source}")]
    WriteFailed {
        attempts: usize,
        source: std::io::Error,
    },

    /// Failed to serialize or deserialize an event (malformed JSON).
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O failure on the read/export path.
    #[error("audit log I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The audit log has been tampered with — hash chain is broken.
    #[error("integrity check failed at line {line}: expected hash {expected}, got {actual}")]
    IntegrityViolation {
        line: usize,
        expected: String,
        actual: String,
    },
}
