// error.rs — Internal error types for the gateway.
//
// These never cross the caller boundary: every failure a caller can
// observe is the single generic ToolResult shape. GatewayError exists
// for construction, configuration, and for the host process (CLI,
// tests) to see why the gateway itself could not come up.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The configuration file could not be parsed.
    #[error("invalid config at {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Guardrail rule compilation failed at startup.
    #[error("guardrail error: {0}")]
    Guardrail(#[from] fg_guardrail::GuardrailError),

    /// The audit sink rejected a write after its retry budget.
    #[error("audit error: {0}")]
    Audit(#[from] fg_audit::AuditError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
