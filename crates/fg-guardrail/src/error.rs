// error.rs — Error types for the guardrail subsystem.

use thiserror::Error;

/// Errors that can occur while building guardrail rules.
#[derive(Debug, Error)]
pub enum GuardrailError {
    /// A rule pattern is not a valid regular expression.
    #[error("invalid pattern for rule '{name}': {source}")]
    InvalidPattern {
        name: String,
        source: regex::Error,
    },
}
