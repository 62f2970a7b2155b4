// error.rs — Error types for tool collaborators.

use thiserror::Error;

/// Errors a tool handler can return from `invoke`.
///
/// These are *internal* failure details: the middleware records them in
/// the audit log and returns only the generic failure shape upstream.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The handler could not produce a result.
    #[error("tool '{tool}' failed: {message}")]
    Failed { tool: String, message: String },

    /// A required argument was absent or had the wrong type.
    #[error("missing or invalid argument '{name}'")]
    InvalidArgument { name: String },

    /// Filesystem failure inside a tool (e.g. report persistence).
    #[error("I/O error in tool '{tool}': {source}")]
    Io {
        tool: String,
        source: std::io::Error,
    },
}
