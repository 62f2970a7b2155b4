// error.rs — Error types for identity resolution.

use thiserror::Error;

/// Errors that can occur while resolving an identity token.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The token matches no recognized naming convention.
    ///
    /// This is terminal for the request: an unclassifiable caller is
    /// denied, never defaulted to the lowest role.
    #[error("identity token '{raw_id}' matches no recognized naming convention")]
    UnknownIdentity { raw_id: String },
}
