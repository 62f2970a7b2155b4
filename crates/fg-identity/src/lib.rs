//! # fg-identity
//!
//! Role and capability resolution for FinGuard.
//!
//! An identity token carries no inherent trust: the role is derived
//! deterministically from the token's prefix by an explicit, auditable
//! mapping table, never from anything the client supplies alongside it.
//! The derived [`Identity`] is immutable for the lifetime of a session
//! and is the sole input to every downstream authorization decision —
//! which means decisions are reproducible from the audit log alone.
//!
//! ## Quick Example
//!
//! ```rust
//! use fg_identity::IdentityResolver;
//!
//! let resolver = IdentityResolver::default();
//! let identity = resolver.resolve("senior_042").unwrap();
//! assert!(identity.can(fg_identity::Capability::SaveReport));
//! ```

pub mod error;
pub mod resolver;
pub mod role;

pub use error::IdentityError;
pub use resolver::{Identity, IdentityResolver, RoleClassifier};
pub use role::{Capability, Role};
