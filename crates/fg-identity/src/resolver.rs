// resolver.rs — Identity resolution from opaque tokens.
//
// Classification is a table of (prefix, role) pairs checked in order.
// The table is data, not inline string checks, so the rule can be audited
// and swapped without touching the pipeline. First matching prefix wins;
// no match is an error, never a default role.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::role::{Capability, Role};

/// A resolved identity — immutable for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// The opaque token as presented by the caller.
    pub raw_id: String,
    /// The role derived from the token prefix.
    pub role: Role,
    /// The capability set granted by the role's permission matrix.
    pub capabilities: BTreeSet<Capability>,
    /// When this identity was resolved.
    pub resolved_at: DateTime<Utc>,
}

impl Identity {
    /// Whether this identity holds the given capability.
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// An ordered prefix → role mapping table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleClassifier {
    rules: Vec<(String, Role)>,
}

impl RoleClassifier {
    /// Build a classifier from explicit (prefix, role) pairs, checked in order.
    pub fn new(rules: Vec<(String, Role)>) -> Self {
        Self { rules }
    }

    /// Classify a raw token. Pure and deterministic: same input, same role.
    pub fn classify(&self, raw_id: &str) -> Result<Role, IdentityError> {
        for (prefix, role) in &self.rules {
            if raw_id.starts_with(prefix.as_str()) {
                return Ok(*role);
            }
        }
        Err(IdentityError::UnknownIdentity {
            raw_id: raw_id.to_string(),
        })
    }
}

impl Default for RoleClassifier {
    /// The desk's standard naming convention.
    fn default() -> Self {
        Self::new(vec![
            ("senior_".to_string(), Role::Senior),
            ("analyst_".to_string(), Role::Junior),
            ("junior_".to_string(), Role::Junior),
        ])
    }
}

/// Resolves opaque tokens into [`Identity`] values.
///
/// Stateless apart from the classification table: no network calls, no
/// caches, nothing the caller can influence beyond the token itself.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    classifier: RoleClassifier,
}

impl IdentityResolver {
    pub fn new(classifier: RoleClassifier) -> Self {
        Self { classifier }
    }

    /// Resolve a token to a full identity, or fail if it is unclassifiable.
    pub fn resolve(&self, raw_id: &str) -> Result<Identity, IdentityError> {
        let role = self.classifier.classify(raw_id)?;
        tracing::debug!(raw_id, role = role.as_str(), "identity resolved");
        Ok(Identity {
            raw_id: raw_id.to_string(),
            role,
            capabilities: role.capability_set(),
            resolved_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn senior_prefix_resolves_to_senior() {
        let resolver = IdentityResolver::default();
        let identity = resolver.resolve("senior_042").unwrap();
        assert_eq!(identity.role, Role::Senior);
        assert!(identity.can(Capability::SaveReport));
    }

    #[test]
    fn analyst_prefix_resolves_to_junior() {
        let resolver = IdentityResolver::default();
        let identity = resolver.resolve("analyst_007").unwrap();
        assert_eq!(identity.role, Role::Junior);
        assert!(!identity.can(Capability::SaveReport));
    }

    #[test]
    fn unrecognized_prefix_is_an_error() {
        let resolver = IdentityResolver::default();
        match resolver.resolve("root") {
            Err(IdentityError::UnknownIdentity { raw_id }) => assert_eq!(raw_id, "root"),
            other => panic!("expected UnknownIdentity, got {:?}", other),
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        // Same token twice → identical role and capability set.
        let resolver = IdentityResolver::default();
        let a = resolver.resolve("analyst_007").unwrap();
        let b = resolver.resolve("analyst_007").unwrap();
        assert_eq!(a.role, b.role);
        assert_eq!(a.capabilities, b.capabilities);
    }

    #[test]
    fn first_matching_prefix_wins() {
        // A deliberately overlapping table: "senior_analyst_" before "senior_".
        let classifier = RoleClassifier::new(vec![
            ("senior_analyst_".to_string(), Role::Junior),
            ("senior_".to_string(), Role::Senior),
        ]);
        assert_eq!(classifier.classify("senior_analyst_3").unwrap(), Role::Junior);
        assert_eq!(classifier.classify("senior_3").unwrap(), Role::Senior);
    }

    #[test]
    fn classification_ignores_everything_but_the_token() {
        // The classifier's only input is the token string; there is no
        // side channel for client-supplied flags by construction. This
        // test pins the signature-level guarantee.
        let classifier = RoleClassifier::default();
        assert_eq!(classifier.classify("junior_9").unwrap(), Role::Junior);
    }
}
