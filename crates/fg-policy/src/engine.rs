// engine.rs — Policy evaluation.
//
// The engine is the "default deny" chokepoint. Every tool call passes
// through `authorize()`, which checks:
//
// 1. Is the tool registered? → No → Deny (unknown_tool)
// 2. Does the identity hold the tool's required capability?
//    → No → Deny (insufficient_role)
// 3. → Allow (granted)
//
// There is no other path to Allow. The engine holds no request state
// and consults the registry fresh on every call; a role change between
// requests takes effect immediately.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fg_identity::{Capability, Identity};
use fg_tools::ToolRegistry;

/// The binary outcome of an authorization check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny,
}

/// Why the engine decided the way it did.
///
/// Reason codes are recorded verbatim in the audit trail; the caller is
/// never shown them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// The identity holds the required capability.
    Granted,
    /// The tool exists but the identity's role does not grant it.
    InsufficientRole,
    /// The tool name is not in the registry.
    UnknownTool,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::Granted => "granted",
            ReasonCode::InsufficientRole => "insufficient_role",
            ReasonCode::UnknownTool => "unknown_tool",
        }
    }
}

/// A full decision record, sufficient to reconstruct the check from the
/// audit log without re-running the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyDecision {
    pub request_id: Uuid,
    pub decision: Decision,
    pub reason_code: ReasonCode,
    /// The capability the tool demanded. `None` only for unknown tools.
    pub required_capability: Option<Capability>,
    /// What the identity actually held at decision time.
    pub granted_capabilities: BTreeSet<Capability>,
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        self.decision == Decision::Allow
    }
}

/// Stateless authorization engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Authorize one tool call. This is the single chokepoint: no tool
    /// executes unless this returns Allow.
    pub fn authorize(
        &self,
        identity: &Identity,
        tool_name: &str,
        registry: &ToolRegistry,
        request_id: Uuid,
    ) -> PolicyDecision {
        let granted = identity.capabilities.clone();

        let entry = match registry.lookup(tool_name) {
            Some(entry) => entry,
            None => {
                tracing::warn!(%request_id, tool_name, "denied: unknown tool");
                return PolicyDecision {
                    request_id,
                    decision: Decision::Deny,
                    reason_code: ReasonCode::UnknownTool,
                    required_capability: None,
                    granted_capabilities: granted,
                };
            }
        };

        let required = entry.effective_capability();
        if !identity.can(required) {
            tracing::warn!(
                %request_id,
                tool_name,
                role = identity.role.as_str(),
                required = required.as_str(),
                "denied: insufficient role"
            );
            return PolicyDecision {
                request_id,
                decision: Decision::Deny,
                reason_code: ReasonCode::InsufficientRole,
                required_capability: Some(required),
                granted_capabilities: granted,
            };
        }

        tracing::debug!(%request_id, tool_name, role = identity.role.as_str(), "allowed");
        PolicyDecision {
            request_id,
            decision: Decision::Allow,
            reason_code: ReasonCode::Granted,
            required_capability: Some(required),
            granted_capabilities: granted,
        }
    }
}
