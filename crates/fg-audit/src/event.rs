// event.rs — Audit event data model.
//
// One event per pipeline decision point. Reading the events for a
// request_id in timestamp order reconstructs the decision path exactly:
// AUTH, then GUARDRAIL_PRE, then EXECUTE, then GUARDRAIL_POST (a
// rejected request stops wherever it was rejected).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which pipeline stage produced this event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditStage {
    /// Identity resolution + role-based authorization.
    Auth,
    /// Content inspection of the outbound arguments.
    GuardrailPre,
    /// The tool invocation itself.
    Execute,
    /// Content inspection of the returned payload.
    GuardrailPost,
}

/// The outcome recorded at a stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    // Auth outcomes.
    Allow,
    Deny,
    // Guardrail outcomes.
    Pass,
    Redact,
    Block,
    // Execution outcomes.
    Success,
    Failure,
    Timeout,
}

/// A single audit event — one line in the JSONL audit log.
///
/// Once written, an event is never edited or deleted. `previous_hash`
/// links it to the preceding line, forming the tamper-evidence chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique identifier for this event.
    pub event_id: Uuid,

    /// Correlation key: which request this event belongs to.
    pub request_id: Uuid,

    /// The identity token as presented (not the resolved role).
    pub raw_id: String,

    /// The resolved role, if resolution succeeded ("junior"/"senior").
    pub role: Option<String>,

    /// The tool the request named.
    pub tool_name: String,

    /// Which pipeline stage this event records.
    pub stage: AuditStage,

    /// What happened at that stage.
    pub outcome: Outcome,

    /// Machine-readable reason (e.g. "insufficient_role", "unknown_tool").
    pub reason_code: Option<String>,

    /// Risk level reported by a guardrail stage ("low"/"medium"/"high").
    pub risk_level: Option<String>,

    /// When this event occurred (UTC).
    pub timestamp: DateTime<Utc>,

    /// Hash of the previous line in the log. None on the first line.
    pub previous_hash: Option<String>,

    /// Arbitrary additional data. Callers must mask sensitive fields
    /// (see [`crate::mask_sensitive`]) before attaching.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl AuditEvent {
    /// Create a new event with the current timestamp and a random event id.
    pub fn new(
        request_id: Uuid,
        raw_id: impl Into<String>,
        tool_name: impl Into<String>,
        stage: AuditStage,
        outcome: Outcome,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            request_id,
            raw_id: raw_id.into(),
            role: None,
            tool_name: tool_name.into(),
            stage,
            outcome,
            reason_code: None,
            risk_level: None,
            timestamp: Utc::now(),
            previous_hash: None,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason_code = Some(reason.into());
        self
    }

    pub fn with_risk(mut self, risk: impl Into<String>) -> Self {
        self.risk_level = Some(risk.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
