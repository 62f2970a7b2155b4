// request.rs — The executor-facing request and result shapes.
//
// ToolCallRequest is immutable once created; request_id is the audit
// correlation key. ToolResult is the *only* shape the executor ever
// sees back, success or failure — and every failure path produces the
// same generic form, so a denied call is indistinguishable from a tool
// outage at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The one message an authorization or guardrail rejection, an unknown
/// identity, an execution error, and a timeout all surface as.
const GENERIC_FAILURE: &str = "tool temporarily unavailable";

/// A request from the executor to invoke one tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Unique per request; correlates every audit event it produces.
    pub request_id: Uuid,
    /// Which registered tool to invoke.
    pub tool_name: String,
    /// Named arguments for the tool.
    pub arguments: Map<String, Value>,
    /// The caller's opaque identity token.
    pub raw_id: String,
    /// When the request was created.
    pub timestamp: DateTime<Utc>,
}

impl ToolCallRequest {
    pub fn new(
        raw_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            tool_name: tool_name.into(),
            arguments,
            raw_id: raw_id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The result returned to the executor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolResult {
    pub request_id: Uuid,
    pub success: bool,
    /// The tool payload on success, absent on failure.
    pub payload: Option<Value>,
    /// The failure message — always the same generic text.
    pub error: Option<String>,
}

impl ToolResult {
    /// A successful result carrying the (possibly redacted) payload.
    pub fn ok(request_id: Uuid, payload: Value) -> Self {
        Self {
            request_id,
            success: true,
            payload: Some(payload),
            error: None,
        }
    }

    /// The single generic failure shape.
    ///
    /// Deliberately carries no detail: the true cause lives only in the
    /// audit log, so the caller cannot probe the policy boundary by
    /// comparing failure responses.
    pub fn unavailable(request_id: Uuid) -> Self {
        Self {
            request_id,
            success: false,
            payload: None,
            error: Some(GENERIC_FAILURE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_ids_are_unique() {
        let a = ToolCallRequest::new("analyst_007", "search_web", Map::new());
        let b = ToolCallRequest::new("analyst_007", "search_web", Map::new());
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn failure_shapes_are_identical_for_any_cause() {
        // Two failures for the same request must be byte-identical when
        // serialized — there is no side channel in the shape.
        let rid = Uuid::new_v4();
        let denied = serde_json::to_string(&ToolResult::unavailable(rid)).unwrap();
        let tool_down = serde_json::to_string(&ToolResult::unavailable(rid)).unwrap();
        assert_eq!(denied, tool_down);
    }

    #[test]
    fn success_carries_the_payload() {
        let rid = Uuid::new_v4();
        let result = ToolResult::ok(rid, json!({"price": 71000}));
        assert!(result.success);
        assert_eq!(result.payload.unwrap()["price"], 71000);
        assert!(result.error.is_none());
    }
}
