// pipeline.rs — The governance pipeline.
//
// One request flows through a fixed sequence of checkpoints:
//
//   Received → IdentityResolved → AuthChecked → GuardrailPreChecked → Executing → GuardrailPostChecked → Completed
//
// and any checkpoint can divert it to Rejected. Each checkpoint writes
// an audit event before the pipeline moves on; a request that cannot be
// audited does not proceed. The caller sees exactly two shapes: a
// successful ToolResult, or the one generic failure — never which
// checkpoint rejected it.

use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use uuid::Uuid;

use fg_audit::{mask_sensitive, AuditEvent, AuditSink, AuditStage, Outcome};
use fg_guardrail::{GuardrailFilter, Inspection, Verdict};
use fg_identity::IdentityResolver;
use fg_policy::PolicyEngine;
use fg_tools::registry::ToolHandler;
use fg_tools::{ToolCallRequest, ToolError, ToolRegistry, ToolResult};

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Where a request currently stands in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    IdentityResolved,
    AuthChecked,
    GuardrailPreChecked,
    Executing,
    GuardrailPostChecked,
    Completed,
    Rejected,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Received => "received",
            RequestState::IdentityResolved => "identity_resolved",
            RequestState::AuthChecked => "auth_checked",
            RequestState::GuardrailPreChecked => "guardrail_pre_checked",
            RequestState::Executing => "executing",
            RequestState::GuardrailPostChecked => "guardrail_post_checked",
            RequestState::Completed => "completed",
            RequestState::Rejected => "rejected",
        }
    }
}

enum Execution {
    Completed(Result<Value, ToolError>),
    TimedOut,
}

/// The governance gateway: the only path from a request to a tool.
pub struct Gateway {
    resolver: IdentityResolver,
    engine: PolicyEngine,
    filter: GuardrailFilter,
    registry: ToolRegistry,
    sink: AuditSink,
    tool_timeout: Duration,
}

impl Gateway {
    /// Build a gateway from a config, with the standard tool roster.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        if let Some(parent) = config.audit_log.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let sink =
            AuditSink::open(&config.audit_log)?.with_retry_limit(config.audit_retry_limit);
        Ok(Self::from_parts(
            IdentityResolver::default(),
            GuardrailFilter::with_default_rules()?,
            ToolRegistry::standard(&config.reports_dir),
            sink,
            Duration::from_secs(config.tool_timeout_secs),
        ))
    }

    /// Assemble a gateway from explicit components.
    pub fn from_parts(
        resolver: IdentityResolver,
        filter: GuardrailFilter,
        registry: ToolRegistry,
        sink: AuditSink,
        tool_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            engine: PolicyEngine::new(),
            filter,
            registry,
            sink,
            tool_timeout,
        }
    }

    /// Path of the audit log this gateway writes to.
    pub fn audit_log_path(&self) -> &Path {
        self.sink.path()
    }

    /// Names of the tools this gateway can route to.
    pub fn tool_names(&self) -> Vec<String> {
        self.registry.tool_names().map(String::from).collect()
    }

    /// Handle one tool call end to end.
    ///
    /// Never returns an error: every internal failure, denial, or block
    /// collapses into the generic unavailable result. The audit log is
    /// the only place the true cause is recorded.
    pub fn handle(&self, request: &ToolCallRequest) -> ToolResult {
        match self.process(request) {
            Ok(result) => result,
            Err(err) => {
                // Audit write exhausted its retries. Fail closed: a call
                // that cannot be recorded must not be answered.
                tracing::error!(
                    request_id = %request.request_id,
                    error = %err,
                    "audit sink unavailable; rejecting request"
                );
                ToolResult::unavailable(request.request_id)
            }
        }
    }

    fn process(&self, request: &ToolCallRequest) -> Result<ToolResult, GatewayError> {
        let mut state = RequestState::Received;
        let rid = request.request_id;

        // ---- Checkpoint 1: identity + authorization -------------------
        let identity = match self.resolver.resolve(&request.raw_id) {
            Ok(identity) => identity,
            Err(_) => {
                self.audit(
                    AuditEvent::new(rid, &request.raw_id, &request.tool_name, AuditStage::Auth, Outcome::Deny)
                        .with_reason("unknown_identity"),
                )?;
                return Ok(self.reject(rid, &mut state));
            }
        };
        self.advance(&mut state, RequestState::IdentityResolved, rid);

        let decision = self.engine.authorize(&identity, &request.tool_name, &self.registry, rid);
        let auth_outcome = if decision.is_allowed() { Outcome::Allow } else { Outcome::Deny };
        self.audit(
            AuditEvent::new(rid, &request.raw_id, &request.tool_name, AuditStage::Auth, auth_outcome)
                .with_role(identity.role.as_str())
                .with_reason(decision.reason_code.as_str())
                .with_metadata(json!({
                    "required_capability": decision
                        .required_capability
                        .map(|c| c.as_str().to_string()),
                    "arguments": mask_sensitive(&Value::Object(request.arguments.clone())),
                })),
        )?;
        if !decision.is_allowed() {
            return Ok(self.reject(rid, &mut state));
        }
        self.advance(&mut state, RequestState::AuthChecked, rid);

        // ---- Checkpoint 2: pre-execution guardrail --------------------
        let pre = self.filter.inspect_arguments(rid, &request.arguments);
        self.audit(inspection_event(request, AuditStage::GuardrailPre, &pre, identity.role.as_str()))?;
        if pre.is_blocking() {
            return Ok(self.reject(rid, &mut state));
        }
        // A redact verdict substitutes the sanitized arguments; the tool
        // never sees the original text.
        let arguments: Map<String, Value> = match pre.sanitized {
            Some(Value::Object(map)) => map,
            _ => request.arguments.clone(),
        };
        self.advance(&mut state, RequestState::GuardrailPreChecked, rid);

        // ---- Checkpoint 3: execution ----------------------------------
        // lookup() succeeded during authorization; a miss here means the
        // roster changed mid-request, which the frozen registry rules out.
        let handler = match self.registry.lookup(&request.tool_name) {
            Some(entry) => entry.handler(),
            None => {
                self.audit(
                    AuditEvent::new(rid, &request.raw_id, &request.tool_name, AuditStage::Execute, Outcome::Failure)
                        .with_role(identity.role.as_str())
                        .with_reason("unknown_tool"),
                )?;
                return Ok(self.reject(rid, &mut state));
            }
        };
        self.advance(&mut state, RequestState::Executing, rid);

        let payload = match self.execute(handler, arguments) {
            Execution::Completed(Ok(payload)) => {
                self.audit(
                    AuditEvent::new(rid, &request.raw_id, &request.tool_name, AuditStage::Execute, Outcome::Success)
                        .with_role(identity.role.as_str()),
                )?;
                payload
            }
            Execution::Completed(Err(err)) => {
                self.audit(
                    AuditEvent::new(rid, &request.raw_id, &request.tool_name, AuditStage::Execute, Outcome::Failure)
                        .with_role(identity.role.as_str())
                        .with_reason("tool_error")
                        .with_metadata(json!({ "message": err.to_string() })),
                )?;
                return Ok(self.reject(rid, &mut state));
            }
            Execution::TimedOut => {
                self.audit(
                    AuditEvent::new(rid, &request.raw_id, &request.tool_name, AuditStage::Execute, Outcome::Timeout)
                        .with_role(identity.role.as_str())
                        .with_reason("timeout"),
                )?;
                return Ok(self.reject(rid, &mut state));
            }
        };

        // ---- Checkpoint 4: post-execution guardrail -------------------
        let post = self.filter.inspect_payload(rid, &payload);
        self.audit(inspection_event(request, AuditStage::GuardrailPost, &post, identity.role.as_str()))?;
        if post.is_blocking() {
            // The tool ran and succeeded; the log says so truthfully.
            // The caller still gets the generic failure.
            return Ok(self.reject(rid, &mut state));
        }
        let delivered = post.sanitized.unwrap_or(payload);
        self.advance(&mut state, RequestState::GuardrailPostChecked, rid);

        self.advance(&mut state, RequestState::Completed, rid);
        Ok(ToolResult::ok(rid, delivered))
    }

    /// Run a handler on a worker thread, bounded by the tool timeout.
    ///
    /// On timeout the receiver is dropped and the worker is abandoned;
    /// its eventual send fails silently and the result goes nowhere.
    fn execute(&self, handler: Arc<dyn ToolHandler>, arguments: Map<String, Value>) -> Execution {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(handler.invoke(&arguments));
        });

        match rx.recv_timeout(self.tool_timeout) {
            Ok(result) => Execution::Completed(result),
            Err(mpsc::RecvTimeoutError::Timeout) => Execution::TimedOut,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                // The worker panicked before sending.
                Execution::Completed(Err(ToolError::Failed {
                    tool: "worker".to_string(),
                    message: "tool worker terminated abnormally".to_string(),
                }))
            }
        }
    }

    fn audit(&self, mut event: AuditEvent) -> Result<(), GatewayError> {
        self.sink.record(&mut event)?;
        Ok(())
    }

    fn advance(&self, state: &mut RequestState, next: RequestState, request_id: Uuid) {
        tracing::trace!(
            %request_id,
            from = state.as_str(),
            to = next.as_str(),
            "pipeline transition"
        );
        *state = next;
    }

    fn reject(&self, request_id: Uuid, state: &mut RequestState) -> ToolResult {
        self.advance(state, RequestState::Rejected, request_id);
        ToolResult::unavailable(request_id)
    }
}

fn inspection_event(
    request: &ToolCallRequest,
    stage: AuditStage,
    inspection: &Inspection,
    role: &str,
) -> AuditEvent {
    let outcome = match inspection.verdict.verdict {
        Verdict::Pass => Outcome::Pass,
        Verdict::Redact => Outcome::Redact,
        Verdict::Block => Outcome::Block,
    };
    let mut event = AuditEvent::new(
        request.request_id,
        &request.raw_id,
        &request.tool_name,
        stage,
        outcome,
    )
    .with_role(role)
    .with_risk(inspection.verdict.risk_level.as_str());
    if let Some(rule) = &inspection.verdict.matched_rule {
        event = event.with_reason(rule.clone());
    }
    event
}
