// filter.rs — The guardrail filter: rule application over JSON values.
//
// Arguments and payloads are JSON. The filter walks every string leaf
// (and, for block rules, every object key) so disallowed content cannot
// be smuggled inside a nested structure. Redaction rebuilds the value
// with only the matched spans replaced.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::GuardrailError;
use crate::rules::{
    default_rules, GuardrailRule, GuardrailVerdict, RiskLevel, RuleAction, Stage, Verdict,
};

/// Ceiling on serialized argument size. Oversized requests are blocked
/// outright rather than scanned.
const MAX_ARGUMENT_BYTES: usize = 10_000;

/// The result of one inspection pass.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub verdict: GuardrailVerdict,
    /// The cleaned value — present only when the verdict is Redact.
    pub sanitized: Option<Value>,
}

impl Inspection {
    /// Whether the pipeline may continue past this verdict.
    pub fn is_blocking(&self) -> bool {
        self.verdict.verdict == Verdict::Block
    }
}

/// Accumulates matches across one walk of a value tree.
#[derive(Default)]
struct ScanState {
    blocked: Option<(String, RiskLevel)>,
    redactions: Vec<(String, RiskLevel)>,
}

/// The guardrail filter: an ordered rule list applied per stage.
pub struct GuardrailFilter {
    rules: Vec<GuardrailRule>,
    max_argument_bytes: usize,
}

impl GuardrailFilter {
    /// Build a filter over an explicit rule list (order significant).
    pub fn new(rules: Vec<GuardrailRule>) -> Self {
        Self {
            rules,
            max_argument_bytes: MAX_ARGUMENT_BYTES,
        }
    }

    /// Build a filter with the standard rule set.
    pub fn with_default_rules() -> Result<Self, GuardrailError> {
        Ok(Self::new(default_rules()?))
    }

    /// Inspect outbound tool-call arguments (PRE stage).
    pub fn inspect_arguments(&self, request_id: Uuid, args: &Map<String, Value>) -> Inspection {
        // Size gate first: a payload too large to scan is refused.
        let serialized_len = Value::Object(args.clone()).to_string().len();
        if serialized_len > self.max_argument_bytes {
            tracing::warn!(%request_id, serialized_len, "arguments exceed size ceiling");
            return Inspection {
                verdict: GuardrailVerdict {
                    request_id,
                    stage: Stage::Pre,
                    verdict: Verdict::Block,
                    matched_rule: Some("oversized_input".to_string()),
                    risk_level: RiskLevel::Medium,
                },
                sanitized: None,
            };
        }

        let value = Value::Object(args.clone());
        self.inspect_value(request_id, Stage::Pre, &value)
    }

    /// Inspect a tool's returned payload (POST stage).
    pub fn inspect_payload(&self, request_id: Uuid, payload: &Value) -> Inspection {
        self.inspect_value(request_id, Stage::Post, payload)
    }

    fn inspect_value(&self, request_id: Uuid, stage: Stage, value: &Value) -> Inspection {
        let mut state = ScanState::default();
        let rewritten = self.scan_value(stage, value, &mut state);

        if let Some((rule, risk)) = state.blocked {
            tracing::warn!(%request_id, ?stage, rule, "guardrail block");
            return Inspection {
                verdict: GuardrailVerdict {
                    request_id,
                    stage,
                    verdict: Verdict::Block,
                    matched_rule: Some(rule),
                    risk_level: risk,
                },
                sanitized: None,
            };
        }

        if let Some((first_rule, _)) = state.redactions.first().cloned() {
            let risk = state
                .redactions
                .iter()
                .map(|(_, r)| *r)
                .max()
                .unwrap_or(RiskLevel::Low);
            tracing::info!(%request_id, ?stage, rule = first_rule, "guardrail redact");
            return Inspection {
                verdict: GuardrailVerdict {
                    request_id,
                    stage,
                    verdict: Verdict::Redact,
                    matched_rule: Some(first_rule),
                    risk_level: risk,
                },
                sanitized: Some(rewritten),
            };
        }

        Inspection {
            verdict: GuardrailVerdict::pass(request_id, stage),
            sanitized: None,
        }
    }

    /// Walk a JSON value, rewriting string leaves through the rule list.
    fn scan_value(&self, stage: Stage, value: &Value, state: &mut ScanState) -> Value {
        if state.blocked.is_some() {
            return value.clone();
        }
        match value {
            Value::String(text) => Value::String(self.scan_text(stage, text, state)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.scan_value(stage, item, state))
                    .collect(),
            ),
            Value::Object(map) => {
                let mut rewritten = Map::with_capacity(map.len());
                for (key, item) in map {
                    // Keys are checked for block rules only. Rewriting a
                    // key would change the tool's parameter names, so a
                    // key that merely needs redaction is left intact.
                    self.scan_key(stage, key, state);
                    rewritten.insert(key.clone(), self.scan_value(stage, item, state));
                }
                Value::Object(rewritten)
            }
            other => other.clone(),
        }
    }

    fn scan_key(&self, stage: Stage, key: &str, state: &mut ScanState) {
        if state.blocked.is_some() {
            return;
        }
        for rule in &self.rules {
            if !rule.stages.applies_to(stage) {
                continue;
            }
            if matches!(rule.action, RuleAction::Block) && rule.pattern.is_match(key) {
                state.blocked = Some((rule.name.clone(), rule.risk_level));
                return;
            }
        }
    }

    fn scan_text(&self, stage: Stage, text: &str, state: &mut ScanState) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            if !rule.stages.applies_to(stage) {
                continue;
            }
            if !rule.pattern.is_match(&out) {
                continue;
            }
            match &rule.action {
                RuleAction::Block => {
                    // Block wins over any redaction already applied.
                    state.blocked = Some((rule.name.clone(), rule.risk_level));
                    return out;
                }
                RuleAction::Redact { replacement } => {
                    out = rule
                        .pattern
                        .replace_all(&out, replacement.as_str())
                        .into_owned();
                    state.redactions.push((rule.name.clone(), rule.risk_level));
                }
            }
        }
        out
    }
}
