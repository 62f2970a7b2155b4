// rules.rs — Guardrail rule and verdict data model.
//
// A rule is a regex plus an action (block or redact) plus a risk level,
// scoped to one or both pipeline stages. Rules live in an ordered Vec;
// the order is part of the contract and must not be shuffled.

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GuardrailError;

/// Which side of the tool invocation an inspection covers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Outbound arguments, before any tool executes.
    Pre,
    /// The tool's returned payload, before it reaches the executor.
    Post,
}

/// Which stages a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageFilter {
    PreOnly,
    PostOnly,
    Both,
}

impl StageFilter {
    pub fn applies_to(&self, stage: Stage) -> bool {
        matches!(
            (self, stage),
            (StageFilter::Both, _)
                | (StageFilter::PreOnly, Stage::Pre)
                | (StageFilter::PostOnly, Stage::Post)
        )
    }
}

/// The outcome class of an inspection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Redact,
    Block,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Redact => "redact",
            Verdict::Block => "block",
        }
    }
}

/// How severe a matched rule is.
///
/// `Ord` is derived so "highest risk among matches" is a `max()`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// What a matching rule does to the content.
#[derive(Debug, Clone)]
pub enum RuleAction {
    /// Refuse the content entirely.
    Block,
    /// Replace the matched spans with the given marker text.
    Redact { replacement: String },
}

/// One ordered guardrail rule.
#[derive(Debug, Clone)]
pub struct GuardrailRule {
    /// Stable rule name — recorded in verdicts and audit events.
    pub name: String,
    pub pattern: Regex,
    pub action: RuleAction,
    pub risk_level: RiskLevel,
    pub stages: StageFilter,
}

impl GuardrailRule {
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        action: RuleAction,
        risk_level: RiskLevel,
        stages: StageFilter,
    ) -> Result<Self, GuardrailError> {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|source| GuardrailError::InvalidPattern {
            name: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            pattern,
            action,
            risk_level,
            stages,
        })
    }
}

/// The recorded result of one inspection pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuardrailVerdict {
    /// The request this verdict belongs to (audit correlation key).
    pub request_id: Uuid,
    pub stage: Stage,
    pub verdict: Verdict,
    /// The first rule that matched, if any. On a redact verdict with
    /// several matches this is the earliest rule in the ordered list.
    pub matched_rule: Option<String>,
    /// Highest risk level among the matched rules; Low on a pass.
    pub risk_level: RiskLevel,
}

impl GuardrailVerdict {
    pub fn pass(request_id: Uuid, stage: Stage) -> Self {
        Self {
            request_id,
            stage,
            verdict: Verdict::Pass,
            matched_rule: None,
            risk_level: RiskLevel::Low,
        }
    }
}

/// The standard rule set: credential and PII patterns, prompt-injection
/// markers, trading-abuse topics, and assured-outcome phrasing that
/// compliance requires softened in outbound research text.
///
/// Blocks are listed before redactions within each concern so the
/// block-wins precedence also falls out of plain rule order.
pub fn default_rules() -> Result<Vec<GuardrailRule>, GuardrailError> {
    Ok(vec![
        GuardrailRule::new(
            "prompt_injection",
            r"(?i)ignore (all |any )?(previous|prior) instructions|disregard (the )?system prompt",
            RuleAction::Block,
            RiskLevel::High,
            StageFilter::Both,
        )?,
        GuardrailRule::new(
            "credential_leak",
            r#"(?i)(api[_\s-]?key|secret|password|token)\s*[:=]\s*["']?[\w\-]{6,}"#,
            RuleAction::Block,
            RiskLevel::High,
            StageFilter::Both,
        )?,
        GuardrailRule::new(
            "insider_information",
            r"(?i)insider (trading|information|tip)|undisclosed material (fact|information)",
            RuleAction::Block,
            RiskLevel::High,
            StageFilter::PreOnly,
        )?,
        GuardrailRule::new(
            "market_manipulation",
            r"(?i)pump[- ]and[- ]dump|spoof(ed|ing) orders?|wash trad(e|es|ing)",
            RuleAction::Block,
            RiskLevel::High,
            StageFilter::PreOnly,
        )?,
        // PII patterns are asymmetric by stage: in arguments they are a
        // sign of exfiltration and the request is refused outright; in a
        // tool's payload they are scrubbed so the rest of the result
        // still reaches the caller.
        GuardrailRule::new(
            "card_number",
            r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b",
            RuleAction::Block,
            RiskLevel::High,
            StageFilter::PreOnly,
        )?,
        GuardrailRule::new(
            "national_id",
            r"\b\d{6}[-\s]?\d{7}\b",
            RuleAction::Block,
            RiskLevel::High,
            StageFilter::PreOnly,
        )?,
        GuardrailRule::new(
            "card_number",
            r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b",
            RuleAction::Redact {
                replacement: "[redacted:card-number]".to_string(),
            },
            RiskLevel::High,
            StageFilter::PostOnly,
        )?,
        GuardrailRule::new(
            "national_id",
            r"\b\d{6}[-\s]?\d{7}\b",
            RuleAction::Redact {
                replacement: "[redacted:national-id]".to_string(),
            },
            RiskLevel::High,
            StageFilter::PostOnly,
        )?,
        GuardrailRule::new(
            "assured_returns",
            r"(?i)guaranteed (returns?|profits?|yield)|risk[- ]free (returns?|investment)|cannot lose",
            RuleAction::Redact {
                replacement: "[removed: assured-outcome language]".to_string(),
            },
            RiskLevel::Medium,
            StageFilter::PostOnly,
        )?,
        GuardrailRule::new(
            "certainty_language",
            r"(?i)\bwill (definitely|certainly|surely) (rise|fall|double|outperform)\b",
            RuleAction::Redact {
                replacement: "may move".to_string(),
            },
            RiskLevel::Medium,
            StageFilter::PostOnly,
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_build() {
        let rules = default_rules().unwrap();
        assert!(!rules.is_empty());
        // Order must be stable: the injection rule is always first.
        assert_eq!(rules[0].name, "prompt_injection");
    }

    #[test]
    fn stage_filter_scoping() {
        assert!(StageFilter::Both.applies_to(Stage::Pre));
        assert!(StageFilter::Both.applies_to(Stage::Post));
        assert!(StageFilter::PreOnly.applies_to(Stage::Pre));
        assert!(!StageFilter::PreOnly.applies_to(Stage::Post));
        assert!(!StageFilter::PostOnly.applies_to(Stage::Pre));
    }

    #[test]
    fn risk_levels_are_ordered() {
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = GuardrailRule::new(
            "broken",
            r"([unclosed",
            RuleAction::Block,
            RiskLevel::Low,
            StageFilter::Both,
        );
        assert!(matches!(err, Err(GuardrailError::InvalidPattern { .. })));
    }
}
