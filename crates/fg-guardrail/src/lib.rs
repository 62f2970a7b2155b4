//! # fg-guardrail
//!
//! Content guardrails for FinGuard: an ordered list of pattern rules
//! applied to tool-call arguments before execution (PRE) and to tool
//! payloads before they reach the caller (POST).
//!
//! Each rule either blocks outright or redacts the offending spans.
//! The first matching block rule short-circuits and wins over any
//! redaction; if nothing matches, the verdict is PASS. Rule order is
//! fixed at construction, so verdicts are deterministic across runs.
//!
//! Redaction never silently drops data: the verdict records which rule
//! matched, and the sanitized value replaces only the matched spans.

pub mod error;
pub mod filter;
pub mod rules;

pub use error::GuardrailError;
pub use filter::{GuardrailFilter, Inspection};
pub use rules::{GuardrailRule, GuardrailVerdict, RiskLevel, RuleAction, Stage, StageFilter, Verdict};
