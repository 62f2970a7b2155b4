//! # fg-policy
//!
//! Fail-closed RBAC policy engine for FinGuard.
//!
//! The [`PolicyEngine`] answers exactly one question: may this identity
//! invoke this tool right now? It is stateless across requests and
//! consults the tool registry fresh on every call, so a decision can
//! never be served from a cache that has drifted from the roster.
//!
//! ## Key invariants
//!
//! - **Default deny**: unknown tool → denied. Missing capability → denied.
//! - **No partial grants**: the decision is binary; there is no
//!   "allow with conditions" outcome.
//! - **Explainable**: every decision carries a [`ReasonCode`] and the
//!   capability sets that produced it, for the audit trail.

pub mod engine;

pub use engine::{Decision, PolicyDecision, PolicyEngine, ReasonCode};
