//! # fg-audit
//!
//! Append-only, tamper-evident audit log for FinGuard.
//!
//! Every decision point in the governance pipeline — identity/auth
//! outcome, pre-guardrail verdict, execution result, post-guardrail
//! verdict — is recorded as an [`AuditEvent`] in a JSONL file. Events
//! carry the `request_id` correlation key, so the full decision path of
//! any request can be reconstructed from the log alone, without the
//! live process.
//!
//! Each event is linked to the previous one through a SHA-256 hash
//! chain: inserting, deleting, or editing a record breaks the chain and
//! is detected by [`sink::verify_chain`]. No update or delete operation
//! exists anywhere in this crate.
//!
//! This crate is a leaf: roles, reason codes, and risk levels are
//! recorded as plain strings so the log depends on nothing upstream.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use fg_audit::{AuditEvent, AuditSink, AuditStage, Outcome};
//! use uuid::Uuid;
//!
//! let sink = AuditSink::open("/tmp/audit.jsonl").unwrap();
//! let mut event = AuditEvent::new(
//!     Uuid::new_v4(),
//!     "analyst_007",
//!     "save_report",
//!     AuditStage::Auth,
//!     Outcome::Deny,
//! )
//! .with_reason("insufficient_role");
//! sink.record(&mut event).unwrap();
//! ```

pub mod error;
pub mod event;
pub mod hasher;
pub mod mask;
pub mod query;
pub mod sink;

pub use error::AuditError;
pub use event::{AuditEvent, AuditStage, Outcome};
pub use mask::mask_sensitive;
pub use query::AuditQuery;
pub use sink::{export_csv, read_all, verify_chain, AuditSink};
