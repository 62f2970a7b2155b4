//! # fg-gateway
//!
//! The governance middleware that fronts every tool call in FinGuard.
//!
//! A [`Gateway`] owns the whole pipeline: identity resolution, RBAC
//! authorization, pre- and post-execution guardrails, bounded tool
//! execution, and the append-only audit trail. Callers interact with
//! exactly one method, [`Gateway::handle`], and receive exactly one of
//! two shapes back: a successful payload, or the generic failure. A
//! policy denial, a guardrail block, an unknown identity, a tool crash,
//! and a timeout are indistinguishable from the outside; the audit log
//! is the only record of what actually happened.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use fg_gateway::{Gateway, GatewayConfig};
//! use fg_tools::ToolCallRequest;
//! use serde_json::{json, Map, Value};
//!
//! let config = GatewayConfig::for_project(".");
//! let gateway = Gateway::new(&config).unwrap();
//!
//! let args: Map<String, Value> = json!({"ticker": "005930"}).as_object().cloned().unwrap();
//! let request = ToolCallRequest::new("senior_042", "get_stock_price", args);
//! let result = gateway.handle(&request);
//! assert!(result.success);
//! ```

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use pipeline::{Gateway, RequestState};
