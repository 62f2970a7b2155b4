//! # fg-tools
//!
//! The tool registry and the research tool collaborators for FinGuard.
//!
//! A [`ToolRegistry`] maps tool names to a [`ToolHandler`] plus the
//! capability the caller must hold. Registration happens once through
//! the builder at startup; the built registry is read-only, so
//! concurrent requests never race on the available tool set.
//!
//! Collaborators implement their own I/O and nothing else: they never
//! check permissions. Authorization belongs exclusively to the
//! governance middleware that sits in front of them — a tool reachable
//! outside the middleware would be a security hole, which is why
//! handlers are only handed out inside a [`registry::ToolEntry`].

pub mod collaborators;
pub mod error;
pub mod registry;
pub mod request;

pub use error::ToolError;
pub use registry::{ToolHandler, ToolRegistry, ToolRegistryBuilder};
pub use request::{ToolCallRequest, ToolResult};
