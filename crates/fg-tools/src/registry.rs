// registry.rs — The process-wide tool registry.
//
// Lifecycle: populate once through the builder at initialization, then
// read-only for the life of the process. There is deliberately no way
// to add or remove a tool from a built registry, which removes a whole
// class of races between concurrent requests.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use fg_identity::Capability;

use crate::collaborators::{
    InternalSearch, MarketSummary, SaveReport, StockPrice, WebSearch,
};
use crate::error::ToolError;

/// A tool collaborator: owns its own I/O, never checks permissions.
///
/// Authorization is exclusively the middleware's job; a handler that
/// made its own access decisions would desynchronize from the audit
/// trail.
pub trait ToolHandler: Send + Sync {
    /// The registered name (stable, snake_case).
    fn name(&self) -> &str;

    /// Execute with named arguments, returning a JSON payload.
    fn invoke(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError>;
}

/// One registry entry: the handler plus the capability gate in front of it.
pub struct ToolEntry {
    required_capability: Option<Capability>,
    handler: Arc<dyn ToolHandler>,
}

impl ToolEntry {
    /// The capability a caller must hold to invoke this tool.
    ///
    /// A tool registered without a declared capability still requires
    /// the baseline capability — there is no "no check" entry.
    pub fn effective_capability(&self) -> Capability {
        self.required_capability.unwrap_or_else(Capability::baseline)
    }

    pub fn handler(&self) -> Arc<dyn ToolHandler> {
        Arc::clone(&self.handler)
    }
}

/// Builder — the only way to populate a registry.
#[derive(Default)]
pub struct ToolRegistryBuilder {
    entries: BTreeMap<String, ToolEntry>,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool with an explicit required capability.
    pub fn register(
        mut self,
        name: impl Into<String>,
        capability: Capability,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        self.entries.insert(
            name.into(),
            ToolEntry {
                required_capability: Some(capability),
                handler,
            },
        );
        self
    }

    /// Register a tool without a declared capability; it falls back to
    /// requiring [`Capability::baseline`].
    pub fn register_baseline(mut self, name: impl Into<String>, handler: Arc<dyn ToolHandler>) -> Self {
        self.entries.insert(
            name.into(),
            ToolEntry {
                required_capability: None,
                handler,
            },
        );
        self
    }

    /// Freeze the registry. After this, the tool set cannot change.
    pub fn build(self) -> ToolRegistry {
        tracing::info!(tools = self.entries.len(), "tool registry frozen");
        ToolRegistry {
            entries: self.entries,
        }
    }
}

/// The immutable name → entry mapping.
pub struct ToolRegistry {
    entries: BTreeMap<String, ToolEntry>,
}

impl ToolRegistry {
    /// Look up a tool. `None` means the policy engine must deny.
    pub fn lookup(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.get(name)
    }

    /// Registered tool names, in stable order.
    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The standard research-desk tool set.
    pub fn standard(reports_dir: impl AsRef<Path>) -> Self {
        ToolRegistryBuilder::new()
            .register(
                "search_internal",
                Capability::SearchInternal,
                Arc::new(InternalSearch::new()),
            )
            .register("search_web", Capability::SearchWeb, Arc::new(WebSearch::new()))
            .register(
                "get_stock_price",
                Capability::GetStockPrice,
                Arc::new(StockPrice::new()),
            )
            .register(
                "get_market_summary",
                Capability::GetMarketSummary,
                Arc::new(MarketSummary::new()),
            )
            .register(
                "save_report",
                Capability::SaveReport,
                Arc::new(SaveReport::new(reports_dir.as_ref())),
            )
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    impl ToolHandler for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn invoke(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
            Ok(Value::Object(arguments.clone()))
        }
    }

    #[test]
    fn lookup_finds_registered_tool() {
        let registry = ToolRegistryBuilder::new()
            .register("echo", Capability::SearchWeb, Arc::new(Echo))
            .build();

        let entry = registry.lookup("echo").unwrap();
        assert_eq!(entry.effective_capability(), Capability::SearchWeb);

        let args = json!({"a": 1}).as_object().cloned().unwrap();
        let payload = entry.handler().invoke(&args).unwrap();
        assert_eq!(payload["a"], 1);
    }

    #[test]
    fn lookup_misses_unregistered_tool() {
        let registry = ToolRegistryBuilder::new().build();
        assert!(registry.lookup("echo").is_none());
    }

    #[test]
    fn undeclared_capability_falls_back_to_baseline() {
        let registry = ToolRegistryBuilder::new()
            .register_baseline("echo", Arc::new(Echo))
            .build();
        assert_eq!(
            registry.lookup("echo").unwrap().effective_capability(),
            Capability::baseline()
        );
    }

    #[test]
    fn standard_registry_has_the_full_roster() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::standard(dir.path());
        let names: Vec<&str> = registry.tool_names().collect();
        assert_eq!(
            names,
            vec![
                "get_market_summary",
                "get_stock_price",
                "save_report",
                "search_internal",
                "search_web",
            ]
        );
        assert_eq!(
            registry.lookup("save_report").unwrap().effective_capability(),
            Capability::SaveReport
        );
    }
}
