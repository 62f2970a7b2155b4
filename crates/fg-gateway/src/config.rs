// config.rs — Gateway configuration.
//
// GatewayConfig determines where the gateway keeps its state: the
// append-only audit log and the saved-report directory. The
// `for_project()` constructor generates the standard layout under a
// `.finguard/` directory in the project root.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_AUDIT_RETRY_LIMIT: usize = 3;

/// Configuration for the governance gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Path to the append-only audit log.
    pub audit_log: PathBuf,

    /// Directory where save_report writes its files.
    pub reports_dir: PathBuf,

    /// How long a tool invocation may run before it is abandoned.
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Write attempts before an audit failure escalates to a rejection.
    #[serde(default = "default_audit_retry_limit")]
    pub audit_retry_limit: usize,
}

fn default_tool_timeout_secs() -> u64 {
    DEFAULT_TOOL_TIMEOUT_SECS
}

fn default_audit_retry_limit() -> usize {
    DEFAULT_AUDIT_RETRY_LIMIT
}

impl GatewayConfig {
    /// Create a config with the standard `.finguard/` layout for a project.
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        let fg_dir = project_root.as_ref().join(".finguard");
        Self {
            audit_log: fg_dir.join("audit.jsonl"),
            reports_dir: fg_dir.join("reports"),
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
            audit_retry_limit: DEFAULT_AUDIT_RETRY_LIMIT,
        }
    }

    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|source| GatewayError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
