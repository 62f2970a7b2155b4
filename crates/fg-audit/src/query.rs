// query.rs — Filter shape for the dashboard-facing read path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{AuditEvent, Outcome};

/// Filters for [`crate::sink::query`]. All fields are optional and
/// conjunctive: an unset field matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Exact identity token match.
    pub raw_id: Option<String>,
    /// Exact tool name match.
    pub tool_name: Option<String>,
    /// Inclusive lower bound on the event timestamp.
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the event timestamp.
    pub until: Option<DateTime<Utc>>,
    /// Exact outcome match.
    pub outcome: Option<Outcome>,
}

impl AuditQuery {
    pub fn matches(&self, event: &AuditEvent) -> bool {
        if let Some(raw_id) = &self.raw_id {
            if &event.raw_id != raw_id {
                return false;
            }
        }
        if let Some(tool_name) = &self.tool_name {
            if &event.tool_name != tool_name {
                return false;
            }
        }
        if let Some(since) = self.since {
            if event.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if event.timestamp > until {
                return false;
            }
        }
        if let Some(outcome) = self.outcome {
            if event.outcome != outcome {
                return false;
            }
        }
        true
    }
}
