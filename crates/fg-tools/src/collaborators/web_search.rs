// web_search.rs — Web search collaborator (offline stub).
//
// The production deployment points this at a real search provider; the
// bundled handler serves a fixed result set so every pipeline path is
// exercisable without network access. Web results are supplementary to
// internal search and are labeled as such in the payload.

use serde_json::{json, Map, Value};

use crate::error::ToolError;
use crate::registry::ToolHandler;

const MAX_RESULTS: usize = 3;

pub struct WebSearch {
    listings: Vec<(&'static str, &'static str, &'static str)>,
}

impl WebSearch {
    pub fn new() -> Self {
        Self {
            // (title, url, snippet)
            listings: vec![
                (
                    "Central bank holds policy rate steady",
                    "https://news.example.com/policy-rate",
                    "The monetary policy board left the base rate unchanged, citing \
                     easing inflation and soft domestic demand.",
                ),
                (
                    "Chipmakers guide above consensus on AI demand",
                    "https://news.example.com/chip-guidance",
                    "Major memory producers raised quarterly guidance as data center \
                     customers extend accelerator build-outs.",
                ),
                (
                    "Won weakens past key level against the dollar",
                    "https://news.example.com/fx-won",
                    "The currency slipped on portfolio outflows ahead of the options \
                     expiry, prompting verbal intervention.",
                ),
                (
                    "Battery makers flag slower EV order intake",
                    "https://news.example.com/ev-orders",
                    "Cell manufacturers noted push-outs in European electric vehicle \
                     programs while reiterating 2027 capacity targets.",
                ),
            ],
        }
    }
}

impl Default for WebSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolHandler for WebSearch {
    fn name(&self) -> &str {
        "search_web"
    }

    fn invoke(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let query = arguments
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArgument {
                name: "query".to_string(),
            })?;

        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();

        let results: Vec<Value> = self
            .listings
            .iter()
            .filter(|(title, _, snippet)| {
                let haystack = format!("{} {}", title, snippet).to_lowercase();
                terms.iter().any(|t| haystack.contains(t.as_str()))
            })
            .take(MAX_RESULTS)
            .map(|(title, url, snippet)| json!({"title": title, "url": url, "snippet": snippet}))
            .collect();

        tracing::debug!(query, hits = results.len(), "web search");
        Ok(json!({
            "query": query,
            "results": results,
            "note": "web results are supplementary; verify against internal sources",
        }))
    }
}
