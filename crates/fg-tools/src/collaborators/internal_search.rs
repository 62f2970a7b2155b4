// internal_search.rs — Keyword search over the internal research corpus.
//
// Internal notes take precedence over anything fetched from the open
// web, so this tool is the first stop for most research queries.

use serde_json::{json, Map, Value};

use crate::error::ToolError;
use crate::registry::ToolHandler;

/// Maximum hits returned per query.
const MAX_RESULTS: usize = 3;

/// A bundled corpus of research notes, searched by keyword overlap.
pub struct InternalSearch {
    corpus: Vec<(&'static str, &'static str)>,
}

impl InternalSearch {
    pub fn new() -> Self {
        Self {
            corpus: vec![
                (
                    "Semiconductor demand outlook",
                    "Memory pricing stabilized through the quarter; foundry utilization \
                     recovering on AI accelerator orders. Capex guidance unchanged.",
                ),
                (
                    "Domestic battery supply chain",
                    "Cathode input costs fell 12% year over year. Downstream cell makers \
                     renegotiating long-term contracts with automotive customers.",
                ),
                (
                    "Retail banking margin compression",
                    "Net interest margins narrowed for the third consecutive quarter as \
                     deposit competition intensified among the major banks.",
                ),
                (
                    "Shipbuilding order backlog",
                    "LNG carrier backlog extends into 2028. Yard capacity constraints are \
                     supporting pricing discipline across new orders.",
                ),
                (
                    "Platform advertising recovery",
                    "Search and display revenue re-accelerated; commerce take rates steady. \
                     Cost controls lifted operating margins above consensus.",
                ),
            ],
        }
    }
}

impl Default for InternalSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolHandler for InternalSearch {
    fn name(&self) -> &str {
        "search_internal"
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

        // Rank by how many query terms each note mentions.
        let mut scored: Vec<(usize, &(&str, &str))> = self
            .corpus
            .iter()
            .map(|note| {
                let haystack = format!("{} {}", note.0, note.1).to_lowercase();
                let score = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                (score, note)
            })
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let results: Vec<Value> = scored
            .into_iter()
            .take(MAX_RESULTS)
            .map(|(_, (title, body))| json!({"title": title, "body": body, "source": "internal"}))
            .collect();

        tracing::debug!(query, hits = results.len(), "internal search");
        Ok(json!({ "query": query, "results": results }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn matching_notes_are_returned_ranked() {
        let tool = InternalSearch::new();
        let payload = tool.invoke(&args(json!({"query": "semiconductor capex"}))).unwrap();
        let results = payload["results"].as_array().unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0]["title"], "Semiconductor demand outlook");
        assert_eq!(results[0]["source"], "internal");
    }

    #[test]
    fn no_match_yields_empty_results() {
        let tool = InternalSearch::new();
        let payload = tool.invoke(&args(json!({"query": "zzzz"}))).unwrap();
        assert!(payload["results"].as_array().unwrap().is_empty());
    }

    #[test]
    fn missing_query_is_an_invalid_argument() {
        let tool = InternalSearch::new();
        match tool.invoke(&Map::new()) {
            Err(ToolError::InvalidArgument { name }) => assert_eq!(name, "query"),
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }
}
