// market_summary.rs — Major index snapshot.

use serde_json::{json, Map, Value};

use crate::error::ToolError;
use crate::registry::ToolHandler;

struct IndexLevel {
    name: &'static str,
    symbol: &'static str,
    level: f64,
    change_percent: f64,
}

pub struct MarketSummary {
    indices: Vec<IndexLevel>,
}

impl MarketSummary {
    pub fn new() -> Self {
        Self {
            indices: vec![
                IndexLevel {
                    name: "KOSPI",
                    symbol: "^KS11",
                    level: 2687.44,
                    change_percent: 0.42,
                },
                IndexLevel {
                    name: "KOSDAQ",
                    symbol: "^KQ11",
                    level: 772.81,
                    change_percent: -0.35,
                },
                IndexLevel {
                    name: "Dow Jones",
                    symbol: "^DJI",
                    level: 42063.36,
                    change_percent: 0.11,
                },
                IndexLevel {
                    name: "Nasdaq",
                    symbol: "^IXIC",
                    level: 17948.32,
                    change_percent: 0.67,
                },
                IndexLevel {
                    name: "S&P 500",
                    symbol: "^GSPC",
                    level: 5702.55,
                    change_percent: 0.28,
                },
            ],
        }
    }
}

impl Default for MarketSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolHandler for MarketSummary {
    fn name(&self) -> &str {
        "get_market_summary"
    }

    fn invoke(&self, _arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let advancing = self.indices.iter().filter(|i| i.change_percent > 0.0).count();
        let declining = self.indices.iter().filter(|i| i.change_percent < 0.0).count();

        let indices: Vec<Value> = self
            .indices
            .iter()
            .map(|i| {
                json!({
                    "name": i.name,
                    "symbol": i.symbol,
                    "level": i.level,
                    "change_percent": i.change_percent,
                })
            })
            .collect();

        Ok(json!({
            "indices": indices,
            "advancing": advancing,
            "declining": declining,
        }))
    }
}
