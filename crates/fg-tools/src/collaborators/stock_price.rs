// stock_price.rs — Single-security quote lookup.
//
// Quotes come from a fixed table keyed by ticker. Korean listings use
// their numeric codes ("005930"), US listings their symbols ("AAPL").

use serde_json::{json, Map, Value};

use crate::error::ToolError;
use crate::registry::ToolHandler;

struct Quote {
    name: &'static str,
    price: f64,
    currency: &'static str,
    change_percent: f64,
}

pub struct StockPrice {
    quotes: Vec<(&'static str, Quote)>,
}

impl StockPrice {
    pub fn new() -> Self {
        Self {
            quotes: vec![
                (
                    "005930",
                    Quote {
                        name: "Samsung Electronics",
                        price: 71000.0,
                        currency: "KRW",
                        change_percent: 1.43,
                    },
                ),
                (
                    "035720",
                    Quote {
                        name: "Kakao",
                        price: 41950.0,
                        currency: "KRW",
                        change_percent: -0.71,
                    },
                ),
                (
                    "000660",
                    Quote {
                        name: "SK hynix",
                        price: 178400.0,
                        currency: "KRW",
                        change_percent: 2.18,
                    },
                ),
                (
                    "AAPL",
                    Quote {
                        name: "Apple Inc.",
                        price: 227.16,
                        currency: "USD",
                        change_percent: 0.38,
                    },
                ),
                (
                    "MSFT",
                    Quote {
                        name: "Microsoft Corporation",
                        price: 414.85,
                        currency: "USD",
                        change_percent: -0.12,
                    },
                ),
            ],
        }
    }
}

impl Default for StockPrice {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolHandler for StockPrice {
    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn invoke(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let ticker = arguments
            .get("ticker")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArgument {
                name: "ticker".to_string(),
            })?;

        let quote = self
            .quotes
            .iter()
            .find(|(symbol, _)| *symbol == ticker)
            .map(|(_, quote)| quote)
            .ok_or_else(|| ToolError::Failed {
                tool: "get_stock_price".to_string(),
                message: format!("unknown ticker '{}'", ticker),
            })?;

        tracing::debug!(ticker, price = quote.price, "quote served");
        Ok(json!({
            "ticker": ticker,
            "name": quote.name,
            "price": quote.price,
            "currency": quote.currency,
            "change_percent": quote.change_percent,
        }))
    }
}
