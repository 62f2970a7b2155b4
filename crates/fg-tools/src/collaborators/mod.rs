// collaborators/ — the concrete research tools.
//
// Each collaborator is a self-contained ToolHandler. The search and
// market tools ship with deterministic local datasets so the pipeline
// is fully testable offline; a production deployment swaps in handlers
// that reach the real providers behind the same trait.

mod internal_search;
mod market_summary;
mod save_report;
mod stock_price;
mod web_search;

pub use internal_search::InternalSearch;
pub use market_summary::MarketSummary;
pub use save_report::SaveReport;
pub use stock_price::StockPrice;
pub use web_search::WebSearch;
