//! Service Kit - Agent Tools
//!
//! Domain-specific tools that implement `agent_core::Tool` for the research
//! pipeline. `standard_registry` wires the full set for the tool server.

use std::path::Path;
use std::sync::Arc;

use agent_core::ToolRegistry;

use crate::feeds::MarketDataFeed;
use crate::notion::NotionClient;

mod market_overview;
mod price_data;
mod price_history;
mod report_journal;
mod token_search;

pub use market_overview::GetMarketOverviewTool;
pub use price_data::GetCryptoPriceTool;
pub use price_history::GetHistoricalPricesTool;
pub use report_journal::{SaveResearchReportTool, SearchResearchReportsTool};
pub use token_search::{GetTrendingTokensTool, SearchTokensTool};

/// Build the full tool registry backed by one market data feed.
///
/// The journal tools publish to Notion when a client is supplied and fall
/// back to the local reports directory otherwise.
pub fn standard_registry(
    feed: Arc<dyn MarketDataFeed>,
    notion: Option<Arc<NotionClient>>,
    output_dir: &Path,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(GetCryptoPriceTool::new(feed.clone()));
    registry.register(GetHistoricalPricesTool::new(feed.clone()));
    registry.register(GetMarketOverviewTool::new(feed.clone()));
    registry.register(SearchTokensTool::new(feed.clone()));
    registry.register(GetTrendingTokensTool::new(feed));
    registry.register(SaveResearchReportTool::new(
        notion.clone(),
        output_dir.to_path_buf(),
    ));
    registry.register(SearchResearchReportsTool::new(
        notion,
        output_dir.to_path_buf(),
    ));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::MockFeed;

    #[test]
    fn test_standard_registry_registers_all_tools() {
        let registry = standard_registry(
            Arc::new(MockFeed::default()),
            None,
            Path::new("reports"),
        );

        assert_eq!(registry.len(), 7);
        let mut names = registry.names();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "get_crypto_price",
                "get_historical_prices",
                "get_market_overview",
                "get_trending_tokens",
                "save_research_report",
                "search_research_reports",
                "search_tokens",
            ]
        );
    }
}
