//! Market Overview Tool
//!
//! Global market snapshot: total cap, volume, and dominance shares.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::feeds::MarketDataFeed;
use crate::guidance::format_usd;

/// Tool for reading the global market snapshot
pub struct GetMarketOverviewTool {
    feed: Arc<dyn MarketDataFeed>,
}

impl GetMarketOverviewTool {
    pub fn new(feed: Arc<dyn MarketDataFeed>) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl Tool for GetMarketOverviewTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_market_overview".into(),
            description: "Get a global crypto market overview: total market cap, 24h volume, \
                          BTC/ETH dominance, and active market counts."
                .into(),
            parameters: vec![],
            category: Some("market_data".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        let overview = match self.feed.get_market_overview().await {
            Ok(overview) => overview,
            Err(e) => return Ok(ToolResult::failure("get_market_overview", e.to_string())),
        };

        let output = format!(
            "Global crypto market:\n  \
             Total market cap: {} ({:+.2}% 24h)\n  \
             24h volume: {}\n  \
             BTC dominance: {:.1}%\n  \
             ETH dominance: {:.1}%\n  \
             Active cryptocurrencies: {} across {} markets",
            format_usd(Some(overview.total_market_cap_usd)),
            overview.market_cap_change_24h_percent,
            format_usd(Some(overview.total_volume_24h_usd)),
            overview.btc_dominance_percent,
            overview.eth_dominance_percent,
            overview.active_cryptocurrencies,
            overview.markets,
        );

        let data = serde_json::to_value(&overview)?;
        Ok(ToolResult::success("get_market_overview", output).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::MockFeed;

    #[tokio::test]
    async fn test_formats_global_snapshot() {
        let tool = GetMarketOverviewTool::new(Arc::new(MockFeed::default()));
        let result = tool.execute(&ToolCall::new("get_market_overview")).await.unwrap();

        assert!(result.success);
        assert!(result.output.contains("Global crypto market:"));
        assert!(result.output.contains("BTC dominance: 56.2%"));
        let data = result.data.unwrap();
        assert!(data["total_market_cap_usd"].as_f64().unwrap() > 0.0);
    }
}
