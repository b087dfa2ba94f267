//! Token Discovery Tools
//!
//! Search by name or symbol, plus the current trending list.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema,
};

use crate::feeds::MarketDataFeed;

const DEFAULT_LIMIT: u64 = 5;
const MAX_LIMIT: u64 = 25;

/// Tool for searching tokens by name, symbol, or id
pub struct SearchTokensTool {
    feed: Arc<dyn MarketDataFeed>,
}

impl SearchTokensTool {
    pub fn new(feed: Arc<dyn MarketDataFeed>) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl Tool for SearchTokensTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_tokens".into(),
            description: "Search for cryptocurrencies by name or symbol. Returns matching \
                          tokens with their feed ids and market cap ranks."
                .into(),
            parameters: vec![
                ParameterSchema {
                    name: "query".into(),
                    param_type: "string".into(),
                    description: "Search text (e.g., 'bitcoin', 'sol')".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "limit".into(),
                    param_type: "number".into(),
                    description: "Maximum number of results (1-25)".into(),
                    required: false,
                    default: Some(json!(DEFAULT_LIMIT)),
                    enum_values: None,
                },
            ],
            category: Some("market_data".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call
            .arguments
            .get("query")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim();
        if query.is_empty() {
            return Ok(ToolResult::failure(
                "search_tokens",
                "query must be a non-empty string",
            ));
        }

        let limit = call
            .arguments
            .get("limit")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT) as usize;

        let hits = match self.feed.search(query, limit).await {
            Ok(hits) => hits,
            Err(e) => return Ok(ToolResult::failure("search_tokens", e.to_string())),
        };

        if hits.is_empty() {
            return Ok(ToolResult::success(
                "search_tokens",
                format!("No tokens matched '{query}'"),
            ));
        }

        let mut output = format!("Search results for '{query}':\n");
        for hit in &hits {
            let rank = hit
                .market_cap_rank
                .map(|r| format!(" [rank {r}]"))
                .unwrap_or_default();
            output.push_str(&format!(
                "  {} ({}){} - id: {}\n",
                hit.symbol, hit.name, rank, hit.id
            ));
        }

        let data = serde_json::to_value(&hits)?;
        Ok(ToolResult::success("search_tokens", output.trim_end()).with_data(data))
    }
}

/// Tool for listing currently trending tokens
pub struct GetTrendingTokensTool {
    feed: Arc<dyn MarketDataFeed>,
}

impl GetTrendingTokensTool {
    pub fn new(feed: Arc<dyn MarketDataFeed>) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl Tool for GetTrendingTokensTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_trending_tokens".into(),
            description: "Get the tokens currently trending by search interest.".into(),
            parameters: vec![],
            category: Some("market_data".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        let trending = match self.feed.get_trending().await {
            Ok(trending) => trending,
            Err(e) => return Ok(ToolResult::failure("get_trending_tokens", e.to_string())),
        };

        if trending.is_empty() {
            return Ok(ToolResult::success(
                "get_trending_tokens",
                "No trending tokens right now",
            ));
        }

        let mut output = String::from("Trending tokens:\n");
        for (i, token) in trending.iter().enumerate() {
            output.push_str(&format!("  {}. {} ({})\n", i + 1, token.symbol, token.name));
        }

        let data = serde_json::to_value(&trending)?;
        Ok(ToolResult::success("get_trending_tokens", output.trim_end()).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::MockFeed;

    #[tokio::test]
    async fn test_search_lists_matches_with_ids() {
        let tool = SearchTokensTool::new(Arc::new(MockFeed::default()));
        let call = ToolCall::new("search_tokens").with_arg("query", serde_json::json!("bit"));
        let result = tool.execute(&call).await.unwrap();

        assert!(result.success);
        assert!(result.output.contains("BTC (Bitcoin)"));
        assert!(result.output.contains("id: bitcoin"));
    }

    #[tokio::test]
    async fn test_search_reports_no_matches() {
        let tool = SearchTokensTool::new(Arc::new(MockFeed::default()));
        let call =
            ToolCall::new("search_tokens").with_arg("query", serde_json::json!("zzzznothing"));
        let result = tool.execute(&call).await.unwrap();

        assert!(result.success);
        assert!(result.output.contains("No tokens matched"));
    }

    #[tokio::test]
    async fn test_trending_lists_numbered_tokens() {
        let tool = GetTrendingTokensTool::new(Arc::new(MockFeed::default()));
        let result = tool
            .execute(&ToolCall::new("get_trending_tokens"))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.starts_with("Trending tokens:"));
        assert!(result.output.contains("1. BTC (Bitcoin)"));
    }
}
