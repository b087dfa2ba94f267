//! Price Data Tool
//!
//! Fetches the current market snapshot for a single token.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema,
};

use crate::feeds::MarketDataFeed;

/// Tool for looking up live token prices
pub struct GetCryptoPriceTool {
    feed: Arc<dyn MarketDataFeed>,
}

impl GetCryptoPriceTool {
    pub fn new(feed: Arc<dyn MarketDataFeed>) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl Tool for GetCryptoPriceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_crypto_price".into(),
            description: "Get the current price and market data for a cryptocurrency. \
                          Returns price, 24h/7d change, market cap, volume, and ATH distance."
                .into(),
            parameters: vec![ParameterSchema {
                name: "token".into(),
                param_type: "string".into(),
                description: "Token symbol, name, or id (e.g., 'BTC', 'bitcoin')".into(),
                required: true,
                default: None,
                enum_values: None,
            }],
            category: Some("market_data".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let token = call
            .arguments
            .get("token")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim();
        if token.is_empty() {
            return Ok(ToolResult::failure(
                "get_crypto_price",
                "token must be a non-empty string",
            ));
        }

        match self.feed.get_price(token).await {
            Ok(price) => {
                let data = serde_json::to_value(&price)?;
                Ok(ToolResult::success("get_crypto_price", price.market_summary()).with_data(data))
            }
            Err(e) => Ok(ToolResult::failure("get_crypto_price", e.to_string())),
        }
    }
}
