//! Price History Tool
//!
//! Fetches daily closes for a token and summarizes the range.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema,
};

use crate::feeds::MarketDataFeed;
use crate::guidance::format_usd;

const DEFAULT_DAYS: u64 = 30;
const MAX_DAYS: u64 = 365;

/// Tool for retrieving historical daily prices
pub struct GetHistoricalPricesTool {
    feed: Arc<dyn MarketDataFeed>,
}

impl GetHistoricalPricesTool {
    pub fn new(feed: Arc<dyn MarketDataFeed>) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl Tool for GetHistoricalPricesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_historical_prices".into(),
            description: "Get daily historical prices for a cryptocurrency over a lookback \
                          window. Returns the latest close, range, average, and period change."
                .into(),
            parameters: vec![
                ParameterSchema {
                    name: "token".into(),
                    param_type: "string".into(),
                    description: "Token symbol, name, or id (e.g., 'BTC', 'bitcoin')".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "days".into(),
                    param_type: "number".into(),
                    description: "Lookback window in days (1-365)".into(),
                    required: false,
                    default: Some(json!(DEFAULT_DAYS)),
                    enum_values: None,
                },
            ],
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
                "get_historical_prices",
                "token must be a non-empty string",
            ));
        }

        let days = call
            .arguments
            .get("days")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_DAYS)
            .clamp(1, MAX_DAYS) as u32;

        let series = match self.feed.get_history(token, days).await {
            Ok(series) => series,
            Err(e) => return Ok(ToolResult::failure("get_historical_prices", e.to_string())),
        };

        let closes = series.closes();
        if closes.is_empty() {
            return Ok(ToolResult::failure(
                "get_historical_prices",
                format!("no history returned for {token}"),
            ));
        }

        let latest = closes[closes.len() - 1];
        let low = closes.iter().copied().fold(f64::INFINITY, f64::min);
        let high = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = closes.iter().sum::<f64>() / closes.len() as f64;
        let period_change = if closes[0] > 0.0 {
            (latest - closes[0]) / closes[0] * 100.0
        } else {
            0.0
        };

        let output = format!(
            "{} price history ({} days, {} daily closes):\n  \
             Latest: {}\n  \
             Range: {} - {}\n  \
             Average: {}\n  \
             Period change: {:+.2}%",
            series.symbol,
            series.days,
            closes.len(),
            format_usd(Some(latest)),
            format_usd(Some(low)),
            format_usd(Some(high)),
            format_usd(Some(average)),
            period_change,
        );

        let data = json!({
            "symbol": series.symbol,
            "days": series.days,
            "samples": closes.len(),
            "latest": latest,
            "low": low,
            "high": high,
            "average": average,
            "period_change_percent": period_change,
        });
        Ok(ToolResult::success("get_historical_prices", output).with_data(data))
    }
}
