//! Domain Models
//!
//! Market data types shared by the feeds, the indicator engine, and the
//! research tools. Fields mirror what the upstream market APIs actually
//! return; anything a provider may omit is an `Option`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::guidance::format_usd;

/// Current price and market stats for a single token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPrice {
    /// Provider id, e.g. "bitcoin"
    pub id: String,
    /// Ticker symbol, uppercased, e.g. "BTC"
    pub symbol: String,
    /// Display name, e.g. "Bitcoin"
    pub name: String,
    pub price_usd: f64,
    pub change_24h_percent: f64,
    pub change_7d_percent: f64,
    pub market_cap_usd: f64,
    pub volume_24h_usd: f64,
    pub circulating_supply: f64,
    pub total_supply: Option<f64>,
    pub ath_usd: f64,
    pub ath_change_percent: f64,
    pub atl_usd: f64,
    pub updated_at: DateTime<Utc>,
}

impl TokenPrice {
    /// Plain-text market snapshot for prompt context and logs
    pub fn market_summary(&self) -> String {
        [
            format!("Current market data for {} ({}):", self.name, self.symbol),
            format!("- Price: {}", format_usd(Some(self.price_usd))),
            format!("- 24h change: {:+.2}%", self.change_24h_percent),
            format!("- 7d change: {:+.2}%", self.change_7d_percent),
            format!("- Market cap: {}", format_usd(Some(self.market_cap_usd))),
            format!("- 24h volume: {}", format_usd(Some(self.volume_24h_usd))),
            format!(
                "- ATH: {} ({:+.1}% from ATH)",
                format_usd(Some(self.ath_usd)),
                self.ath_change_percent
            ),
        ]
        .join("\n")
    }
}

/// One daily observation in a historical series
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price_usd: f64,
    pub market_cap_usd: f64,
    pub volume_usd: f64,
}

/// Daily price/volume history for a token, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub symbol: String,
    pub days: u32,
    pub points: Vec<PricePoint>,
}

impl HistoricalSeries {
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price_usd).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.volume_usd).collect()
    }

    pub fn latest_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.price_usd)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Global market overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOverview {
    pub total_market_cap_usd: f64,
    pub total_volume_24h_usd: f64,
    pub btc_dominance_percent: f64,
    pub eth_dominance_percent: f64,
    pub active_cryptocurrencies: u32,
    pub markets: u32,
    pub market_cap_change_24h_percent: f64,
    pub updated_at: DateTime<Utc>,
}

/// One hit from a token search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSearchHit {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_cap_rank: Option<u32>,
}

/// One entry from the trending list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingToken {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_cap_rank: Option<u32>,
}
