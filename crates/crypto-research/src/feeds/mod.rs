//! Market Data Feeds
//!
//! One trait, multiple sources. The live implementation speaks to the
//! CoinGecko REST API; the mock serves deterministic synthetic data for
//! offline runs and tests.

pub mod coingecko;
pub mod mock;

pub use coingecko::{CoinGeckoConfig, CoinGeckoFeed};
pub use mock::MockFeed;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{HistoricalSeries, MarketOverview, TokenPrice, TokenSearchHit, TrendingToken};

/// Market data source (Strategy pattern)
///
/// Implement this to add a new source: another aggregator, an exchange
/// API, or a cached layer in front of one.
#[async_trait]
pub trait MarketDataFeed: Send + Sync {
    /// Current price and market stats for a symbol or provider id
    async fn get_price(&self, token: &str) -> Result<TokenPrice>;

    /// Daily price/volume history, oldest first
    async fn get_history(&self, token: &str, days: u32) -> Result<HistoricalSeries>;

    /// Global market overview
    async fn get_market_overview(&self) -> Result<MarketOverview>;

    /// Search tokens by name or symbol
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<TokenSearchHit>>;

    /// Tokens trending by search popularity
    async fn get_trending(&self) -> Result<Vec<TrendingToken>>;

    /// Whether the source is currently reachable
    async fn health_check(&self) -> bool;

    /// Source name for logs and status output
    fn name(&self) -> &str;
}
