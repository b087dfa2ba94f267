//! Mock Feed
//!
//! Deterministic synthetic market data for offline runs, demos, and tests.
//! Prices depend only on the seed table and the requested day count, so the
//! indicator and guidance pipeline produces stable results against it.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};

use super::MarketDataFeed;
use crate::error::{ResearchError, Result};
use crate::model::{
    HistoricalSeries, MarketOverview, PricePoint, TokenPrice, TokenSearchHit, TrendingToken,
};

struct SeedToken {
    id: &'static str,
    symbol: &'static str,
    name: &'static str,
    price: f64,
    change_24h: f64,
    change_7d: f64,
}

const SEED_TOKENS: &[SeedToken] = &[
    SeedToken { id: "bitcoin", symbol: "BTC", name: "Bitcoin", price: 97_500.0, change_24h: 2.5, change_7d: 5.8 },
    SeedToken { id: "ethereum", symbol: "ETH", name: "Ethereum", price: 3_450.0, change_24h: 1.8, change_7d: 4.2 },
    SeedToken { id: "solana", symbol: "SOL", name: "Solana", price: 195.0, change_24h: 3.2, change_7d: -2.1 },
    SeedToken { id: "cardano", symbol: "ADA", name: "Cardano", price: 0.95, change_24h: -0.5, change_7d: 1.3 },
    SeedToken { id: "polkadot", symbol: "DOT", name: "Polkadot", price: 7.20, change_24h: 0.8, change_7d: -3.5 },
    SeedToken { id: "chainlink", symbol: "LINK", name: "Chainlink", price: 24.50, change_24h: 4.1, change_7d: 8.9 },
    SeedToken { id: "avalanche-2", symbol: "AVAX", name: "Avalanche", price: 42.0, change_24h: -1.2, change_7d: 2.4 },
    SeedToken { id: "dogecoin", symbol: "DOGE", name: "Dogecoin", price: 0.38, change_24h: 6.5, change_7d: 12.3 },
    SeedToken { id: "ripple", symbol: "XRP", name: "XRP", price: 2.35, change_24h: 1.1, change_7d: -0.8 },
    SeedToken { id: "litecoin", symbol: "LTC", name: "Litecoin", price: 105.0, change_24h: 0.3, change_7d: 1.9 },
];

/// Offline market data feed with a fixed token universe
#[derive(Default)]
pub struct MockFeed;

impl MockFeed {
    pub fn new() -> Self {
        Self
    }

    fn find_seed(token: &str) -> Result<&'static SeedToken> {
        let upper = token.trim().to_uppercase();
        let lower = token.trim().to_lowercase();

        SEED_TOKENS
            .iter()
            .find(|seed| seed.symbol == upper || seed.id == lower)
            .ok_or_else(|| ResearchError::TokenNotFound(token.to_string()))
    }

    /// Gentle uptrend from 90% of the seed price to the seed price, with a
    /// small oscillation so RSI and volume ratios are non-trivial.
    fn synthetic_points(base: f64, days: u32) -> Vec<PricePoint> {
        let now = Utc::now();
        let span = f64::from(days.max(1));

        (0..days)
            .map(|i| {
                let t = f64::from(i);
                let price = base * (0.90 + 0.10 * (t / span) + 0.02 * (t / 5.0).sin());
                let volume = base * 2_000_000.0 * (1.0 + 0.3 * (t / 3.0).sin());
                PricePoint {
                    timestamp: now - ChronoDuration::days(i64::from(days - i)),
                    price_usd: price,
                    market_cap_usd: price * 19_000_000.0,
                    volume_usd: volume,
                }
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataFeed for MockFeed {
    async fn get_price(&self, token: &str) -> Result<TokenPrice> {
        let seed = Self::find_seed(token)?;

        Ok(TokenPrice {
            id: seed.id.to_string(),
            symbol: seed.symbol.to_string(),
            name: seed.name.to_string(),
            price_usd: seed.price,
            change_24h_percent: seed.change_24h,
            change_7d_percent: seed.change_7d,
            market_cap_usd: seed.price * 19_000_000.0,
            volume_24h_usd: seed.price * 450_000.0,
            circulating_supply: 19_000_000.0,
            total_supply: Some(21_000_000.0),
            ath_usd: seed.price * 1.15,
            ath_change_percent: -13.0,
            atl_usd: seed.price * 0.01,
            updated_at: Utc::now(),
        })
    }

    async fn get_history(&self, token: &str, days: u32) -> Result<HistoricalSeries> {
        let seed = Self::find_seed(token)?;

        Ok(HistoricalSeries {
            symbol: seed.symbol.to_string(),
            days,
            points: Self::synthetic_points(seed.price, days),
        })
    }

    async fn get_market_overview(&self) -> Result<MarketOverview> {
        Ok(MarketOverview {
            total_market_cap_usd: 3_400_000_000_000.0,
            total_volume_24h_usd: 128_000_000_000.0,
            btc_dominance_percent: 56.2,
            eth_dominance_percent: 12.8,
            active_cryptocurrencies: 11_500,
            markets: 1_050,
            market_cap_change_24h_percent: 1.2,
            updated_at: Utc::now(),
        })
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<TokenSearchHit>> {
        let needle = query.trim().to_lowercase();

        Ok(SEED_TOKENS
            .iter()
            .filter(|seed| {
                seed.id.contains(&needle)
                    || seed.name.to_lowercase().contains(&needle)
                    || seed.symbol.to_lowercase().contains(&needle)
            })
            .take(limit)
            .enumerate()
            .map(|(rank, seed)| TokenSearchHit {
                id: seed.id.to_string(),
                symbol: seed.symbol.to_string(),
                name: seed.name.to_string(),
                market_cap_rank: Some(rank as u32 + 1),
            })
            .collect())
    }

    async fn get_trending(&self) -> Result<Vec<TrendingToken>> {
        Ok(SEED_TOKENS
            .iter()
            .take(3)
            .enumerate()
            .map(|(rank, seed)| TrendingToken {
                id: seed.id.to_string(),
                symbol: seed.symbol.to_string(),
                name: seed.name.to_string(),
                market_cap_rank: Some(rank as u32 + 1),
            })
            .collect())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "MockFeed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_price_lookup_by_symbol_and_id() {
        let feed = MockFeed::new();

        let by_symbol = feed.get_price("BTC").await.unwrap();
        let by_id = feed.get_price("bitcoin").await.unwrap();

        assert_eq!(by_symbol.symbol, "BTC");
        assert!((by_symbol.price_usd - by_id.price_usd).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_unknown_token_is_an_error() {
        let feed = MockFeed::new();
        let err = feed.get_price("NOPE").await.unwrap_err();
        assert!(matches!(err, ResearchError::TokenNotFound(_)));
    }

    #[tokio::test]
    async fn test_history_is_deterministic() {
        let feed = MockFeed::new();

        let first = feed.get_history("ETH", 90).await.unwrap();
        let second = feed.get_history("ETH", 90).await.unwrap();

        assert_eq!(first.len(), 90);
        assert_eq!(first.closes(), second.closes());
        assert_eq!(first.volumes(), second.volumes());
    }

    #[tokio::test]
    async fn test_history_ends_near_seed_price() {
        let feed = MockFeed::new();
        let series = feed.get_history("BTC", 90).await.unwrap();

        let last = series.latest_price().unwrap();
        assert!((last - 97_500.0).abs() / 97_500.0 < 0.05);
    }

    #[tokio::test]
    async fn test_search_filters_by_name_fragment() {
        let feed = MockFeed::new();

        let hits = feed.search("ether", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].symbol, "ETH");

        let all = feed.search("", 100).await.unwrap();
        assert_eq!(all.len(), SEED_TOKENS.len());
    }

    #[tokio::test]
    async fn test_trending_returns_top_seeds() {
        let feed = MockFeed::new();
        let trending = feed.get_trending().await.unwrap();

        assert_eq!(trending.len(), 3);
        assert_eq!(trending[0].symbol, "BTC");
    }
}
