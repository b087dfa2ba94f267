//! CoinGecko Feed
//!
//! REST client for the CoinGecko API, free and pro tiers. Tokens are
//! resolved through a static ticker map first, then passed through as
//! provider ids, with a name search as the last resort.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use super::MarketDataFeed;
use crate::error::{ResearchError, Result};
use crate::model::{
    HistoricalSeries, MarketOverview, PricePoint, TokenPrice, TokenSearchHit, TrendingToken,
};

const FREE_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PRO_BASE_URL: &str = "https://pro-api.coingecko.com/api/v3";
const PRO_KEY_HEADER: &str = "x-cg-pro-api-key";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Well-known ticker symbols mapped to CoinGecko ids
fn symbol_to_id(symbol: &str) -> Option<&'static str> {
    let id = match symbol {
        "BTC" => "bitcoin",
        "ETH" => "ethereum",
        "SOL" => "solana",
        "ADA" => "cardano",
        "DOT" => "polkadot",
        "AVAX" => "avalanche-2",
        "MATIC" => "matic-network",
        "POL" => "matic-network",
        "LINK" => "chainlink",
        "UNI" => "uniswap",
        "ATOM" => "cosmos",
        "XRP" => "ripple",
        "DOGE" => "dogecoin",
        "SHIB" => "shiba-inu",
        "LTC" => "litecoin",
        "BCH" => "bitcoin-cash",
        "NEAR" => "near",
        "APT" => "aptos",
        "ARB" => "arbitrum",
        "OP" => "optimism",
        "SUI" => "sui",
        "SEI" => "sei-network",
        "TIA" => "celestia",
        "INJ" => "injective-protocol",
        "FET" => "fetch-ai",
        "RNDR" => "render-token",
        "GRT" => "the-graph",
        "FIL" => "filecoin",
        "AAVE" => "aave",
        "MKR" => "maker",
        "CRV" => "curve-dao-token",
        "LDO" => "lido-dao",
        "RPL" => "rocket-pool",
        "SNX" => "synthetix-network-token",
        "COMP" => "compound-governance-token",
        "PEPE" => "pepe",
        "WIF" => "dogwifcoin",
        "BONK" => "bonk",
        "FLOKI" => "floki",
        _ => return None,
    };
    Some(id)
}

/// CoinGecko connection settings
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// Pro API key; `None` selects the free tier
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl CoinGeckoConfig {
    /// Read `COINGECKO_API_KEY` from the environment. Unset or empty means
    /// the free tier.
    pub fn from_env() -> Self {
        let api_key = std::env::var("COINGECKO_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self {
            api_key,
            ..Default::default()
        }
    }

    fn base_url(&self) -> &'static str {
        if self.api_key.is_some() {
            PRO_BASE_URL
        } else {
            FREE_BASE_URL
        }
    }
}

/// Live market data from the CoinGecko REST API
pub struct CoinGeckoFeed {
    client: reqwest::Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoFeed {
    pub fn new() -> Result<Self> {
        Self::from_config(CoinGeckoConfig::default())
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(CoinGeckoConfig::from_env())
    }

    pub fn from_config(config: CoinGeckoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ResearchError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Map a user-facing token (symbol, name, or id) to a CoinGecko id
    fn resolve_token_id(&self, token: &str) -> String {
        let trimmed = token.trim();
        symbol_to_id(&trimmed.to_uppercase())
            .map_or_else(|| trimmed.to_lowercase(), str::to_string)
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(format!("{}{}", self.config.base_url(), path));
        if let Some(key) = &self.config.api_key {
            request = request.header(PRO_KEY_HEADER, key);
        }
        request
    }

    async fn fetch_markets(&self, id: &str) -> Result<Vec<MarketCoin>> {
        let response = self
            .request("/coins/markets")
            .query(&[
                ("vs_currency", "usd"),
                ("ids", id),
                ("order", "market_cap_desc"),
                ("per_page", "1"),
                ("page", "1"),
                ("sparkline", "false"),
                ("price_change_percentage", "24h,7d"),
            ])
            .send()
            .await?;
        let response = check_status(response, id).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl MarketDataFeed for CoinGeckoFeed {
    async fn get_price(&self, token: &str) -> Result<TokenPrice> {
        let id = self.resolve_token_id(token);
        let mut coins = self.fetch_markets(&id).await?;

        if coins.is_empty() {
            // Unknown id: one retry through the name search
            if let Some(hit) = self.search(token, 1).await?.into_iter().next() {
                tracing::debug!(token, resolved = %hit.id, "resolved token via search");
                coins = self.fetch_markets(&hit.id).await?;
            }
        }

        coins
            .into_iter()
            .next()
            .map(MarketCoin::into_token_price)
            .ok_or_else(|| ResearchError::TokenNotFound(token.to_string()))
    }

    async fn get_history(&self, token: &str, days: u32) -> Result<HistoricalSeries> {
        let id = self.resolve_token_id(token);
        let days_param = days.to_string();
        let response = self
            .request(&format!("/coins/{id}/market_chart"))
            .query(&[
                ("vs_currency", "usd"),
                ("days", days_param.as_str()),
                ("interval", "daily"),
            ])
            .send()
            .await?;
        let response = check_status(response, &id).await?;
        let chart: MarketChart = response.json().await?;

        let points = chart
            .prices
            .iter()
            .enumerate()
            .map(|(i, entry)| PricePoint {
                timestamp: entry.timestamp(),
                price_usd: entry.value(),
                market_cap_usd: chart.market_caps.get(i).map_or(0.0, ChartPoint::value),
                volume_usd: chart.total_volumes.get(i).map_or(0.0, ChartPoint::value),
            })
            .collect();

        Ok(HistoricalSeries {
            symbol: token.trim().to_uppercase(),
            days,
            points,
        })
    }

    async fn get_market_overview(&self) -> Result<MarketOverview> {
        let response = self.request("/global").send().await?;
        let response = check_status(response, "global").await?;
        let envelope: GlobalEnvelope = response.json().await?;
        let data = envelope.data;

        Ok(MarketOverview {
            total_market_cap_usd: usd_entry(&data.total_market_cap),
            total_volume_24h_usd: usd_entry(&data.total_volume),
            btc_dominance_percent: data.market_cap_percentage.get("btc").copied().unwrap_or(0.0),
            eth_dominance_percent: data.market_cap_percentage.get("eth").copied().unwrap_or(0.0),
            active_cryptocurrencies: data.active_cryptocurrencies,
            markets: data.markets,
            market_cap_change_24h_percent: data.market_cap_change_percentage_24h_usd,
            updated_at: Utc
                .timestamp_opt(data.updated_at, 0)
                .single()
                .unwrap_or_else(Utc::now),
        })
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<TokenSearchHit>> {
        let response = self.request("/search").query(&[("query", query)]).send().await?;
        let response = check_status(response, query).await?;
        let results: SearchResponse = response.json().await?;

        Ok(results
            .coins
            .into_iter()
            .take(limit)
            .map(|coin| TokenSearchHit {
                id: coin.id,
                symbol: coin.symbol.to_uppercase(),
                name: coin.name,
                market_cap_rank: coin.market_cap_rank,
            })
            .collect())
    }

    async fn get_trending(&self) -> Result<Vec<TrendingToken>> {
        let response = self.request("/search/trending").send().await?;
        let response = check_status(response, "trending").await?;
        let trending: TrendingResponse = response.json().await?;

        Ok(trending
            .coins
            .into_iter()
            .map(|entry| TrendingToken {
                id: entry.item.id,
                symbol: entry.item.symbol.to_uppercase(),
                name: entry.item.name,
                market_cap_rank: entry.item.market_cap_rank,
            })
            .collect())
    }

    async fn health_check(&self) -> bool {
        match self.request("/ping").send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "CoinGecko ping failed");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "CoinGecko"
    }
}

async fn check_status(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ResearchError::TokenNotFound(context.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    Err(ResearchError::MarketData(format!("{status}: {snippet}")))
}

fn usd_entry(map: &HashMap<String, f64>) -> f64 {
    map.get("usd").copied().unwrap_or(0.0)
}

// ============
// Wire types
// ============

#[derive(Debug, Deserialize)]
struct MarketCoin {
    id: String,
    symbol: String,
    name: String,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    price_change_percentage_7d_in_currency: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    total_volume: Option<f64>,
    #[serde(default)]
    circulating_supply: Option<f64>,
    #[serde(default)]
    total_supply: Option<f64>,
    #[serde(default)]
    ath: Option<f64>,
    #[serde(default)]
    ath_change_percentage: Option<f64>,
    #[serde(default)]
    atl: Option<f64>,
    #[serde(default)]
    last_updated: Option<String>,
}

impl MarketCoin {
    fn into_token_price(self) -> TokenPrice {
        let updated_at = self
            .last_updated
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc));

        TokenPrice {
            id: self.id,
            symbol: self.symbol.to_uppercase(),
            name: self.name,
            price_usd: self.current_price.unwrap_or(0.0),
            change_24h_percent: self.price_change_percentage_24h.unwrap_or(0.0),
            change_7d_percent: self.price_change_percentage_7d_in_currency.unwrap_or(0.0),
            market_cap_usd: self.market_cap.unwrap_or(0.0),
            volume_24h_usd: self.total_volume.unwrap_or(0.0),
            circulating_supply: self.circulating_supply.unwrap_or(0.0),
            total_supply: self.total_supply,
            ath_usd: self.ath.unwrap_or(0.0),
            ath_change_percent: self.ath_change_percentage.unwrap_or(0.0),
            atl_usd: self.atl.unwrap_or(0.0),
            updated_at,
        }
    }
}

/// `[timestamp_ms, value]` pair as the chart endpoints return them
#[derive(Debug, Deserialize)]
struct ChartPoint(f64, f64);

impl ChartPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0 as i64)
            .single()
            .unwrap_or_else(Utc::now)
    }

    fn value(&self) -> f64 {
        self.1
    }
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Vec<ChartPoint>,
    #[serde(default)]
    market_caps: Vec<ChartPoint>,
    #[serde(default)]
    total_volumes: Vec<ChartPoint>,
}

#[derive(Debug, Deserialize)]
struct GlobalEnvelope {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    #[serde(default)]
    total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    total_volume: HashMap<String, f64>,
    #[serde(default)]
    market_cap_percentage: HashMap<String, f64>,
    #[serde(default)]
    active_cryptocurrencies: u32,
    #[serde(default)]
    markets: u32,
    #[serde(default)]
    market_cap_change_percentage_24h_usd: f64,
    #[serde(default)]
    updated_at: i64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
struct SearchCoin {
    id: String,
    symbol: String,
    name: String,
    #[serde(default)]
    market_cap_rank: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    coins: Vec<TrendingEntry>,
}

#[derive(Debug, Deserialize)]
struct TrendingEntry {
    item: TrendingItem,
}

#[derive(Debug, Deserialize)]
struct TrendingItem {
    id: String,
    symbol: String,
    name: String,
    #[serde(default)]
    market_cap_rank: Option<u32>,
}
