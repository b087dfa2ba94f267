//! Signal Snapshot
//!
//! The typed input to the guidance engine. Every market-derived field is
//! optional: a missing value must degrade the decision, never crash it.
//! `0.0` is a legitimate price/oscillator reading, so absence is always
//! `None`, never a sentinel.

use serde::{Deserialize, Serialize};

/// Latest 24h volume relative to the trailing week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeStatus {
    #[serde(rename = "below")]
    Below,
    #[serde(rename = "avg")]
    Average,
    #[serde(rename = "above")]
    Above,
}

/// Point-in-time technical and data-availability signals for one token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub current_price: Option<f64>,
    /// 7-day price change in percent
    pub price_change_7d: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub rsi_14: Option<f64>,
    /// Nearest known support level below recent trading
    pub support_1: Option<f64>,
    /// Nearest known resistance level above recent trading
    pub resistance_1: Option<f64>,
    pub volume_status: Option<VolumeStatus>,
    /// Whether the news branch produced a usable report
    #[serde(default = "default_true")]
    pub news_available: bool,
    /// Whether the sentiment branch produced a usable report
    #[serde(default = "default_true")]
    pub sentiment_available: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SignalSnapshot {
    fn default() -> Self {
        Self {
            current_price: None,
            price_change_7d: None,
            sma_20: None,
            sma_50: None,
            rsi_14: None,
            support_1: None,
            resistance_1: None,
            volume_status: None,
            news_available: true,
            sentiment_available: true,
        }
    }
}

impl SignalSnapshot {
    /// True when either qualitative feed failed this run
    pub fn data_limited(&self) -> bool {
        !self.news_available || !self.sentiment_available
    }
}
