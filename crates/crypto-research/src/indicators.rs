//! Technical Indicators
//!
//! Pure calculations over daily close/volume series, oldest first. Every
//! function returns `None` instead of guessing when the series is too
//! short, and the snapshot builder carries that absence straight through
//! to the guidance engine.

use serde::{Deserialize, Serialize};

use crate::guidance::{format_usd, SignalSnapshot, VolumeStatus};

pub const RSI_PERIOD: usize = 14;
pub const SMA_FAST_PERIOD: usize = 20;
pub const SMA_SLOW_PERIOD: usize = 50;
/// Lookback for the support/resistance range
pub const SR_WINDOW: usize = 30;

/// Wilder-smoothed RSI. Needs at least `period + 1` closes.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain =
        deltas[..period].iter().map(|d| d.max(0.0)).sum::<f64>() / period as f64;
    let mut avg_loss =
        deltas[..period].iter().map(|d| (-d).max(0.0)).sum::<f64>() / period as f64;

    for delta in &deltas[period..] {
        avg_gain = (avg_gain * (period as f64 - 1.0) + delta.max(0.0)) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + (-delta).max(0.0)) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Simple moving average over the last `period` closes.
pub fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    Some(closes[closes.len() - period..].iter().sum::<f64>() / period as f64)
}

/// Latest daily volume against the mean of the seven days before it.
pub fn volume_ratio(volumes: &[f64]) -> Option<f64> {
    if volumes.len() < 8 {
        return None;
    }

    let current = volumes[volumes.len() - 1];
    let prior = &volumes[volumes.len() - 8..volumes.len() - 1];
    let avg = prior.iter().sum::<f64>() / 7.0;
    if avg == 0.0 {
        return None;
    }
    Some(current / avg)
}

/// Bucket a volume ratio for the signal snapshot.
pub fn volume_status_from_ratio(ratio: f64) -> VolumeStatus {
    if ratio < 0.8 {
        VolumeStatus::Below
    } else if ratio <= 1.2 {
        VolumeStatus::Average
    } else {
        VolumeStatus::Above
    }
}

/// Percent change from `days` closes ago to the latest close.
pub fn percent_change(closes: &[f64], days: usize) -> Option<f64> {
    if days == 0 || closes.len() < days + 1 {
        return None;
    }

    let current = closes[closes.len() - 1];
    let past = closes[closes.len() - 1 - days];
    if past == 0.0 {
        return None;
    }
    Some((current / past - 1.0) * 100.0)
}

/// Lowest close in the window preceding the latest close.
pub fn rolling_low(closes: &[f64], window: usize) -> Option<f64> {
    recent_window(closes, window)?.iter().copied().reduce(f64::min)
}

/// Highest close in the window preceding the latest close.
pub fn rolling_high(closes: &[f64], window: usize) -> Option<f64> {
    recent_window(closes, window)?.iter().copied().reduce(f64::max)
}

/// The `window` closes before the latest one. The latest close is excluded:
/// support/resistance describe the prior range the latest close is tested
/// against.
fn recent_window(closes: &[f64], window: usize) -> Option<&[f64]> {
    if window == 0 || closes.len() < 2 {
        return None;
    }
    let body = &closes[..closes.len() - 1];
    let start = body.len().saturating_sub(window);
    Some(&body[start..])
}

pub fn interpret_rsi(rsi: f64) -> &'static str {
    if rsi >= 80.0 {
        "Extremely overbought - high reversal risk"
    } else if rsi >= 70.0 {
        "Overbought - potential pullback"
    } else if rsi >= 60.0 {
        "Bullish momentum"
    } else if rsi >= 40.0 {
        "Neutral"
    } else if rsi >= 30.0 {
        "Bearish momentum"
    } else if rsi >= 20.0 {
        "Oversold - potential bounce"
    } else {
        "Extremely oversold - high reversal potential"
    }
}

pub fn interpret_volume(ratio: f64) -> &'static str {
    if ratio >= 1.5 {
        "Significantly elevated - strong market interest"
    } else if ratio >= 1.0 {
        "Above average - moderate interest"
    } else if ratio >= 0.75 {
        "Normal range"
    } else if ratio >= 0.5 {
        "Below average - declining interest"
    } else {
        "Very low - potential breakout setup or disinterest"
    }
}

/// How much of the series the indicators could actually use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    Full,
    Partial,
    Limited,
    Minimal,
}

impl DataQuality {
    pub fn from_points(points: usize) -> Self {
        if points >= 50 {
            Self::Full
        } else if points >= 20 {
            Self::Partial
        } else if points >= 14 {
            Self::Limited
        } else {
            Self::Minimal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Full => "Full data - high confidence",
            Self::Partial => "Partial data - moderate confidence",
            Self::Limited => "Limited data - low confidence",
            Self::Minimal => "Minimal data - very low confidence",
        }
    }
}

/// All indicators computed from one historical series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi_14: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub change_7d_percent: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub volume_status: Option<VolumeStatus>,
    pub support_1: Option<f64>,
    pub resistance_1: Option<f64>,
    pub sample_size: usize,
    pub data_quality: DataQuality,
}

impl IndicatorSet {
    pub fn compute(closes: &[f64], volumes: &[f64]) -> Self {
        let ratio = volume_ratio(volumes);

        Self {
            rsi_14: rsi(closes, RSI_PERIOD),
            sma_20: sma(closes, SMA_FAST_PERIOD),
            sma_50: sma(closes, SMA_SLOW_PERIOD),
            change_7d_percent: percent_change(closes, 7),
            volume_ratio: ratio,
            volume_status: ratio.map(volume_status_from_ratio),
            support_1: rolling_low(closes, SR_WINDOW),
            resistance_1: rolling_high(closes, SR_WINDOW),
            sample_size: closes.len(),
            data_quality: DataQuality::from_points(closes.len()),
        }
    }

    /// Carry the technicals into a guidance snapshot. Availability flags
    /// start out true; the orchestrator clears them after the subagent runs.
    pub fn to_snapshot(&self, current_price: Option<f64>) -> SignalSnapshot {
        SignalSnapshot {
            current_price,
            price_change_7d: self.change_7d_percent,
            sma_20: self.sma_20,
            sma_50: self.sma_50,
            rsi_14: self.rsi_14,
            support_1: self.support_1,
            resistance_1: self.resistance_1,
            volume_status: self.volume_status,
            ..Default::default()
        }
    }

    /// Overall trend call from a majority vote of price vs SMA20, SMA20 vs
    /// SMA50, and RSI vs 50.
    pub fn trend(&self, current_price: f64) -> &'static str {
        let Some(sma_20) = self.sma_20 else {
            return "Insufficient data for trend analysis";
        };

        let mut bullish = 0usize;
        let mut total = 1usize;
        if current_price > sma_20 {
            bullish += 1;
        }
        if let Some(sma_50) = self.sma_50 {
            total += 1;
            if sma_20 > sma_50 {
                bullish += 1;
            }
        }
        if let Some(rsi) = self.rsi_14 {
            total += 1;
            if rsi > 50.0 {
                bullish += 1;
            }
        }

        let share = bullish as f64 / total as f64;
        if bullish == total {
            "Strong uptrend"
        } else if share >= 0.66 {
            "Moderate uptrend"
        } else if share >= 0.33 {
            "Sideways / Choppy"
        } else if bullish > 0 {
            "Moderate downtrend"
        } else {
            "Strong downtrend"
        }
    }

    /// Plain-text block for prompt context and logs
    pub fn summary(&self, current_price: f64) -> String {
        let rsi_line = match self.rsi_14 {
            Some(rsi) => format!("- RSI(14): {:.1} ({})", rsi, interpret_rsi(rsi)),
            None => "- RSI(14): insufficient data".to_string(),
        };
        let volume_line = match self.volume_ratio {
            Some(ratio) => format!(
                "- Volume vs 7-day average: {:.2}x ({})",
                ratio,
                interpret_volume(ratio)
            ),
            None => "- Volume vs 7-day average: insufficient data".to_string(),
        };

        [
            format!("Technical indicators ({} daily closes):", self.sample_size),
            rsi_line,
            format!(
                "- SMA20: {} | SMA50: {}",
                format_usd(self.sma_20),
                format_usd(self.sma_50)
            ),
            format!("- Trend: {}", self.trend(current_price)),
            volume_line,
            format!(
                "- Support: {} | Resistance: {}",
                format_usd(self.support_1),
                format_usd(self.resistance_1)
            ),
            format!("- Data quality: {}", self.data_quality.label()),
        ]
        .join("\n")
    }
}
