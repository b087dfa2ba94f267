//! Rationale Bullets
//!
//! Pure string-formatting pipelines that turn a snapshot plus the decided
//! bias into the three ordered, length-capped bullet lists of the guidance
//! block. Missing inputs drop their bullet; nothing here panics.

use num_format::{Locale, ToFormattedString};

use super::bias::ActionBias;
use super::classify::{MomentumState, StructureState};
use super::signals::SignalSnapshot;

pub const MAX_WHY_BULLETS: usize = 4;
pub const MAX_INVALIDATION_BULLETS: usize = 3;
pub const MAX_NEXT_CHECK_BULLETS: usize = 2;

/// USD price formatting for rationale text: "N/A" when absent, thousands
/// separators at or above $1,000, two decimals from $1, four below.
pub fn format_usd(value: Option<f64>) -> String {
    let Some(v) = value else {
        return "N/A".to_string();
    };

    if v >= 1000.0 {
        let whole = v.round() as i64;
        format!("${}", whole.to_formatted_string(&Locale::en))
    } else if v >= 1.0 {
        format!("${v:.2}")
    } else {
        format!("${v:.4}")
    }
}

/// Why the bias is what it is: structure first, then momentum, then the
/// 7-day move when notable, then the data-availability caveat.
pub fn why_bullets(
    snapshot: &SignalSnapshot,
    structure: StructureState,
    momentum: MomentumState,
) -> Vec<String> {
    let mut bullets = Vec::new();

    match structure {
        StructureState::Bullish => bullets.push(format!(
            "Price above both SMA20 ({}) and SMA50 ({}) — bullish structure intact",
            format_usd(snapshot.sma_20),
            format_usd(snapshot.sma_50)
        )),
        StructureState::Warning => bullets.push(format!(
            "Price above SMA50 ({}) but below SMA20 ({}) — warning structure, potential pullback",
            format_usd(snapshot.sma_50),
            format_usd(snapshot.sma_20)
        )),
        StructureState::RiskOff => bullets.push(format!(
            "Price below SMA50 ({}) — risk-off structure, trend weakening",
            format_usd(snapshot.sma_50)
        )),
        StructureState::Unknown => bullets.push(
            "Insufficient moving average data for structure determination — defaulting to conservative stance"
                .to_string(),
        ),
    }

    if let Some(rsi) = snapshot.rsi_14 {
        match momentum {
            MomentumState::Positive => {
                bullets.push(format!("RSI at {rsi:.1} shows positive momentum (>60)"));
            }
            MomentumState::Neutral => {
                bullets.push(format!("RSI at {rsi:.1} in neutral zone (45-60) — no extreme"));
            }
            MomentumState::Low => {
                bullets.push(format!("RSI at {rsi:.1} below 45 — momentum weakening"));
            }
            MomentumState::Unknown => {}
        }
    }

    if let Some(change) = snapshot.price_change_7d {
        if change <= -10.0 {
            bullets.push(format!(
                "7-day correction of {change:.1}% creates potential mean-reversion setup"
            ));
        } else if change <= -5.0 {
            bullets.push(format!(
                "Modest 7-day pullback ({change:.1}%) — watching for stabilization"
            ));
        } else if change >= 10.0 {
            bullets.push(format!(
                "Strong 7-day rally ({change:+.1}%) — caution on chasing"
            ));
        }
    }

    if snapshot.data_limited() {
        bullets.push(
            "News/sentiment data limited — bias reduced by one step for risk management"
                .to_string(),
        );
    }

    bullets.truncate(MAX_WHY_BULLETS);
    bullets
}

/// Conditions that would invalidate the current stance. Accumulative tiers
/// watch for the uptrend failing; defensive tiers watch for recovery levels
/// and panic lows.
pub fn invalidation_bullets(snapshot: &SignalSnapshot, bias: ActionBias) -> Vec<String> {
    let mut bullets = Vec::new();
    let accumulative = matches!(bias, ActionBias::Accumulate | ActionBias::LightAccumulate);

    if accumulative {
        if let Some(sma_20) = snapshot.sma_20 {
            bullets.push(format!(
                "Daily close below SMA20 at {}",
                format_usd(Some(sma_20))
            ));
        }
        if let Some(support) = snapshot.support_1 {
            bullets.push(format!(
                "Break below support at {}",
                format_usd(Some(support))
            ));
        } else if let Some(sma_50) = snapshot.sma_50 {
            bullets.push(format!(
                "Break below SMA50 at {}",
                format_usd(Some(sma_50))
            ));
        }
        if snapshot.rsi_14.is_some() {
            bullets.push("RSI < 45 sustained for 2+ days".to_string());
        }
    } else {
        if let Some(sma_50) = snapshot.sma_50 {
            bullets.push(format!(
                "Failure to reclaim SMA50 at {}",
                format_usd(Some(sma_50))
            ));
        }
        if let Some(support) = snapshot.support_1 {
            bullets.push(format!(
                "Break below support at {}",
                format_usd(Some(support))
            ));
        }
        bullets.push("RSI dropping below 30 (oversold panic)".to_string());
    }

    // Generic fallback so sparse snapshots still get a concrete trigger
    if bullets.len() < 2 {
        if let Some(price) = snapshot.current_price {
            bullets.push(format!(
                "Price drop >10% from current ({})",
                format_usd(Some(price * 0.9))
            ));
        }
    }

    bullets.truncate(MAX_INVALIDATION_BULLETS);
    bullets
}

/// What to re-examine before the next run, tuned to the decided tier.
pub fn next_check_bullets(snapshot: &SignalSnapshot, bias: ActionBias) -> Vec<String> {
    let mut bullets = vec!["Next weekly run".to_string()];

    match bias {
        ActionBias::Accumulate => {
            if let Some(resistance) = snapshot.resistance_1 {
                bullets.push(format!(
                    "Watch for breakout above {}",
                    format_usd(Some(resistance))
                ));
            } else {
                bullets.push("Watch for continued momentum and volume confirmation".to_string());
            }
        }
        ActionBias::LightAccumulate => {
            if let Some(sma_20) = snapshot.sma_20 {
                bullets.push(format!(
                    "Watch for reclaim of SMA20 at {}",
                    format_usd(Some(sma_20))
                ));
            } else {
                bullets.push("Watch for stabilization and support holding".to_string());
            }
        }
        ActionBias::Hold => {
            if let Some(sma_50) = snapshot.sma_50 {
                bullets.push(format!(
                    "Watch for reclaim of SMA50 at {}",
                    format_usd(Some(sma_50))
                ));
            } else {
                bullets.push("Watch for trend reversal signals".to_string());
            }
        }
        ActionBias::Pause => {
            bullets.push("Watch for capitulation and volume spike for potential bottom".to_string());
        }
    }

    if snapshot.data_limited() {
        bullets.push("Check if news/sentiment data availability restored".to_string());
    }

    bullets.truncate(MAX_NEXT_CHECK_BULLETS);
    bullets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rich_snapshot() -> SignalSnapshot {
        SignalSnapshot {
            current_price: Some(80_000.0),
            price_change_7d: Some(3.2),
            sma_20: Some(77_500.0),
            sma_50: Some(75_000.0),
            rsi_14: Some(58.0),
            support_1: Some(76_000.0),
            resistance_1: Some(85_000.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_usd_tiers() {
        assert_eq!(format_usd(None), "N/A");
        assert_eq!(format_usd(Some(77_500.0)), "$77,500");
        assert_eq!(format_usd(Some(1000.0)), "$1,000");
        assert_eq!(format_usd(Some(1_234_567.89)), "$1,234,568");
        assert_eq!(format_usd(Some(999.99)), "$999.99");
        assert_eq!(format_usd(Some(2.5)), "$2.50");
        assert_eq!(format_usd(Some(0.5)), "$0.5000");
    }

    #[test]
    fn test_why_bullets_bullish_full_snapshot() {
        let bullets = why_bullets(
            &rich_snapshot(),
            StructureState::Bullish,
            MomentumState::Neutral,
        );

        assert_eq!(bullets.len(), 2);
        assert!(bullets[0].contains("SMA20 ($77,500)"));
        assert!(bullets[0].contains("SMA50 ($75,000)"));
        assert!(bullets[0].contains("bullish structure intact"));
        assert!(bullets[1].contains("RSI at 58.0 in neutral zone"));
    }

    #[test]
    fn test_why_bullets_unknown_structure() {
        let bullets = why_bullets(
            &SignalSnapshot::default(),
            StructureState::Unknown,
            MomentumState::Unknown,
        );

        assert_eq!(bullets.len(), 1);
        assert!(bullets[0].contains("Insufficient moving average data"));
    }

    #[test]
    fn test_why_bullets_seven_day_tiers() {
        let correction = SignalSnapshot {
            price_change_7d: Some(-12.0),
            ..rich_snapshot()
        };
        let bullets = why_bullets(&correction, StructureState::Bullish, MomentumState::Neutral);
        assert!(bullets.iter().any(|b| b.contains("7-day correction of -12.0%")));

        let pullback = SignalSnapshot {
            price_change_7d: Some(-6.0),
            ..rich_snapshot()
        };
        let bullets = why_bullets(&pullback, StructureState::Bullish, MomentumState::Neutral);
        assert!(bullets.iter().any(|b| b.contains("Modest 7-day pullback (-6.0%)")));

        let rally = SignalSnapshot {
            price_change_7d: Some(12.0),
            ..rich_snapshot()
        };
        let bullets = why_bullets(&rally, StructureState::Bullish, MomentumState::Neutral);
        assert!(bullets.iter().any(|b| b.contains("Strong 7-day rally (+12.0%)")));
    }

    #[test]
    fn test_why_bullets_capped_at_four() {
        let limited = SignalSnapshot {
            price_change_7d: Some(-12.0),
            news_available: false,
            ..rich_snapshot()
        };
        let bullets = why_bullets(&limited, StructureState::Bullish, MomentumState::Neutral);

        assert_eq!(bullets.len(), MAX_WHY_BULLETS);
        assert!(bullets[3].contains("News/sentiment data limited"));
    }

    #[test]
    fn test_invalidation_accumulative_uses_support() {
        let bullets = invalidation_bullets(&rich_snapshot(), ActionBias::Accumulate);

        assert_eq!(bullets.len(), 3);
        assert_eq!(bullets[0], "Daily close below SMA20 at $77,500");
        assert_eq!(bullets[1], "Break below support at $76,000");
        assert_eq!(bullets[2], "RSI < 45 sustained for 2+ days");
    }

    #[test]
    fn test_invalidation_accumulative_sma50_fallback() {
        let no_support = SignalSnapshot {
            support_1: None,
            ..rich_snapshot()
        };
        let bullets = invalidation_bullets(&no_support, ActionBias::LightAccumulate);

        assert!(bullets.iter().any(|b| b == "Break below SMA50 at $75,000"));
    }

    #[test]
    fn test_invalidation_defensive_set() {
        let bullets = invalidation_bullets(&rich_snapshot(), ActionBias::Hold);

        assert_eq!(bullets.len(), 3);
        assert_eq!(bullets[0], "Failure to reclaim SMA50 at $75,000");
        assert_eq!(bullets[1], "Break below support at $76,000");
        assert_eq!(bullets[2], "RSI dropping below 30 (oversold panic)");
    }

    #[test]
    fn test_invalidation_sparse_snapshot_price_fallback() {
        let sparse = SignalSnapshot {
            current_price: Some(100_000.0),
            ..Default::default()
        };
        let bullets = invalidation_bullets(&sparse, ActionBias::Accumulate);

        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0], "Price drop >10% from current ($90,000)");
    }

    #[test]
    fn test_next_check_accumulate_watches_resistance() {
        let bullets = next_check_bullets(&rich_snapshot(), ActionBias::Accumulate);

        assert_eq!(bullets.len(), 2);
        assert_eq!(bullets[0], "Next weekly run");
        assert_eq!(bullets[1], "Watch for breakout above $85,000");
    }

    #[test]
    fn test_next_check_cap_trims_availability_note() {
        let limited = SignalSnapshot {
            news_available: false,
            ..rich_snapshot()
        };
        let bullets = next_check_bullets(&limited, ActionBias::Pause);

        assert_eq!(bullets.len(), MAX_NEXT_CHECK_BULLETS);
        assert_eq!(
            bullets[1],
            "Watch for capitulation and volume spike for potential bottom"
        );
        assert!(!bullets.iter().any(|b| b.contains("availability")));
    }
}
