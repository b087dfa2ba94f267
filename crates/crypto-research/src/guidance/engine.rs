//! Guidance Engine
//!
//! Derives the weekly allocation guidance from a signal snapshot and renders
//! it as markdown. Fully deterministic: the same snapshot always produces
//! the same guidance, and no model output feeds into the tier, the
//! percentage, or the bullets.

use serde::{Deserialize, Serialize};

use super::bias::{decide_bias, ActionBias};
use super::classify::{classify_momentum, classify_structure, support_breached};
use super::rationale::{invalidation_bullets, next_check_bullets, why_bullets};
use super::signals::SignalSnapshot;

/// The derived weekly guidance block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationGuidance {
    pub action_bias: ActionBias,
    /// Percent of the weekly allocation to deploy, fixed per tier
    pub allocation_percent: u8,
    pub time_horizon: String,
    pub why_bullets: Vec<String>,
    pub invalidation_triggers: Vec<String>,
    pub next_check_bullets: Vec<String>,
}

/// Run the full decision pipeline: classify, decide, apply the data
/// completeness downgrade, then build the rationale bullets from the final
/// tier.
pub fn derive_guidance(snapshot: &SignalSnapshot) -> AllocationGuidance {
    let structure = classify_structure(snapshot);
    let momentum = classify_momentum(snapshot);
    let breached = support_breached(snapshot);

    let base = decide_bias(structure, momentum, breached);
    // One conservatism step when news or sentiment failed, applied once
    let bias = if snapshot.data_limited() {
        base.downgrade()
    } else {
        base
    };

    tracing::debug!(
        structure = ?structure,
        momentum = ?momentum,
        breached,
        base = %base,
        bias = %bias,
        "derived allocation guidance"
    );

    AllocationGuidance {
        action_bias: bias,
        allocation_percent: bias.allocation_percent(),
        time_horizon: "1 week".to_string(),
        why_bullets: why_bullets(snapshot, structure, momentum),
        invalidation_triggers: invalidation_bullets(snapshot, bias),
        next_check_bullets: next_check_bullets(snapshot, bias),
    }
}

/// Render the guidance as a markdown section ready for report injection.
pub fn render_guidance(guidance: &AllocationGuidance) -> String {
    let mut lines = vec![
        "### 🧭 Weekly Allocation Guidance".to_string(),
        format!("**Action Bias**: {}", guidance.action_bias),
        format!(
            "**Allocation Hint**: {}% of weekly allocation",
            guidance.allocation_percent
        ),
        format!("**Time Horizon**: {}", guidance.time_horizon),
        String::new(),
        "**Why**".to_string(),
        String::new(),
    ];
    lines.extend(guidance.why_bullets.iter().map(|b| format!("- {b}")));

    lines.push(String::new());
    lines.push("**Invalidation Triggers**".to_string());
    lines.push(String::new());
    lines.extend(
        guidance
            .invalidation_triggers
            .iter()
            .map(|b| format!("- {b}")),
    );

    lines.push(String::new());
    lines.push("**Next Check**".to_string());
    lines.push(String::new());
    lines.extend(
        guidance
            .next_check_bullets
            .iter()
            .map(|b| format!("- {b}")),
    );

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uptrend_snapshot() -> SignalSnapshot {
        SignalSnapshot {
            current_price: Some(80_000.0),
            sma_20: Some(77_500.0),
            sma_50: Some(75_000.0),
            rsi_14: Some(58.0),
            support_1: Some(76_000.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_uptrend_with_missing_news_downgrades_one_step() {
        let snapshot = SignalSnapshot {
            news_available: false,
            ..uptrend_snapshot()
        };
        let guidance = derive_guidance(&snapshot);

        assert_eq!(guidance.action_bias, ActionBias::LightAccumulate);
        assert_eq!(guidance.allocation_percent, 50);
        assert!(guidance
            .why_bullets
            .iter()
            .any(|b| b.contains("News/sentiment data limited")));
    }

    #[test]
    fn test_uptrend_with_positive_momentum_accumulates() {
        let snapshot = SignalSnapshot {
            rsi_14: Some(62.0),
            ..uptrend_snapshot()
        };
        let guidance = derive_guidance(&snapshot);

        assert_eq!(guidance.action_bias, ActionBias::Accumulate);
        assert_eq!(guidance.allocation_percent, 100);
    }

    #[test]
    fn test_below_sma50_with_support_intact_holds() {
        let snapshot = SignalSnapshot {
            current_price: Some(74_000.0),
            sma_20: Some(77_500.0),
            sma_50: Some(75_000.0),
            support_1: Some(72_000.0),
            rsi_14: Some(45.0),
            ..Default::default()
        };
        let guidance = derive_guidance(&snapshot);

        assert_eq!(guidance.action_bias, ActionBias::Hold);
        assert_eq!(guidance.allocation_percent, 25);
    }

    #[test]
    fn test_broken_support_below_sma50_pauses() {
        let snapshot = SignalSnapshot {
            current_price: Some(71_000.0),
            sma_50: Some(75_000.0),
            support_1: Some(72_000.0),
            ..Default::default()
        };
        let guidance = derive_guidance(&snapshot);

        assert_eq!(guidance.action_bias, ActionBias::Pause);
        assert_eq!(guidance.allocation_percent, 0);
    }

    #[test]
    fn test_price_only_snapshot_holds() {
        let snapshot = SignalSnapshot {
            current_price: Some(50_000.0),
            ..Default::default()
        };
        let guidance = derive_guidance(&snapshot);

        assert_eq!(guidance.action_bias, ActionBias::Hold);
        assert_eq!(guidance.allocation_percent, 25);
        assert!(guidance.why_bullets[0].contains("Insufficient moving average data"));
    }

    #[test]
    fn test_downgrade_applied_once_even_when_both_feeds_fail() {
        let snapshot = SignalSnapshot {
            news_available: false,
            sentiment_available: false,
            ..uptrend_snapshot()
        };
        let guidance = derive_guidance(&snapshot);

        // One step down from Accumulate, not two
        assert_eq!(guidance.action_bias, ActionBias::LightAccumulate);
    }

    #[test]
    fn test_same_snapshot_same_guidance() {
        let snapshot = uptrend_snapshot();
        assert_eq!(derive_guidance(&snapshot), derive_guidance(&snapshot));
    }

    #[test]
    fn test_weaker_momentum_never_raises_the_tier() {
        let strong = derive_guidance(&SignalSnapshot {
            rsi_14: Some(62.0),
            ..uptrend_snapshot()
        });
        let weak = derive_guidance(&SignalSnapshot {
            rsi_14: Some(40.0),
            ..uptrend_snapshot()
        });

        assert!(weak.action_bias < strong.action_bias);
    }

    #[test]
    fn test_render_contains_all_sections_and_bullets() {
        let guidance = derive_guidance(&uptrend_snapshot());
        let rendered = render_guidance(&guidance);

        assert!(rendered.starts_with("### 🧭 Weekly Allocation Guidance"));
        assert!(rendered.contains("**Action Bias**: Accumulate"));
        assert!(rendered.contains("**Allocation Hint**: 100% of weekly allocation"));
        assert!(rendered.contains("**Time Horizon**: 1 week"));
        assert!(rendered.contains("**Why**"));
        assert!(rendered.contains("**Invalidation Triggers**"));
        assert!(rendered.contains("**Next Check**"));

        let bullet_lines = rendered.lines().filter(|l| l.starts_with("- ")).count();
        assert!(bullet_lines >= 5);

        // Header block is contiguous: no blank line before Action Bias
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "### 🧭 Weekly Allocation Guidance");
        assert!(lines[1].starts_with("**Action Bias**"));

        // Prices in bullets keep thousands separators
        assert!(rendered.contains("$77,500"));
    }

    #[test]
    fn test_render_sparse_guidance_still_has_five_bullets() {
        let snapshot = SignalSnapshot {
            current_price: Some(50_000.0),
            ..Default::default()
        };
        let rendered = render_guidance(&derive_guidance(&snapshot));

        let bullet_lines = rendered.lines().filter(|l| l.starts_with("- ")).count();
        assert!(bullet_lines >= 5);
    }
}
