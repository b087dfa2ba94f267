//! Signal Classifiers
//!
//! Three small pure classifiers feed the decision table: trend structure
//! from price versus the two moving averages, a momentum regime from RSI,
//! and a support-breach flag.

use super::signals::SignalSnapshot;

/// Trend structure relative to the 20/50-day moving averages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureState {
    Bullish,
    Warning,
    RiskOff,
    Unknown,
}

/// RSI momentum regime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentumState {
    Positive,
    Neutral,
    Low,
    Unknown,
}

/// Classify trend structure.
///
/// Without both price and SMA50 the structure is unknowable. At or below
/// SMA50 the trend is risk-off regardless of SMA20. Above SMA50 with no
/// SMA20 reading we lean bullish rather than unknown; this lenient default
/// is deliberate and covered by tests.
pub fn classify_structure(snapshot: &SignalSnapshot) -> StructureState {
    let (Some(price), Some(sma_50)) = (snapshot.current_price, snapshot.sma_50) else {
        return StructureState::Unknown;
    };

    if price <= sma_50 {
        return StructureState::RiskOff;
    }

    match snapshot.sma_20 {
        None => StructureState::Bullish,
        Some(sma_20) if price > sma_20 => StructureState::Bullish,
        Some(_) => StructureState::Warning,
    }
}

/// Classify RSI into a momentum regime: below 45 low, 45-60 neutral,
/// above 60 positive.
pub fn classify_momentum(snapshot: &SignalSnapshot) -> MomentumState {
    match snapshot.rsi_14 {
        None => MomentumState::Unknown,
        Some(rsi) if rsi < 45.0 => MomentumState::Low,
        Some(rsi) if rsi <= 60.0 => MomentumState::Neutral,
        Some(_) => MomentumState::Positive,
    }
}

/// Whether price has broken below support, falling back to SMA50 as a
/// support proxy when no explicit level is known. With no price at all
/// there is nothing to breach.
pub fn support_breached(snapshot: &SignalSnapshot) -> bool {
    let Some(price) = snapshot.current_price else {
        return false;
    };

    match (snapshot.support_1, snapshot.sma_50) {
        (Some(support), _) => price < support,
        (None, Some(sma_50)) => price < sma_50,
        (None, None) => false,
    }
}
