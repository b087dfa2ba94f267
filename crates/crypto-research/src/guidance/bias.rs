//! Action Bias Tiers and Decision Table

use std::fmt;

use serde::{Deserialize, Serialize};

use super::classify::{MomentumState, StructureState};

/// Weekly action bias, declared from most defensive to most constructive
/// so that `Ord` reflects aggressiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionBias {
    #[serde(rename = "Pause")]
    Pause,
    #[serde(rename = "Hold")]
    Hold,
    #[serde(rename = "Light Accumulate")]
    LightAccumulate,
    #[serde(rename = "Accumulate")]
    Accumulate,
}

impl ActionBias {
    /// Fixed percentage of the weekly allocation for this tier
    pub fn allocation_percent(self) -> u8 {
        match self {
            Self::Pause => 0,
            Self::Hold => 25,
            Self::LightAccumulate => 50,
            Self::Accumulate => 100,
        }
    }

    /// One step more defensive, saturating at `Pause`
    pub fn downgrade(self) -> Self {
        match self {
            Self::Accumulate => Self::LightAccumulate,
            Self::LightAccumulate => Self::Hold,
            Self::Hold | Self::Pause => Self::Pause,
        }
    }
}

impl fmt::Display for ActionBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pause => "Pause",
            Self::Hold => "Hold",
            Self::LightAccumulate => "Light Accumulate",
            Self::Accumulate => "Accumulate",
        };
        write!(f, "{label}")
    }
}

/// Base action bias from the classified signals.
///
/// Expressed as one exhaustive match over (structure, momentum, breach) so
/// every branch is visible and testable. Arm order matters: the low-momentum
/// rows trump the breach rows within a structure.
pub fn decide_bias(
    structure: StructureState,
    momentum: MomentumState,
    breached: bool,
) -> ActionBias {
    use MomentumState as M;
    use StructureState as S;

    match (structure, momentum, breached) {
        (S::Unknown, _, _) => ActionBias::Hold,
        (S::Bullish, M::Low, _) => ActionBias::LightAccumulate,
        (S::Bullish, _, false) => ActionBias::Accumulate,
        (S::Bullish, _, true) => ActionBias::LightAccumulate,
        (S::Warning, M::Low, _) => ActionBias::Hold,
        (S::Warning, _, _) => ActionBias::LightAccumulate,
        (S::RiskOff, _, true) => ActionBias::Pause,
        (S::RiskOff, _, false) => ActionBias::Hold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use MomentumState as M;
    use StructureState as S;

    #[test]
    fn test_unknown_structure_always_holds() {
        for momentum in [M::Positive, M::Neutral, M::Low, M::Unknown] {
            for breached in [false, true] {
                assert_eq!(decide_bias(S::Unknown, momentum, breached), ActionBias::Hold);
            }
        }
    }

    #[test]
    fn test_bullish_rows() {
        assert_eq!(decide_bias(S::Bullish, M::Neutral, false), ActionBias::Accumulate);
        assert_eq!(decide_bias(S::Bullish, M::Positive, false), ActionBias::Accumulate);
        assert_eq!(decide_bias(S::Bullish, M::Unknown, false), ActionBias::Accumulate);
        // Breach caps a bullish structure at light accumulation
        assert_eq!(
            decide_bias(S::Bullish, M::Positive, true),
            ActionBias::LightAccumulate
        );
        // Weak momentum caps it regardless of breach
        assert_eq!(
            decide_bias(S::Bullish, M::Low, false),
            ActionBias::LightAccumulate
        );
        assert_eq!(
            decide_bias(S::Bullish, M::Low, true),
            ActionBias::LightAccumulate
        );
    }

    #[test]
    fn test_warning_rows() {
        assert_eq!(decide_bias(S::Warning, M::Low, false), ActionBias::Hold);
        assert_eq!(decide_bias(S::Warning, M::Low, true), ActionBias::Hold);
        assert_eq!(
            decide_bias(S::Warning, M::Neutral, false),
            ActionBias::LightAccumulate
        );
        assert_eq!(
            decide_bias(S::Warning, M::Positive, true),
            ActionBias::LightAccumulate
        );
        // Unknown momentum in a warning structure still leans light
        assert_eq!(
            decide_bias(S::Warning, M::Unknown, false),
            ActionBias::LightAccumulate
        );
    }

    #[test]
    fn test_risk_off_rows() {
        for momentum in [M::Positive, M::Neutral, M::Low, M::Unknown] {
            assert_eq!(decide_bias(S::RiskOff, momentum, true), ActionBias::Pause);
            assert_eq!(decide_bias(S::RiskOff, momentum, false), ActionBias::Hold);
        }
    }

    #[test]
    fn test_downgrade_steps_and_floor() {
        assert_eq!(ActionBias::Accumulate.downgrade(), ActionBias::LightAccumulate);
        assert_eq!(ActionBias::LightAccumulate.downgrade(), ActionBias::Hold);
        assert_eq!(ActionBias::Hold.downgrade(), ActionBias::Pause);
        assert_eq!(ActionBias::Pause.downgrade(), ActionBias::Pause);
    }

    #[test]
    fn test_allocation_percent_mapping() {
        assert_eq!(ActionBias::Pause.allocation_percent(), 0);
        assert_eq!(ActionBias::Hold.allocation_percent(), 25);
        assert_eq!(ActionBias::LightAccumulate.allocation_percent(), 50);
        assert_eq!(ActionBias::Accumulate.allocation_percent(), 100);
    }

    #[test]
    fn test_tier_ordering_reflects_aggressiveness() {
        assert!(ActionBias::Pause < ActionBias::Hold);
        assert!(ActionBias::Hold < ActionBias::LightAccumulate);
        assert!(ActionBias::LightAccumulate < ActionBias::Accumulate);
    }

    #[test]
    fn test_display_and_wire_labels_match() {
        for bias in [
            ActionBias::Pause,
            ActionBias::Hold,
            ActionBias::LightAccumulate,
            ActionBias::Accumulate,
        ] {
            let wire = serde_json::to_string(&bias).unwrap();
            assert_eq!(wire, format!("\"{bias}\""));
        }
        assert_eq!(ActionBias::LightAccumulate.to_string(), "Light Accumulate");
    }
}
