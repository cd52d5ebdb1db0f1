//! Attack Value Types
//!
//! Transient values describing an attack: the intent a player or AI
//! issues, why an intent was refused, what a resolution produced, and the
//! side-effect-free prediction of that resolution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{FactionId, TerritoryId};

/// A request to send points from one territory against another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackIntent {
    pub source: TerritoryId,
    pub target: TerritoryId,
    pub points: u32,
}

impl AttackIntent {
    pub fn new(source: impl Into<TerritoryId>, target: impl Into<TerritoryId>, points: u32) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            points,
        }
    }
}

/// Why an attack intent failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AttackRejection {
    #[error("a territory cannot attack itself")]
    SelfAttack,
    #[error("neutral territories cannot attack")]
    NeutralSource,
    #[error("target is already owned by the attacking faction")]
    FriendlyTarget,
    #[error("target is not adjacent to the source")]
    NotAdjacent,
    #[error("{points} points is below the minimum attack of {minimum}")]
    BelowMinimum { points: u32, minimum: u32 },
    #[error("{points} points requested but only {available} available")]
    InsufficientPoints { points: u32, available: u32 },
}

/// Why a reinforcement request failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ReinforceRejection {
    #[error("a territory cannot reinforce itself")]
    SameTerritory,
    #[error("neutral territories cannot send reinforcements")]
    NeutralSource,
    #[error("target is not owned by the reinforcing faction")]
    NotFriendly,
    #[error("target is not adjacent to the source")]
    NotAdjacent,
    #[error("reinforcement must move at least one point")]
    ZeroPoints,
    #[error("{points} points requested but only {available} available")]
    InsufficientPoints { points: u32, available: u32 },
}

/// Why an in-flight attack was dropped without touching its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The target territory no longer exists
    TargetMissing,
    /// The attacking faction was eliminated while the attack travelled
    AttackerEliminated,
}

/// How a resolved attack ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackOutcome {
    /// Defender had more points and keeps the territory
    DefenderHeld,
    /// Both sides cancelled exactly; defender keeps the territory at zero
    MutualDepletion,
    /// Attacker took the territory
    Conquered,
    /// Target already belonged to the attacker on arrival; points merged
    Reinforced,
}

/// Result of resolving one attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackResult {
    pub outcome: AttackOutcome,
    /// True when ownership of the target changed
    pub conquered: bool,
    /// Target points after resolution
    pub remaining_points: u32,
    /// Points committed by the attacker
    pub attacker_points: u32,
    /// Target points at the moment of resolution
    pub defender_points: u32,
    /// Owner of the target before resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_owner: Option<FactionId>,
}

/// Predicted result of an attack, computed without mutating state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackPrediction {
    /// Whether the attack would pass validation right now
    pub can_attack: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<AttackRejection>,
    pub will_conquer: bool,
    pub attacker_points_remaining: u32,
    pub defender_points_remaining: u32,
    /// Target points after resolution, as `AttackResult::remaining_points` would report
    pub resulting_points: u32,
    /// Target owner after resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resulting_owner: Option<FactionId>,
}

impl AttackPrediction {
    /// Prediction for an attack that fails validation.
    pub fn rejected(rejection: AttackRejection) -> Self {
        Self {
            can_attack: false,
            rejection: Some(rejection),
            will_conquer: false,
            attacker_points_remaining: 0,
            defender_points_remaining: 0,
            resulting_points: 0,
            resulting_owner: None,
        }
    }

    /// True when this prediction describes `result` exactly.
    pub fn agrees_with(&self, result: &AttackResult) -> bool {
        self.can_attack
            && self.will_conquer == result.conquered
            && self.resulting_points == result.remaining_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_display() {
        let r = AttackRejection::BelowMinimum { points: 4, minimum: 5 };
        assert_eq!(r.to_string(), "4 points is below the minimum attack of 5");
    }

    #[test]
    fn test_rejection_serializes_with_reason_tag() {
        let json = serde_json::to_string(&AttackRejection::NotAdjacent).unwrap();
        assert_eq!(json, r#"{"reason":"not_adjacent"}"#);
        let json = serde_json::to_string(&AttackRejection::InsufficientPoints {
            points: 30,
            available: 12,
        })
        .unwrap();
        assert!(json.contains(r#""reason":"insufficient_points""#));
        assert!(json.contains(r#""available":12"#));
    }

    #[test]
    fn test_prediction_agreement() {
        let result = AttackResult {
            outcome: AttackOutcome::Conquered,
            conquered: true,
            remaining_points: 10,
            attacker_points: 10,
            defender_points: 0,
            previous_owner: None,
        };
        let prediction = AttackPrediction {
            can_attack: true,
            rejection: None,
            will_conquer: true,
            attacker_points_remaining: 10,
            defender_points_remaining: 0,
            resulting_points: 10,
            resulting_owner: Some(FactionId::from("faction_0")),
        };
        assert!(prediction.agrees_with(&result));
        assert!(!AttackPrediction::rejected(AttackRejection::SelfAttack).agrees_with(&result));
    }
}
