//! Attack Utility
//!
//! Scores a (source, target) pair from the attacking faction's point of view:
//! - Strength ratio (deployable points over target points, favors easy wins)
//! - Conquest bonus (deployable points strictly exceed the target)
//! - Neutral bonus (unowned targets over enemy ones)
//! - Capacity value (targets with a high point cap are worth more)
//! - Noise (a small perturbation so the AI is not exploitable)

use crate::components::territory::Territory;
use crate::config::ScoreWeights;

/// Score breakdown for one candidate attack
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttackUtility {
    pub strength_ratio: f32,
    pub conquest_bonus: f32,
    pub neutral_bonus: f32,
    pub capacity_value: f32,
    pub noise: f32,
}

impl AttackUtility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of every component
    pub fn total(&self) -> f32 {
        self.strength_ratio + self.conquest_bonus + self.neutral_bonus + self.capacity_value + self.noise
    }

    pub fn with_strength_ratio(mut self, value: f32) -> Self {
        self.strength_ratio = value;
        self
    }

    pub fn with_conquest_bonus(mut self, value: f32) -> Self {
        self.conquest_bonus = value;
        self
    }

    pub fn with_neutral_bonus(mut self, value: f32) -> Self {
        self.neutral_bonus = value;
        self
    }

    pub fn with_capacity_value(mut self, value: f32) -> Self {
        self.capacity_value = value;
        self
    }

    pub fn with_noise(mut self, value: f32) -> Self {
        self.noise = value;
        self
    }
}

/// Slack for the f32 ratio, so 100 * 0.3 reserves 30 rather than 31
const RESERVE_EPSILON: f64 = 1e-4;

/// Points held back for defense: `ceil(max_points * reserve_ratio)`
pub fn reserve_points(max_points: u32, reserve_ratio: f32) -> u32 {
    let raw = f64::from(max_points) * f64::from(reserve_ratio);
    (raw - RESERVE_EPSILON).ceil().max(0.0) as u32
}

/// Points a territory can send without dipping into its reserve
pub fn deployable_points(territory: &Territory, reserve_ratio: f32) -> u32 {
    territory
        .current_points()
        .saturating_sub(reserve_points(territory.max_points(), reserve_ratio))
}

/// Enough to beat the target plus a margin, never more than deployable.
pub fn committed_points(deployable: u32, target_points: u32, overflow: u32) -> u32 {
    deployable.min(target_points.saturating_add(overflow))
}

/// Score attacking `target` with `deployable` points. `noise` is the
/// already-drawn perturbation.
pub fn score_target(
    deployable: u32,
    target: &Territory,
    weights: &ScoreWeights,
    noise: f32,
) -> AttackUtility {
    let defense = target.current_points();
    let ratio = deployable as f32 / defense.max(1) as f32;

    let mut utility = AttackUtility::new()
        .with_strength_ratio(ratio * weights.ratio)
        .with_capacity_value(target.max_points() as f32 * weights.capacity)
        .with_noise(noise);
    if deployable > defense {
        utility = utility.with_conquest_bonus(weights.conquerable);
    }
    if target.is_neutral() {
        utility = utility.with_neutral_bonus(weights.neutral);
    }
    utility
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utility_total() {
        let utility = AttackUtility::new()
            .with_strength_ratio(25.0)
            .with_conquest_bonus(100.0)
            .with_capacity_value(20.0)
            .with_noise(-5.0);
        assert!((utility.total() - 140.0).abs() < 0.001);
    }

    #[test]
    fn test_reserve_rounds_up() {
        assert_eq!(reserve_points(100, 0.3), 30);
        assert_eq!(reserve_points(50, 0.25), 13);
        assert_eq!(reserve_points(100, 0.0), 0);
    }

    #[test]
    fn test_deployable_points() {
        let rich = Territory::new("a", "A", "", 100).with_points(45);
        let poor = Territory::new("b", "B", "", 100).with_points(20);
        assert_eq!(deployable_points(&rich, 0.3), 15);
        assert_eq!(deployable_points(&poor, 0.3), 0);
    }

    #[test]
    fn test_committed_points_caps_at_target_plus_margin() {
        assert_eq!(committed_points(60, 12, 10), 22);
        assert_eq!(committed_points(15, 12, 10), 15);
    }

    #[test]
    fn test_score_prefers_weak_neutral_targets() {
        let weights = ScoreWeights::default();
        let neutral = Territory::new("n", "N", "", 100).with_points(5);
        let enemy = Territory::new("e", "E", "", 100).with_points(5).with_owner("f2");
        let strong = Territory::new("s", "S", "", 100).with_points(40).with_owner("f2");

        let n = score_target(20, &neutral, &weights, 0.0);
        let e = score_target(20, &enemy, &weights, 0.0);
        let s = score_target(20, &strong, &weights, 0.0);

        // 4 * 50 + 100 + 30 + 20
        assert!((n.total() - 350.0).abs() < 0.001);
        assert!(n.total() > e.total());
        assert!(e.total() > s.total());
        assert_eq!(s.conquest_bonus, 0.0);
    }

    #[test]
    fn test_empty_target_ratio_uses_one() {
        let weights = ScoreWeights::default();
        let empty = Territory::new("n", "N", "", 10);
        let utility = score_target(8, &empty, &weights, 0.0);
        assert!((utility.strength_ratio - 400.0).abs() < 0.001);
    }
}
