//! AI Planner
//!
//! Each AI-controlled faction runs `Idle -> Evaluating -> (Attacking | Idle)`
//! once per decision interval. Intervals are jittered so factions do not act
//! in lockstep, and first decisions are staggered.

use std::collections::BTreeMap;
use std::time::Duration;

use conquest_events::{AttackId, FactionId, SimTime, TerritoryId};
use rand::rngs::SmallRng;
use rand::Rng;

use super::utility::{committed_points, deployable_points, score_target, AttackUtility};
use crate::components::faction::FactionRegistry;
use crate::components::territory::TerritoryRegistry;
use crate::config::{secs, AiConfig};
use crate::error::Result;
use crate::events::EventQueue;
use crate::systems::combat::CombatResolver;

/// Where a faction's controller is in its decision cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiPhase {
    #[default]
    Idle,
    Evaluating,
    /// Launched an attack on its last decision
    Attacking,
}

/// The best feasible attack found for a faction
#[derive(Debug, Clone, PartialEq)]
pub struct AttackOpportunity {
    pub source: TerritoryId,
    pub target: TerritoryId,
    /// Points the AI would commit
    pub points: u32,
    pub utility: AttackUtility,
}

impl AttackOpportunity {
    pub fn score(&self) -> f32 {
        self.utility.total()
    }
}

/// Result of one decision cycle
#[derive(Debug, Clone, PartialEq)]
pub enum AiDecision {
    /// Faction is eliminated
    Inactive,
    /// No source could mount a valid attack
    NoOpportunity,
    /// Best opportunity scored at or below the configured threshold
    BelowThreshold { score: f32 },
    /// Aggressiveness draw declined to commit
    Held { opportunity: AttackOpportunity },
    Attacked {
        attack_id: AttackId,
        opportunity: AttackOpportunity,
    },
}

impl AiDecision {
    pub fn attack_id(&self) -> Option<AttackId> {
        match self {
            AiDecision::Attacked { attack_id, .. } => Some(*attack_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct AiController {
    phase: AiPhase,
    next_decision_at: SimTime,
}

/// Decision timers and heuristics for every AI-controlled faction
#[derive(Debug, Clone)]
pub struct AiPlanner {
    config: AiConfig,
    controllers: BTreeMap<FactionId, AiController>,
}

impl AiPlanner {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            controllers: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Take control of a faction; its first decision is staggered uniformly
    /// in `[initial_delay_min, interval)` from `now`.
    pub fn register(&mut self, faction_id: &FactionId, now: SimTime, rng: &mut SmallRng) {
        let interval = self.config.decision_interval_secs;
        let min = self.config.initial_delay_min_secs.min(interval);
        let delay = if min < interval {
            rng.gen_range(min..interval)
        } else {
            interval
        };
        tracing::debug!(faction = %faction_id, delay_secs = delay, "ai controller registered");
        self.controllers.insert(
            faction_id.clone(),
            AiController {
                phase: AiPhase::Idle,
                next_decision_at: now + secs(delay),
            },
        );
    }

    /// Stop driving a faction, e.g. once it is eliminated
    pub fn retire(&mut self, faction_id: &str) {
        self.controllers.remove(faction_id);
    }

    pub fn controls(&self, faction_id: &str) -> bool {
        self.controllers.contains_key(faction_id)
    }

    pub fn controlled_factions(&self) -> impl Iterator<Item = &FactionId> {
        self.controllers.keys()
    }

    pub fn phase(&self, faction_id: &str) -> Option<AiPhase> {
        self.controllers.get(faction_id).map(|c| c.phase)
    }

    pub fn next_decision_at(&self, faction_id: &str) -> Option<SimTime> {
        self.controllers.get(faction_id).map(|c| c.next_decision_at)
    }

    /// Earliest decision due at or before `until`. Ties go to the faction
    /// with the smaller id.
    pub fn next_due(&self, until: SimTime) -> Option<(SimTime, FactionId)> {
        self.controllers
            .iter()
            .filter(|(_, c)| c.next_decision_at <= until)
            .min_by_key(|(id, c)| (c.next_decision_at, *id))
            .map(|(id, c)| (c.next_decision_at, id.clone()))
    }

    /// Schedule the next decision `interval +/- jitter` after `now`.
    pub fn reschedule(&mut self, faction_id: &str, now: SimTime, rng: &mut SmallRng) {
        let jitter = self.config.decision_jitter_secs;
        let offset = if jitter > 0.0 {
            rng.gen_range(-jitter..=jitter)
        } else {
            0.0
        };
        let wait = secs(self.config.decision_interval_secs + offset).max(Duration::from_millis(1));
        if let Some(controller) = self.controllers.get_mut(faction_id) {
            controller.next_decision_at = now + wait;
        }
    }

    /// Scan every owned territory with points above its reserve and return
    /// the highest-scoring attack that would pass validation.
    pub fn find_best_attack(
        &self,
        faction_id: &str,
        territories: &TerritoryRegistry,
        combat: &CombatResolver,
        rng: &mut SmallRng,
    ) -> Option<AttackOpportunity> {
        let weights = &self.config.weights;
        let mut best: Option<AttackOpportunity> = None;

        for source in territories.owned_by(faction_id) {
            let deployable = deployable_points(source, self.config.reserve_ratio);
            if deployable < combat.min_attack_points() {
                continue;
            }

            for neighbor_id in source.neighbors() {
                let Some(target) = territories.find(neighbor_id.as_str()) else {
                    continue;
                };
                if target.is_owned_by(faction_id) {
                    continue;
                }
                let points = committed_points(
                    deployable,
                    target.current_points(),
                    self.config.attack_overflow,
                );
                if !combat.validate(territories, source.id.as_str(), neighbor_id.as_str(), points) {
                    continue;
                }

                let noise = if weights.noise > 0.0 {
                    rng.gen_range(-weights.noise..weights.noise)
                } else {
                    0.0
                };
                let utility = score_target(deployable, target, weights, noise);
                if best.as_ref().map_or(true, |b| utility.total() > b.score()) {
                    best = Some(AttackOpportunity {
                        source: source.id.clone(),
                        target: neighbor_id.clone(),
                        points,
                        utility,
                    });
                }
            }
        }

        best
    }

    /// Run one decision cycle for `faction_id`.
    ///
    /// Works for any active faction, controlled or not; phase tracking only
    /// applies to registered controllers. Attacks go through the combat
    /// resolver like any other intent.
    #[allow(clippy::too_many_arguments)]
    pub fn decide(
        &mut self,
        faction_id: &str,
        territories: &mut TerritoryRegistry,
        factions: &FactionRegistry,
        combat: &mut CombatResolver,
        now: SimTime,
        rng: &mut SmallRng,
        events: &mut EventQueue,
    ) -> Result<AiDecision> {
        if factions.get(faction_id)?.is_eliminated() {
            return Ok(AiDecision::Inactive);
        }
        self.set_phase(faction_id, AiPhase::Evaluating);

        let Some(opportunity) = self.find_best_attack(faction_id, territories, combat, rng) else {
            self.set_phase(faction_id, AiPhase::Idle);
            return Ok(AiDecision::NoOpportunity);
        };

        let score = opportunity.score();
        if self.config.min_score.map_or(false, |min| score <= min) {
            self.set_phase(faction_id, AiPhase::Idle);
            return Ok(AiDecision::BelowThreshold { score });
        }

        if rng.gen::<f32>() >= self.config.aggressiveness {
            tracing::debug!(faction = faction_id, score, "ai held back");
            self.set_phase(faction_id, AiPhase::Idle);
            return Ok(AiDecision::Held { opportunity });
        }

        let attack_id = match combat.execute(
            territories,
            opportunity.source.as_str(),
            opportunity.target.as_str(),
            opportunity.points,
            now,
            events,
        ) {
            Ok(id) => id,
            Err(e) => {
                self.set_phase(faction_id, AiPhase::Idle);
                return Err(e);
            }
        };

        tracing::debug!(
            faction = faction_id,
            source = %opportunity.source,
            target = %opportunity.target,
            points = opportunity.points,
            score,
            "ai attack"
        );
        self.set_phase(faction_id, AiPhase::Attacking);
        Ok(AiDecision::Attacked {
            attack_id,
            opportunity,
        })
    }

    fn set_phase(&mut self, faction_id: &str, phase: AiPhase) {
        if let Some(controller) = self.controllers.get_mut(faction_id) {
            controller.phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::faction::Faction;
    use crate::components::territory::Territory;
    use crate::config::CombatConfig;
    use rand::SeedableRng;

    fn setup() -> (TerritoryRegistry, FactionRegistry) {
        let mut territories = TerritoryRegistry::new();
        territories.register(Territory::new("home", "Home", "", 100).with_points(80).with_owner("ai"));
        territories.register(Territory::new("weak", "Weak", "", 100).with_points(5));
        territories.register(Territory::new("strong", "Strong", "", 100).with_points(60).with_owner("enemy"));
        territories.register(Territory::new("far", "Far", "", 100).with_points(0));
        territories.connect("home", "weak");
        territories.connect("home", "strong");

        let mut factions = FactionRegistry::new();
        factions.register(Faction::new("ai", "AI", "#ff4a4a"));
        factions.register(Faction::new("enemy", "Enemy", "#4a9eff"));
        (territories, factions)
    }

    fn planner(aggressiveness: f32) -> AiPlanner {
        AiPlanner::new(AiConfig {
            aggressiveness,
            weights: crate::config::ScoreWeights {
                noise: 0.0,
                ..Default::default()
            },
            ..AiConfig::default()
        })
    }

    #[test]
    fn test_best_attack_prefers_weak_neutral() {
        let (territories, _) = setup();
        let combat = CombatResolver::new(&CombatConfig::default());
        let mut rng = SmallRng::seed_from_u64(7);

        let best = planner(1.0)
            .find_best_attack("ai", &territories, &combat, &mut rng)
            .unwrap();
        assert_eq!(best.target.as_str(), "weak");
        // deployable 50, target 5 + overflow 10
        assert_eq!(best.points, 15);
    }

    #[test]
    fn test_reserve_blocks_poor_sources() {
        let (mut territories, _) = setup();
        let mut events = EventQueue::new();
        territories.set_points("home", 33, &mut events).unwrap();
        let combat = CombatResolver::new(&CombatConfig::default());
        let mut rng = SmallRng::seed_from_u64(7);

        // 33 - 30 reserve = 3 deployable, below the minimum attack
        assert!(planner(1.0)
            .find_best_attack("ai", &territories, &combat, &mut rng)
            .is_none());
    }

    #[test]
    fn test_decide_attacks_through_combat() {
        let (mut territories, factions) = setup();
        let mut combat = CombatResolver::new(&CombatConfig::default());
        let mut rng = SmallRng::seed_from_u64(7);
        let mut events = EventQueue::new();
        let mut planner = planner(1.0);
        planner.register(&FactionId::from("ai"), SimTime::ZERO, &mut rng);

        let decision = planner
            .decide("ai", &mut territories, &factions, &mut combat, SimTime::ZERO, &mut rng, &mut events)
            .unwrap();
        assert!(decision.attack_id().is_some());
        assert_eq!(planner.phase("ai"), Some(AiPhase::Attacking));
        assert_eq!(territories.get("home").unwrap().current_points(), 65);
        assert_eq!(combat.in_flight_count(), 1);
    }

    #[test]
    fn test_zero_aggressiveness_never_attacks() {
        let (mut territories, factions) = setup();
        let mut combat = CombatResolver::new(&CombatConfig::default());
        let mut rng = SmallRng::seed_from_u64(7);
        let mut events = EventQueue::new();
        let mut planner = planner(0.0);

        for _ in 0..20 {
            let decision = planner
                .decide("ai", &mut territories, &factions, &mut combat, SimTime::ZERO, &mut rng, &mut events)
                .unwrap();
            assert!(matches!(decision, AiDecision::Held { .. }));
        }
        assert_eq!(combat.in_flight_count(), 0);
    }

    #[test]
    fn test_score_threshold() {
        let (mut territories, factions) = setup();
        let mut combat = CombatResolver::new(&CombatConfig::default());
        let mut rng = SmallRng::seed_from_u64(7);
        let mut events = EventQueue::new();
        let mut planner = AiPlanner::new(AiConfig {
            min_score: Some(10_000.0),
            ..AiConfig::default()
        });

        let decision = planner
            .decide("ai", &mut territories, &factions, &mut combat, SimTime::ZERO, &mut rng, &mut events)
            .unwrap();
        assert!(matches!(decision, AiDecision::BelowThreshold { .. }));
    }

    #[test]
    fn test_decision_schedule_is_staggered_and_jittered() {
        let mut rng = SmallRng::seed_from_u64(99);
        let mut planner = AiPlanner::new(AiConfig::default());
        planner.register(&FactionId::from("a"), SimTime::ZERO, &mut rng);
        planner.register(&FactionId::from("b"), SimTime::ZERO, &mut rng);

        for id in ["a", "b"] {
            let first = planner.next_decision_at(id).unwrap().as_secs_f64();
            assert!((1.0..3.0).contains(&first), "{id}: {first}");
        }

        let now = SimTime::from_secs_f64(10.0);
        planner.reschedule("a", now, &mut rng);
        let next = planner.next_decision_at("a").unwrap().as_secs_f64();
        assert!((12.5..=13.5).contains(&next), "{next}");

        assert!(planner.next_due(SimTime::ZERO).is_none());
        let (_, due) = planner.next_due(SimTime::from_secs_f64(20.0)).unwrap();
        assert_eq!(due.as_str(), "b");
    }

    #[test]
    fn test_eliminated_faction_is_inactive() {
        let (mut territories, mut factions) = setup();
        factions.get_mut("ai").unwrap().eliminate();
        let mut combat = CombatResolver::new(&CombatConfig::default());
        let mut rng = SmallRng::seed_from_u64(7);
        let mut events = EventQueue::new();

        let decision = planner(1.0)
            .decide("ai", &mut territories, &factions, &mut combat, SimTime::ZERO, &mut rng, &mut events)
            .unwrap();
        assert_eq!(decision, AiDecision::Inactive);
    }
}
