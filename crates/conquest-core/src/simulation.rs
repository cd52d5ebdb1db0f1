//! Simulation Driver
//!
//! Owns the registries and systems and serializes every mutation: player
//! commands, AI decisions, attack resolutions and growth. Events pushed
//! during a step are held in the queue until the caller drains them.

use std::time::Duration;

use conquest_events::{
    AttackId, AttackPrediction, Event, EventKind, FactionId, SimTime, WorldSnapshot,
};

use crate::components::faction::{Faction, FactionRegistry, MAX_FACTIONS, MIN_FACTIONS};
use crate::components::territory::{Territory, TerritoryRegistry};
use crate::config::{ConfigError, SimConfig};
use crate::error::{CoreError, Result};
use crate::events::EventQueue;
use crate::setup::{
    assign_initial_territories, build_registries, default_world_map, faction_definitions,
    randomize_map, MapDefinition,
};
use crate::systems::ai::{AiDecision, AiPhase, AiPlanner};
use crate::systems::combat::{CombatResolver, InFlightAttack, Resolution};
use crate::systems::elimination::{check_all_eliminations, check_elimination, check_victory};
use crate::systems::growth::apply_growth;
use crate::SimRng;

/// What happened during one call to [`Simulation::tick`]
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub started_at: SimTime,
    pub ended_at: SimTime,
    pub points_grown: u64,
    /// Attack resolutions in the order they were applied
    pub resolutions: Vec<Resolution>,
    pub ai_decisions: Vec<(FactionId, AiDecision)>,
    pub eliminated: Vec<FactionId>,
    /// Set when victory was declared during this tick
    pub winner: Option<FactionId>,
}

enum Due {
    Attack(SimTime),
    Decision(SimTime, FactionId),
}

/// The authoritative game state and its single mutation path.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    now: SimTime,
    territories: TerritoryRegistry,
    factions: FactionRegistry,
    combat: CombatResolver,
    planner: AiPlanner,
    rng: SimRng,
    events: EventQueue,
    winner: Option<FactionId>,
    paused: bool,
}

impl Simulation {
    /// Build a simulation from prepared registries.
    ///
    /// Factions that start without territory are eliminated immediately.
    pub fn new(
        config: SimConfig,
        territories: TerritoryRegistry,
        factions: FactionRegistry,
        seed: u64,
    ) -> std::result::Result<Self, ConfigError> {
        Self::with_rng(config, territories, factions, SimRng::seeded(seed))
    }

    /// Load a map definition and build a simulation from it.
    pub fn from_map(
        config: SimConfig,
        map: &MapDefinition,
        seed: u64,
    ) -> std::result::Result<Self, ConfigError> {
        let (territories, factions) = build_registries(map)?;
        Self::new(config, territories, factions, seed)
    }

    /// The default world map with `faction_count` standard factions,
    /// randomized starting points and growth rates, and territories dealt
    /// out evenly.
    pub fn standard_game(
        config: SimConfig,
        faction_count: usize,
        seed: u64,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = SimRng::seeded(seed);
        let mut map = default_world_map();
        map.factions = faction_definitions(faction_count)?;
        randomize_map(&mut map, &mut rng.0, &config.setup);
        assign_initial_territories(&mut map, &mut rng.0)?;
        let (territories, factions) = build_registries(&map)?;
        Self::with_rng(config, territories, factions, rng)
    }

    fn with_rng(
        config: SimConfig,
        territories: TerritoryRegistry,
        mut factions: FactionRegistry,
        mut rng: SimRng,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let count = factions.len();
        if !(MIN_FACTIONS..=MAX_FACTIONS).contains(&count) {
            return Err(ConfigError::FactionCount { count });
        }
        for territory in territories.all_territories() {
            if let Some(owner) = territory.owner() {
                if factions.find(owner.as_str()).is_none() {
                    return Err(ConfigError::UnknownOwner {
                        territory: territory.id.to_string(),
                        owner: owner.to_string(),
                    });
                }
            }
        }

        let mut events = EventQueue::new();
        let mut planner = AiPlanner::new(config.ai.clone());
        if config.ai.enabled {
            for faction in factions.all_factions() {
                if !faction.is_player || config.ai.control_player {
                    planner.register(&faction.id, SimTime::ZERO, &mut rng.0);
                }
            }
        }

        // Every id checked here comes from the registry itself.
        let eliminated = check_all_eliminations(&territories, &mut factions, &mut events)
            .unwrap_or_default();
        for id in &eliminated {
            planner.retire(id.as_str());
        }

        let mut simulation = Self {
            combat: CombatResolver::new(&config.combat),
            config,
            now: SimTime::ZERO,
            territories,
            factions,
            planner,
            rng,
            events,
            winner: None,
            paused: false,
        };
        simulation.declare_victory_if_won();

        tracing::info!(
            territories = simulation.territories.len(),
            factions = simulation.factions.len(),
            ai_factions = simulation.planner.controlled_factions().count(),
            "simulation ready"
        );
        Ok(simulation)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn territories(&self) -> &TerritoryRegistry {
        &self.territories
    }

    pub fn factions(&self) -> &FactionRegistry {
        &self.factions
    }

    pub fn territory(&self, territory_id: &str) -> Result<&Territory> {
        self.territories.get(territory_id)
    }

    pub fn faction(&self, faction_id: &str) -> Result<&Faction> {
        self.factions.get(faction_id)
    }

    pub fn neighbors_of(&self, territory_id: &str) -> Result<Vec<&Territory>> {
        self.territories.neighbors_of(territory_id)
    }

    pub fn are_adjacent(&self, a: &str, b: &str) -> bool {
        self.territories.are_adjacent(a, b)
    }

    /// Would this attack be accepted right now
    pub fn can_attack(&self, source: &str, target: &str, points: u32) -> bool {
        self.combat.validate(&self.territories, source, target, points)
    }

    /// Like [`Simulation::can_attack`] but with the rejection reason
    pub fn check_attack(&self, source: &str, target: &str, points: u32) -> Result<()> {
        self.combat.check(&self.territories, source, target, points)
    }

    /// Outcome of the attack if the target is unchanged when it lands.
    pub fn predict_attack(&self, source: &str, target: &str, points: u32) -> Result<AttackPrediction> {
        self.combat.predict(&self.territories, source, target, points)
    }

    /// Neighbors of `source` that it could attack with the minimum force
    pub fn attackable_targets(&self, source: &str) -> Result<Vec<&Territory>> {
        let minimum = self.combat.min_attack_points();
        Ok(self
            .territories
            .neighbors_of(source)?
            .into_iter()
            .filter(|t| self.combat.validate(&self.territories, source, t.id.as_str(), minimum))
            .collect())
    }

    pub fn in_flight_attacks(&self) -> impl Iterator<Item = &InFlightAttack> {
        self.combat.in_flight()
    }

    pub fn ai_phase(&self, faction_id: &str) -> Option<AiPhase> {
        self.planner.phase(faction_id)
    }

    pub fn next_ai_decision_at(&self, faction_id: &str) -> Option<SimTime> {
        self.planner.next_decision_at(faction_id)
    }

    pub fn winner(&self) -> Option<&Faction> {
        self.winner
            .as_ref()
            .and_then(|id| self.factions.find(id.as_str()))
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            time: self.now,
            territories: self.territories.snapshot(),
            factions: self.factions.snapshot(|id| {
                (
                    self.territories.count_owned_by(id),
                    self.territories.points_owned_by(id),
                )
            }),
            in_flight_attacks: self.combat.in_flight_count(),
            winner: self.winner.clone(),
            paused: self.paused,
        }
    }

    /// Events not yet drained
    pub fn pending_events(&self) -> &[Event] {
        self.events.pending()
    }

    /// Take every event emitted since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    fn ensure_running(&self) -> Result<()> {
        if self.winner.is_some() {
            Err(CoreError::SimulationOver)
        } else if self.paused {
            Err(CoreError::Paused)
        } else {
            Ok(())
        }
    }

    /// Commit an attack. Points leave the source now; the attack lands
    /// one travel delay later.
    pub fn issue_attack(&mut self, source: &str, target: &str, points: u32) -> Result<AttackId> {
        self.ensure_running()?;
        self.combat.execute(
            &mut self.territories,
            source,
            target,
            points,
            self.now,
            &mut self.events,
        )
    }

    /// Move points between adjacent friendly territories. Returns the
    /// points delivered after clamping at the target's capacity.
    pub fn reinforce(&mut self, source: &str, target: &str, points: u32) -> Result<u32> {
        self.ensure_running()?;
        self.combat
            .reinforce(&mut self.territories, source, target, points, &mut self.events)
    }

    /// Run one AI evaluation cycle for `faction_id` right now, outside its
    /// regular schedule.
    pub fn run_ai_decision(&mut self, faction_id: &str) -> Result<AiDecision> {
        self.ensure_running()?;
        self.planner.decide(
            faction_id,
            &mut self.territories,
            &self.factions,
            &mut self.combat,
            self.now,
            &mut self.rng.0,
            &mut self.events,
        )
    }

    pub fn pause(&mut self) {
        if !self.paused {
            tracing::info!(time = %self.now, "simulation paused");
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            tracing::info!(time = %self.now, "simulation resumed");
            self.paused = false;
        }
    }

    /// Advance the clock by `elapsed`.
    ///
    /// Attack resolutions and AI decisions due inside the window run in
    /// chronological order (an attack goes first when both fall on the same
    /// instant), with growth applied over each sub-interval. A no-op while
    /// paused or once the game is over.
    pub fn tick(&mut self, elapsed: Duration) -> TickReport {
        let mut report = TickReport {
            started_at: self.now,
            ended_at: self.now,
            ..TickReport::default()
        };
        if self.paused || self.winner.is_some() {
            return report;
        }
        let end = self.now + elapsed;

        while self.winner.is_none() {
            let Some(due) = self.next_due(end) else {
                break;
            };
            match due {
                Due::Attack(at) => {
                    report.points_grown += self.advance_to(at);
                    if let Some(resolution) = self.combat.resolve_next_due(
                        at,
                        &mut self.territories,
                        &self.factions,
                        &mut self.events,
                    ) {
                        self.after_resolution(&resolution, &mut report);
                        report.resolutions.push(resolution);
                    }
                }
                Due::Decision(at, faction_id) => {
                    report.points_grown += self.advance_to(at);
                    let decision = self.planner.decide(
                        faction_id.as_str(),
                        &mut self.territories,
                        &self.factions,
                        &mut self.combat,
                        at,
                        &mut self.rng.0,
                        &mut self.events,
                    );
                    self.planner.reschedule(faction_id.as_str(), at, &mut self.rng.0);
                    match decision {
                        Ok(decision) => report.ai_decisions.push((faction_id, decision)),
                        Err(e) => tracing::warn!(faction = %faction_id, "ai decision failed: {}", e),
                    }
                }
            }
        }

        if self.winner.is_none() {
            report.points_grown += self.advance_to(end);
        }
        report.ended_at = self.now;
        report
    }

    fn next_due(&self, end: SimTime) -> Option<Due> {
        let attack = self.combat.next_resolution_at().filter(|at| *at <= end);
        let decision = self.planner.next_due(end);
        match (attack, decision) {
            (Some(a), Some((d, _))) if a <= d => Some(Due::Attack(a)),
            (_, Some((d, faction))) => Some(Due::Decision(d, faction)),
            (Some(a), None) => Some(Due::Attack(a)),
            (None, None) => None,
        }
    }

    /// Move the clock forward to `at`, growing territories on the way.
    fn advance_to(&mut self, at: SimTime) -> u64 {
        if at <= self.now {
            return 0;
        }
        let elapsed = at - self.now;
        self.now = at;
        self.events.set_time(at);
        apply_growth(
            &mut self.territories,
            elapsed,
            self.config.growth.fractional,
            &mut self.events,
        )
    }

    fn after_resolution(&mut self, resolution: &Resolution, report: &mut TickReport) {
        let Some(previous_owner) = resolution.conquered_from() else {
            return;
        };
        match check_elimination(
            &self.territories,
            &mut self.factions,
            previous_owner.as_str(),
            &mut self.events,
        ) {
            Ok(true) => {
                self.planner.retire(previous_owner.as_str());
                report.eliminated.push(previous_owner.clone());
            }
            Ok(false) => {}
            Err(e) => tracing::warn!(faction = %previous_owner, "elimination check failed: {}", e),
        }
        if let Some(winner) = self.declare_victory_if_won() {
            report.winner = Some(winner);
        }
    }

    /// Declare victory once, when exactly one faction remains.
    fn declare_victory_if_won(&mut self) -> Option<FactionId> {
        if self.winner.is_some() {
            return None;
        }
        let winner = check_victory(&self.factions)?.id.clone();
        tracing::info!(faction = %winner, time = %self.now, "victory");
        self.events.push(EventKind::Victory {
            faction: winner.clone(),
        });
        self.winner = Some(winner.clone());
        Some(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duel(config: SimConfig) -> Simulation {
        let mut territories = TerritoryRegistry::new();
        territories.register(Territory::new("a", "A", "", 100).with_points(40).with_owner("f1"));
        territories.register(Territory::new("b", "B", "", 100).with_points(10).with_owner("f2"));
        territories.register(Territory::new("n", "N", "", 100).with_points(0));
        territories.connect("a", "b");
        territories.connect("a", "n");

        let mut factions = FactionRegistry::new();
        factions.register(Faction::new("f1", "One", "#111111").player());
        factions.register(Faction::new("f2", "Two", "#222222"));
        Simulation::new(config, territories, factions, 42).unwrap()
    }

    fn quiet() -> SimConfig {
        let mut config = SimConfig::default();
        config.ai.enabled = false;
        config
    }

    #[test]
    fn test_conquest_of_last_territory_wins() {
        let mut sim = duel(quiet());
        sim.issue_attack("a", "b", 20).unwrap();
        let report = sim.tick(Duration::from_secs(2));

        assert_eq!(report.resolutions.len(), 1);
        assert_eq!(report.eliminated, vec![FactionId::from("f2")]);
        assert_eq!(report.winner.as_ref().map(|f| f.as_str()), Some("f1"));
        assert!(sim.is_over());
        assert_eq!(sim.winner().map(|f| f.id.as_str()), Some("f1"));

        let victories = sim
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e.kind, EventKind::Victory { .. }))
            .count();
        assert_eq!(victories, 1);
    }

    #[test]
    fn test_commands_after_victory_are_refused() {
        let mut sim = duel(quiet());
        sim.issue_attack("a", "b", 20).unwrap();
        sim.tick(Duration::from_secs(2));

        let before = sim.now();
        assert_eq!(sim.issue_attack("a", "n", 5).unwrap_err(), CoreError::SimulationOver);
        let report = sim.tick(Duration::from_secs(10));
        assert!(report.resolutions.is_empty());
        assert_eq!(sim.now(), before);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut sim = duel(quiet());
        sim.pause();
        assert!(sim.is_paused());
        assert_eq!(sim.issue_attack("a", "b", 20).unwrap_err(), CoreError::Paused);
        sim.tick(Duration::from_secs(5));
        assert_eq!(sim.now(), SimTime::ZERO);

        sim.resume();
        sim.tick(Duration::from_secs(5));
        assert_eq!(sim.now(), SimTime::from_secs_f64(5.0));
    }

    #[test]
    fn test_attackable_targets() {
        let sim = duel(quiet());
        let targets: Vec<_> = sim
            .attackable_targets("a")
            .unwrap()
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(targets, vec!["b", "n"]);
        assert!(sim.attackable_targets("missing").is_err());
    }

    #[test]
    fn test_faction_without_territory_starts_eliminated() {
        let mut territories = TerritoryRegistry::new();
        territories.register(Territory::new("a", "A", "", 100).with_owner("f1"));
        territories.register(Territory::new("b", "B", "", 100).with_owner("f2"));
        let mut factions = FactionRegistry::new();
        factions.register(Faction::new("f1", "One", "#111111"));
        factions.register(Faction::new("f2", "Two", "#222222"));
        factions.register(Faction::new("f3", "Three", "#333333"));

        let sim = Simulation::new(SimConfig::default(), territories, factions, 1).unwrap();
        assert!(sim.faction("f3").unwrap().is_eliminated());
        assert!(!sim.is_over());
        assert!(sim.ai_phase("f3").is_none());
    }

    #[test]
    fn test_unknown_owner_is_a_config_error() {
        let mut territories = TerritoryRegistry::new();
        territories.register(Territory::new("a", "A", "", 100).with_owner("ghost"));
        let mut factions = FactionRegistry::new();
        factions.register(Faction::new("f1", "One", "#111111"));
        factions.register(Faction::new("f2", "Two", "#222222"));

        assert!(matches!(
            Simulation::new(SimConfig::default(), territories, factions, 1),
            Err(ConfigError::UnknownOwner { .. })
        ));
    }

    #[test]
    fn test_ai_decisions_run_on_schedule() {
        let mut sim = duel(SimConfig::default());
        assert!(sim.ai_phase("f1").is_none());
        assert_eq!(sim.ai_phase("f2"), Some(AiPhase::Idle));

        let report = sim.tick(Duration::from_secs(10));
        let decisions = report
            .ai_decisions
            .iter()
            .filter(|(f, _)| f.as_str() == "f2")
            .count();
        // First decision in [1, 3), then every 3 +/- 0.5 seconds
        assert!((3..=4).contains(&decisions), "{decisions}");
        assert!(report.ai_decisions.iter().all(|(f, _)| f.as_str() == "f2"));
    }

    #[test]
    fn test_standard_game_setup() {
        let sim = Simulation::standard_game(SimConfig::default(), 4, 7).unwrap();
        assert_eq!(sim.territories().len(), 34);
        assert_eq!(sim.factions().len(), 4);
        for faction in sim.factions().all_factions() {
            assert_eq!(sim.territories().count_owned_by(faction.id.as_str()), 8);
        }
        assert!(matches!(
            Simulation::standard_game(SimConfig::default(), 7, 7),
            Err(ConfigError::FactionCount { count: 7 })
        ));
    }
}
