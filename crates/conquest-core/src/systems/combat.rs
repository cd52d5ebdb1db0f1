//! Combat Resolver
//!
//! Validates attack intents, commits points from the source immediately, and
//! resolves each attack once its travel delay has elapsed. Resolution is a
//! deterministic point-cancellation rule applied to the target's state at
//! the moment that attack lands; attacks land strictly in expiry order, ties
//! broken by issue order.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::time::Duration;

use conquest_events::{
    AttackId, AttackOutcome, AttackPrediction, AttackRejection, AttackResult, CancelReason,
    EventKind, FactionId, ReinforceRejection, SimTime, TerritoryId,
};

use crate::components::faction::FactionRegistry;
use crate::components::territory::TerritoryRegistry;
use crate::config::{CombatConfig, TiePolicy};
use crate::error::{CoreError, Result};
use crate::events::EventQueue;

/// Outcome of cancelling attack points against defender points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointResolution {
    /// Defender keeps the territory with the remaining points
    DefenderHolds { remaining: u32 },
    /// Exact tie under [`TiePolicy::DefenderHolds`]
    MutualDepletion,
    /// Attacker takes the territory with the remaining points
    AttackerConquers { remaining: u32 },
}

/// The cancellation rule shared by prediction and resolution.
pub fn resolve_points(attack: u32, defense: u32, tie_policy: TiePolicy) -> PointResolution {
    if defense > attack {
        PointResolution::DefenderHolds {
            remaining: defense - attack,
        }
    } else if attack > defense {
        PointResolution::AttackerConquers {
            remaining: attack - defense,
        }
    } else {
        match tie_policy {
            TiePolicy::DefenderHolds => PointResolution::MutualDepletion,
            TiePolicy::AttackerWins => PointResolution::AttackerConquers { remaining: 1 },
        }
    }
}

/// An attack whose points have left the source but not yet landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlightAttack {
    pub id: AttackId,
    /// Owner of the source at commitment time
    pub attacker: FactionId,
    pub source: TerritoryId,
    pub target: TerritoryId,
    pub points: u32,
    pub issued_at: SimTime,
    pub resolves_at: SimTime,
}

/// What happened when an in-flight attack came due.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved {
        attack: InFlightAttack,
        result: AttackResult,
    },
    Cancelled {
        attack: InFlightAttack,
        reason: CancelReason,
    },
}

impl Resolution {
    pub fn attack(&self) -> &InFlightAttack {
        match self {
            Resolution::Resolved { attack, .. } | Resolution::Cancelled { attack, .. } => attack,
        }
    }

    /// The faction that lost the target, if the attack conquered it
    pub fn conquered_from(&self) -> Option<&FactionId> {
        match self {
            Resolution::Resolved { result, .. } if result.conquered => {
                result.previous_owner.as_ref()
            }
            _ => None,
        }
    }
}

/// Validates, commits and resolves attacks.
#[derive(Debug, Clone)]
pub struct CombatResolver {
    min_attack_points: u32,
    travel_delay: Duration,
    tie_policy: TiePolicy,
    in_flight: BTreeMap<AttackId, InFlightAttack>,
    schedule: BinaryHeap<Reverse<(SimTime, AttackId)>>,
    next_attack_id: u64,
}

impl CombatResolver {
    pub fn new(config: &CombatConfig) -> Self {
        Self {
            min_attack_points: config.min_attack_points,
            travel_delay: config.travel_delay(),
            tie_policy: config.tie_policy,
            in_flight: BTreeMap::new(),
            schedule: BinaryHeap::new(),
            next_attack_id: 1,
        }
    }

    pub fn min_attack_points(&self) -> u32 {
        self.min_attack_points
    }

    pub fn travel_delay(&self) -> Duration {
        self.travel_delay
    }

    pub fn tie_policy(&self) -> TiePolicy {
        self.tie_policy
    }

    /// Full validation with the reason for any failure.
    pub fn check(
        &self,
        territories: &TerritoryRegistry,
        source_id: &str,
        target_id: &str,
        points: u32,
    ) -> Result<()> {
        let source = territories.get(source_id)?;
        let target = territories.get(target_id)?;

        if source_id == target_id {
            return Err(AttackRejection::SelfAttack.into());
        }
        let Some(owner) = source.owner() else {
            return Err(AttackRejection::NeutralSource.into());
        };
        if target.owner() == Some(owner) {
            return Err(AttackRejection::FriendlyTarget.into());
        }
        if !source.is_adjacent_to(target_id) {
            return Err(AttackRejection::NotAdjacent.into());
        }
        if points < self.min_attack_points {
            return Err(AttackRejection::BelowMinimum {
                points,
                minimum: self.min_attack_points,
            }
            .into());
        }
        if points > source.current_points() {
            return Err(AttackRejection::InsufficientPoints {
                points,
                available: source.current_points(),
            }
            .into());
        }
        Ok(())
    }

    /// True when the attack would be accepted right now.
    pub fn validate(
        &self,
        territories: &TerritoryRegistry,
        source_id: &str,
        target_id: &str,
        points: u32,
    ) -> bool {
        self.check(territories, source_id, target_id, points).is_ok()
    }

    /// Predict the outcome against the current state without mutating it.
    pub fn predict(
        &self,
        territories: &TerritoryRegistry,
        source_id: &str,
        target_id: &str,
        points: u32,
    ) -> Result<AttackPrediction> {
        match self.check(territories, source_id, target_id, points) {
            Ok(()) => {}
            Err(CoreError::InvalidAttack(rejection)) => {
                return Ok(AttackPrediction::rejected(rejection))
            }
            Err(e) => return Err(e),
        }

        let source = territories.get(source_id)?;
        let target = territories.get(target_id)?;
        let defense = target.current_points();

        let (will_conquer, attacker_left, defender_left) =
            match resolve_points(points, defense, self.tie_policy) {
                PointResolution::DefenderHolds { remaining } => (false, 0, remaining),
                PointResolution::MutualDepletion => (false, 0, 0),
                PointResolution::AttackerConquers { remaining } => (true, remaining, 0),
            };
        let resulting_points = if will_conquer {
            attacker_left.min(target.max_points())
        } else {
            defender_left
        };
        let resulting_owner = if will_conquer {
            source.owner().cloned()
        } else {
            target.owner().cloned()
        };

        Ok(AttackPrediction {
            can_attack: true,
            rejection: None,
            will_conquer,
            attacker_points_remaining: attacker_left,
            defender_points_remaining: defender_left,
            resulting_points,
            resulting_owner,
        })
    }

    /// Commit an attack: deduct points from the source now and schedule the
    /// resolution one travel delay later.
    ///
    /// Invalid intents are reported as an error plus an `AttackRejected`
    /// event and leave state untouched.
    pub fn execute(
        &mut self,
        territories: &mut TerritoryRegistry,
        source_id: &str,
        target_id: &str,
        points: u32,
        now: SimTime,
        events: &mut EventQueue,
    ) -> Result<AttackId> {
        if let Err(e) = self.check(territories, source_id, target_id, points) {
            if let CoreError::InvalidAttack(rejection) = &e {
                tracing::warn!(
                    source = source_id,
                    target = target_id,
                    points,
                    "attack rejected: {}",
                    rejection
                );
                events.push(EventKind::AttackRejected {
                    source: TerritoryId::from(source_id),
                    target: TerritoryId::from(target_id),
                    points,
                    rejection: rejection.clone(),
                });
            }
            return Err(e);
        }

        let attacker = territories
            .get(source_id)?
            .owner()
            .cloned()
            .ok_or(CoreError::InvalidAttack(AttackRejection::NeutralSource))?;
        territories.remove_points(source_id, points, events)?;

        let id = AttackId(self.next_attack_id);
        self.next_attack_id += 1;
        let attack = InFlightAttack {
            id,
            attacker: attacker.clone(),
            source: TerritoryId::from(source_id),
            target: TerritoryId::from(target_id),
            points,
            issued_at: now,
            resolves_at: now + self.travel_delay,
        };

        tracing::debug!(
            attack = %id,
            attacker = %attacker,
            source = source_id,
            target = target_id,
            points,
            resolves_at = %attack.resolves_at,
            "attack launched"
        );
        events.push(EventKind::AttackStarted {
            attack_id: id,
            attacker,
            source: attack.source.clone(),
            target: attack.target.clone(),
            points,
            resolves_at: attack.resolves_at,
        });

        self.schedule.push(Reverse((attack.resolves_at, id)));
        self.in_flight.insert(id, attack);
        Ok(id)
    }

    /// When the earliest in-flight attack lands, if any.
    pub fn next_resolution_at(&self) -> Option<SimTime> {
        self.schedule.peek().map(|Reverse((at, _))| *at)
    }

    /// In-flight attacks in issue order
    pub fn in_flight(&self) -> impl Iterator<Item = &InFlightAttack> {
        self.in_flight.values()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Resolve the earliest attack due at or before `now`, if any.
    ///
    /// Call repeatedly to drain everything due; each call observes the
    /// effects of the previous one.
    pub fn resolve_next_due(
        &mut self,
        now: SimTime,
        territories: &mut TerritoryRegistry,
        factions: &FactionRegistry,
        events: &mut EventQueue,
    ) -> Option<Resolution> {
        loop {
            let Reverse((at, id)) = *self.schedule.peek()?;
            if at > now {
                return None;
            }
            self.schedule.pop();
            if let Some(attack) = self.in_flight.remove(&id) {
                return Some(self.land(attack, territories, factions, events));
            }
        }
    }

    fn land(
        &self,
        attack: InFlightAttack,
        territories: &mut TerritoryRegistry,
        factions: &FactionRegistry,
        events: &mut EventQueue,
    ) -> Resolution {
        let target_id = attack.target.as_str();

        let cancel = if !territories.contains(target_id) {
            Some(CancelReason::TargetMissing)
        } else if factions
            .find(attack.attacker.as_str())
            .map_or(false, |f| f.is_eliminated())
        {
            Some(CancelReason::AttackerEliminated)
        } else {
            None
        };
        if let Some(reason) = cancel {
            return self.cancel(attack, reason, events);
        }

        match self.apply(&attack, territories, events) {
            Ok(result) => {
                events.push(EventKind::AttackResolved {
                    attack_id: attack.id,
                    attacker: attack.attacker.clone(),
                    source: attack.source.clone(),
                    target: attack.target.clone(),
                    result: result.clone(),
                });
                Resolution::Resolved { attack, result }
            }
            Err(_) => self.cancel(attack, CancelReason::TargetMissing, events),
        }
    }

    fn apply(
        &self,
        attack: &InFlightAttack,
        territories: &mut TerritoryRegistry,
        events: &mut EventQueue,
    ) -> Result<AttackResult> {
        let target_id = attack.target.as_str();
        let target = territories.get(target_id)?;
        let defense = target.current_points();
        let previous_owner = target.owner().cloned();

        // Arriving at a territory the attacker already holds merges the points.
        if previous_owner.as_ref() == Some(&attack.attacker) {
            territories.add_points(target_id, attack.points, events)?;
            let remaining = territories.get(target_id)?.current_points();
            return Ok(AttackResult {
                outcome: AttackOutcome::Reinforced,
                conquered: false,
                remaining_points: remaining,
                attacker_points: attack.points,
                defender_points: defense,
                previous_owner,
            });
        }

        let (outcome, remaining) = match resolve_points(attack.points, defense, self.tie_policy) {
            PointResolution::DefenderHolds { remaining } => {
                let left = territories.set_points(target_id, remaining, events)?;
                (AttackOutcome::DefenderHeld, left)
            }
            PointResolution::MutualDepletion => {
                let left = territories.set_points(target_id, 0, events)?;
                (AttackOutcome::MutualDepletion, left)
            }
            PointResolution::AttackerConquers { remaining } => {
                territories.set_owner(target_id, Some(attack.attacker.clone()), events)?;
                let left = territories.set_points(target_id, remaining, events)?;
                tracing::info!(
                    attacker = %attack.attacker,
                    target = target_id,
                    previous_owner = ?previous_owner,
                    points = left,
                    "territory conquered"
                );
                (AttackOutcome::Conquered, left)
            }
        };

        Ok(AttackResult {
            outcome,
            conquered: outcome == AttackOutcome::Conquered,
            remaining_points: remaining,
            attacker_points: attack.points,
            defender_points: defense,
            previous_owner,
        })
    }

    fn cancel(
        &self,
        attack: InFlightAttack,
        reason: CancelReason,
        events: &mut EventQueue,
    ) -> Resolution {
        tracing::warn!(attack = %attack.id, target = %attack.target, ?reason, "attack cancelled");
        events.push(EventKind::AttackCancelled {
            attack_id: attack.id,
            source: attack.source.clone(),
            target: attack.target.clone(),
            points: attack.points,
            reason,
        });
        Resolution::Cancelled { attack, reason }
    }

    /// Validate a reinforcement between two territories of one faction.
    pub fn check_reinforcement(
        &self,
        territories: &TerritoryRegistry,
        source_id: &str,
        target_id: &str,
        points: u32,
    ) -> Result<()> {
        let source = territories.get(source_id)?;
        let target = territories.get(target_id)?;

        if source_id == target_id {
            return Err(ReinforceRejection::SameTerritory.into());
        }
        let Some(owner) = source.owner() else {
            return Err(ReinforceRejection::NeutralSource.into());
        };
        if target.owner() != Some(owner) {
            return Err(ReinforceRejection::NotFriendly.into());
        }
        if !source.is_adjacent_to(target_id) {
            return Err(ReinforceRejection::NotAdjacent.into());
        }
        if points == 0 {
            return Err(ReinforceRejection::ZeroPoints.into());
        }
        if points > source.current_points() {
            return Err(ReinforceRejection::InsufficientPoints {
                points,
                available: source.current_points(),
            }
            .into());
        }
        Ok(())
    }

    /// Move points between two adjacent friendly territories immediately.
    /// Anything above the target's capacity is lost. Returns the points
    /// delivered.
    pub fn reinforce(
        &self,
        territories: &mut TerritoryRegistry,
        source_id: &str,
        target_id: &str,
        points: u32,
        events: &mut EventQueue,
    ) -> Result<u32> {
        if let Err(e) = self.check_reinforcement(territories, source_id, target_id, points) {
            tracing::warn!(source = source_id, target = target_id, points, "reinforcement rejected: {}", e);
            return Err(e);
        }
        let faction = territories
            .get(source_id)?
            .owner()
            .cloned()
            .ok_or(CoreError::InvalidReinforcement(ReinforceRejection::NeutralSource))?;

        territories.remove_points(source_id, points, events)?;
        let delivered = territories.add_points(target_id, points, events)?;
        events.push(EventKind::Reinforced {
            faction,
            source: TerritoryId::from(source_id),
            target: TerritoryId::from(target_id),
            points,
            delivered,
        });
        Ok(delivered)
    }
}
