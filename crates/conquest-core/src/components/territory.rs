//! Territory Components
//!
//! Territories, their adjacency graph, and the registry that owns them.
//! Reads are public; point and ownership mutation is reserved for the
//! growth and combat systems inside this crate.

use conquest_events::{EventKind, FactionId, TerritoryId, TerritorySnapshot};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CoreError, Result};
use crate::events::EventQueue;

/// A node in the map graph holding points and an optional owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    /// Cosmetic grouping, not used by any rule
    pub region: String,
    current_points: u32,
    max_points: u32,
    growth_rate: f64,
    owner: Option<FactionId>,
    neighbors: BTreeSet<TerritoryId>,
    /// Fractional growth not yet applied as whole points
    growth_carry: f64,
}

impl Territory {
    /// Creates a neutral territory with no points. Capacity is at least 1.
    pub fn new(
        id: impl Into<TerritoryId>,
        name: impl Into<String>,
        region: impl Into<String>,
        max_points: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            region: region.into(),
            current_points: 0,
            max_points: max_points.max(1),
            growth_rate: 0.0,
            owner: None,
            neighbors: BTreeSet::new(),
            growth_carry: 0.0,
        }
    }

    /// Starting points, clamped to capacity
    pub fn with_points(mut self, points: u32) -> Self {
        self.current_points = points.min(self.max_points);
        self
    }

    /// Points per simulated second; negative or non-finite rates become 0
    pub fn with_growth_rate(mut self, rate: f64) -> Self {
        self.growth_rate = if rate.is_finite() { rate.max(0.0) } else { 0.0 };
        self
    }

    pub fn with_owner(mut self, owner: impl Into<FactionId>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn current_points(&self) -> u32 {
        self.current_points
    }

    pub fn max_points(&self) -> u32 {
        self.max_points
    }

    pub fn growth_rate(&self) -> f64 {
        self.growth_rate
    }

    pub fn owner(&self) -> Option<&FactionId> {
        self.owner.as_ref()
    }

    pub fn is_neutral(&self) -> bool {
        self.owner.is_none()
    }

    pub fn is_owned_by(&self, faction: &str) -> bool {
        self.owner.as_ref().map_or(false, |o| o.as_str() == faction)
    }

    pub fn is_full(&self) -> bool {
        self.current_points >= self.max_points
    }

    pub fn neighbors(&self) -> &BTreeSet<TerritoryId> {
        &self.neighbors
    }

    pub fn is_adjacent_to(&self, other: &str) -> bool {
        self.neighbors.contains(other)
    }

    pub(crate) fn growth_carry(&self) -> f64 {
        self.growth_carry
    }

    pub(crate) fn set_growth_carry(&mut self, carry: f64) {
        self.growth_carry = carry;
    }

    pub fn snapshot(&self) -> TerritorySnapshot {
        TerritorySnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            region: self.region.clone(),
            points: self.current_points,
            max_points: self.max_points,
            growth_rate: self.growth_rate,
            owner: self.owner.clone(),
            neighbors: self.neighbors.iter().cloned().collect(),
        }
    }
}

/// Registry of all territories, keyed and iterated in id order.
#[derive(Debug, Clone, Default)]
pub struct TerritoryRegistry {
    territories: BTreeMap<TerritoryId, Territory>,
}

impl TerritoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a territory, replacing any previous one with the same id
    pub fn register(&mut self, territory: Territory) {
        self.territories.insert(territory.id.clone(), territory);
    }

    /// Connect two registered territories in both directions.
    ///
    /// Returns false if either id is unknown or the ids are equal.
    pub fn connect(&mut self, a: &str, b: &str) -> bool {
        if a == b || !self.territories.contains_key(a) || !self.territories.contains_key(b) {
            return false;
        }
        if let Some(t) = self.territories.get_mut(a) {
            t.neighbors.insert(TerritoryId::from(b));
        }
        if let Some(t) = self.territories.get_mut(b) {
            t.neighbors.insert(TerritoryId::from(a));
        }
        true
    }

    /// Get a territory by id
    pub fn get(&self, territory_id: &str) -> Result<&Territory> {
        self.territories
            .get(territory_id)
            .ok_or_else(|| CoreError::UnknownTerritory(TerritoryId::from(territory_id)))
    }

    pub fn find(&self, territory_id: &str) -> Option<&Territory> {
        self.territories.get(territory_id)
    }

    pub fn contains(&self, territory_id: &str) -> bool {
        self.territories.contains_key(territory_id)
    }

    pub(crate) fn get_mut(&mut self, territory_id: &str) -> Result<&mut Territory> {
        self.territories
            .get_mut(territory_id)
            .ok_or_else(|| CoreError::UnknownTerritory(TerritoryId::from(territory_id)))
    }

    pub(crate) fn all_territories_mut(&mut self) -> impl Iterator<Item = &mut Territory> {
        self.territories.values_mut()
    }

    /// Get all territories
    pub fn all_territories(&self) -> impl Iterator<Item = &Territory> {
        self.territories.values()
    }

    /// Get all territory ids
    pub fn territory_ids(&self) -> Vec<&TerritoryId> {
        self.territories.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.territories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    /// Territories owned by a faction
    pub fn owned_by(&self, faction_id: &str) -> Vec<&Territory> {
        self.territories
            .values()
            .filter(|t| t.is_owned_by(faction_id))
            .collect()
    }

    pub fn count_owned_by(&self, faction_id: &str) -> usize {
        self.territories
            .values()
            .filter(|t| t.is_owned_by(faction_id))
            .count()
    }

    /// Sum of points held by a faction
    pub fn points_owned_by(&self, faction_id: &str) -> u64 {
        self.territories
            .values()
            .filter(|t| t.is_owned_by(faction_id))
            .map(|t| u64::from(t.current_points))
            .sum()
    }

    /// Neutral territories
    pub fn neutral_territories(&self) -> Vec<&Territory> {
        self.territories.values().filter(|t| t.is_neutral()).collect()
    }

    /// Neighbors of a territory
    pub fn neighbors_of(&self, territory_id: &str) -> Result<Vec<&Territory>> {
        let territory = self.get(territory_id)?;
        Ok(territory
            .neighbors
            .iter()
            .filter_map(|id| self.territories.get(id))
            .collect())
    }

    /// Check if two territories are adjacent
    pub fn are_adjacent(&self, a: &str, b: &str) -> bool {
        self.find(a).map_or(false, |t| t.is_adjacent_to(b))
    }

    /// Set points directly, clamped to [0, max_points]. Returns the new total.
    pub(crate) fn set_points(
        &mut self,
        territory_id: &str,
        points: u32,
        events: &mut EventQueue,
    ) -> Result<u32> {
        let territory = self.get_mut(territory_id)?;
        let clamped = points.min(territory.max_points);
        let changed = clamped != territory.current_points;
        territory.current_points = clamped;
        if changed {
            events.push(EventKind::PointsChanged {
                territory: territory.id.clone(),
                points: clamped,
            });
        }
        Ok(clamped)
    }

    /// Add points, clamped at capacity. Returns the points actually added.
    pub(crate) fn add_points(
        &mut self,
        territory_id: &str,
        amount: u32,
        events: &mut EventQueue,
    ) -> Result<u32> {
        let before = self.get(territory_id)?.current_points;
        let after = self.set_points(territory_id, before.saturating_add(amount), events)?;
        Ok(after - before)
    }

    /// Remove points, floored at zero. Returns the points actually removed.
    pub(crate) fn remove_points(
        &mut self,
        territory_id: &str,
        amount: u32,
        events: &mut EventQueue,
    ) -> Result<u32> {
        let before = self.get(territory_id)?.current_points;
        let after = self.set_points(territory_id, before.saturating_sub(amount), events)?;
        Ok(before - after)
    }

    /// Change ownership. Returns the previous owner.
    pub(crate) fn set_owner(
        &mut self,
        territory_id: &str,
        owner: Option<FactionId>,
        events: &mut EventQueue,
    ) -> Result<Option<FactionId>> {
        let territory = self.get_mut(territory_id)?;
        if territory.owner == owner {
            return Ok(owner);
        }
        let previous = std::mem::replace(&mut territory.owner, owner.clone());
        territory.growth_carry = 0.0;
        events.push(EventKind::OwnerChanged {
            territory: territory.id.clone(),
            previous_owner: previous.clone(),
            new_owner: owner,
        });
        Ok(previous)
    }

    pub fn snapshot(&self) -> Vec<TerritorySnapshot> {
        self.territories.values().map(Territory::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TerritoryRegistry {
        let mut registry = TerritoryRegistry::new();
        registry.register(Territory::new("a", "A", "West", 100).with_points(20).with_owner("f1"));
        registry.register(Territory::new("b", "B", "West", 50).with_points(10));
        registry.register(Territory::new("c", "C", "East", 100).with_owner("f2"));
        assert!(registry.connect("a", "b"));
        assert!(registry.connect("b", "c"));
        registry
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let registry = registry();
        assert!(registry.are_adjacent("a", "b"));
        assert!(registry.are_adjacent("b", "a"));
        assert!(!registry.are_adjacent("a", "c"));
        let ids: Vec<_> = registry
            .neighbors_of("b")
            .unwrap()
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_connect_rejects_unknown_and_self() {
        let mut registry = registry();
        assert!(!registry.connect("a", "a"));
        assert!(!registry.connect("a", "nowhere"));
    }

    #[test]
    fn test_unknown_lookup() {
        let registry = registry();
        assert_eq!(
            registry.get("atlantis").unwrap_err(),
            CoreError::UnknownTerritory(TerritoryId::from("atlantis"))
        );
        assert!(registry.neighbors_of("atlantis").is_err());
    }

    #[test]
    fn test_ownership_queries() {
        let registry = registry();
        assert_eq!(registry.owned_by("f1").len(), 1);
        assert_eq!(registry.count_owned_by("f2"), 1);
        assert_eq!(registry.points_owned_by("f1"), 20);
        assert_eq!(registry.neutral_territories().len(), 1);
    }

    #[test]
    fn test_points_clamped_into_capacity() {
        let mut registry = registry();
        let mut events = EventQueue::new();

        assert_eq!(registry.add_points("b", 500, &mut events).unwrap(), 40);
        assert_eq!(registry.get("b").unwrap().current_points(), 50);

        assert_eq!(registry.remove_points("b", 80, &mut events).unwrap(), 50);
        assert_eq!(registry.get("b").unwrap().current_points(), 0);

        assert_eq!(registry.set_points("a", 1000, &mut events).unwrap(), 100);
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_unchanged_points_emit_nothing() {
        let mut registry = registry();
        let mut events = EventQueue::new();
        registry.set_points("a", 20, &mut events).unwrap();
        registry.add_points("c", 0, &mut events).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_set_owner_emits_change() {
        let mut registry = registry();
        let mut events = EventQueue::new();
        let previous = registry
            .set_owner("b", Some(FactionId::from("f1")), &mut events)
            .unwrap();
        assert_eq!(previous, None);
        assert!(registry.get("b").unwrap().is_owned_by("f1"));

        let drained = events.drain();
        assert_eq!(drained.len(), 1);
        assert!(matches!(
            &drained[0].kind,
            EventKind::OwnerChanged { previous_owner: None, new_owner: Some(o), .. } if o.as_str() == "f1"
        ));
    }

    #[test]
    fn test_builder_clamps() {
        let t = Territory::new("x", "X", "", 0).with_points(9).with_growth_rate(-2.0);
        assert_eq!(t.max_points(), 1);
        assert_eq!(t.current_points(), 1);
        assert_eq!(t.growth_rate(), 0.0);
    }
}
