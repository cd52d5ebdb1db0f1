//! Faction Components
//!
//! Faction identities and their elimination status.

use conquest_events::{FactionId, FactionSnapshot};

use crate::error::{CoreError, Result};

/// Fewest factions a match can start with
pub const MIN_FACTIONS: usize = 2;
/// Most factions a match can start with
pub const MAX_FACTIONS: usize = 6;

/// A single faction in the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Faction {
    /// Unique identifier
    pub id: FactionId,
    /// Display name
    pub name: String,
    /// Display color, e.g. "#4a9eff"
    pub color: String,
    /// Controlled by the human player rather than the AI
    pub is_player: bool,
    eliminated: bool,
}

impl Faction {
    pub fn new(id: impl Into<FactionId>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            is_player: false,
            eliminated: false,
        }
    }

    pub fn player(mut self) -> Self {
        self.is_player = true;
        self
    }

    pub fn is_eliminated(&self) -> bool {
        self.eliminated
    }

    /// Marks the faction eliminated. One-way; returns true only on the
    /// transition.
    pub(crate) fn eliminate(&mut self) -> bool {
        let newly = !self.eliminated;
        self.eliminated = true;
        newly
    }
}

/// Registry of all factions, in registration order.
#[derive(Debug, Clone, Default)]
pub struct FactionRegistry {
    factions: Vec<Faction>,
}

impl FactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new faction. Returns false if the id is already taken.
    pub fn register(&mut self, faction: Faction) -> bool {
        if self.find(faction.id.as_str()).is_some() {
            return false;
        }
        self.factions.push(faction);
        true
    }

    /// Get a faction by id
    pub fn get(&self, faction_id: &str) -> Result<&Faction> {
        self.find(faction_id)
            .ok_or_else(|| CoreError::UnknownFaction(FactionId::from(faction_id)))
    }

    pub fn find(&self, faction_id: &str) -> Option<&Faction> {
        self.factions.iter().find(|f| f.id.as_str() == faction_id)
    }

    pub(crate) fn get_mut(&mut self, faction_id: &str) -> Result<&mut Faction> {
        self.factions
            .iter_mut()
            .find(|f| f.id.as_str() == faction_id)
            .ok_or_else(|| CoreError::UnknownFaction(FactionId::from(faction_id)))
    }

    /// Get all factions
    pub fn all_factions(&self) -> impl Iterator<Item = &Faction> {
        self.factions.iter()
    }

    /// Factions that are not eliminated
    pub fn active_factions(&self) -> Vec<&Faction> {
        self.factions.iter().filter(|f| !f.eliminated).collect()
    }

    /// The human-controlled faction, if any
    pub fn player_faction(&self) -> Option<&Faction> {
        self.factions.iter().find(|f| f.is_player)
    }

    pub fn faction_ids(&self) -> Vec<&FactionId> {
        self.factions.iter().map(|f| &f.id).collect()
    }

    pub fn len(&self) -> usize {
        self.factions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }

    /// Snapshot each faction with territory totals supplied by the caller
    pub fn snapshot(&self, totals: impl Fn(&str) -> (usize, u64)) -> Vec<FactionSnapshot> {
        self.factions
            .iter()
            .map(|f| {
                let (territory_count, total_points) = totals(f.id.as_str());
                FactionSnapshot {
                    id: f.id.clone(),
                    name: f.name.clone(),
                    color: f.color.clone(),
                    is_player: f.is_player,
                    is_eliminated: f.eliminated,
                    territory_count,
                    total_points,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = FactionRegistry::new();
        assert!(registry.register(Faction::new("f1", "Alliance", "#4a9eff").player()));
        assert!(!registry.register(Faction::new("f1", "Impostor", "#000000")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.player_faction().map(|f| f.name.as_str()), Some("Alliance"));
    }

    #[test]
    fn test_elimination_is_one_way() {
        let mut faction = Faction::new("f2", "Empire", "#ff4a4a");
        assert!(faction.eliminate());
        assert!(!faction.eliminate());
        assert!(faction.is_eliminated());
    }

    #[test]
    fn test_active_factions() {
        let mut registry = FactionRegistry::new();
        registry.register(Faction::new("f1", "Alliance", "#4a9eff"));
        registry.register(Faction::new("f2", "Empire", "#ff4a4a"));
        registry.get_mut("f2").unwrap().eliminate();
        let active: Vec<_> = registry.active_factions().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(active, vec!["f1"]);
        assert!(registry.get("f9").is_err());
    }
}
