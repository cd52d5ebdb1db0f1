//! World Snapshot Types
//!
//! Read-only copies of simulation state for renderers and UI panels.

use serde::{Deserialize, Serialize};

use crate::ids::{FactionId, TerritoryId};
use crate::time::SimTime;

/// Snapshot of a single territory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritorySnapshot {
    pub id: TerritoryId,
    pub name: String,
    pub region: String,
    pub points: u32,
    pub max_points: u32,
    pub growth_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<FactionId>,
    pub neighbors: Vec<TerritoryId>,
}

impl TerritorySnapshot {
    pub fn is_neutral(&self) -> bool {
        self.owner.is_none()
    }
}

/// Snapshot of a single faction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionSnapshot {
    pub id: FactionId,
    pub name: String,
    pub color: String,
    pub is_player: bool,
    pub is_eliminated: bool,
    pub territory_count: usize,
    pub total_points: u64,
}

/// Complete world state at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: SimTime,
    pub territories: Vec<TerritorySnapshot>,
    pub factions: Vec<FactionSnapshot>,
    /// Attacks committed but not yet resolved
    pub in_flight_attacks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<FactionId>,
    pub paused: bool,
}

impl WorldSnapshot {
    pub fn territory(&self, id: &str) -> Option<&TerritorySnapshot> {
        self.territories.iter().find(|t| t.id.as_str() == id)
    }

    pub fn faction(&self, id: &str) -> Option<&FactionSnapshot> {
        self.factions.iter().find(|f| f.id.as_str() == id)
    }

    /// Factions that still hold territory
    pub fn active_factions(&self) -> Vec<&FactionSnapshot> {
        self.factions.iter().filter(|f| !f.is_eliminated).collect()
    }

    /// Territories held by a faction
    pub fn territories_of(&self, faction: &str) -> Vec<&TerritorySnapshot> {
        self.territories
            .iter()
            .filter(|t| t.owner.as_ref().map_or(false, |o| o.as_str() == faction))
            .collect()
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Serializes to pretty JSON for inspection.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
