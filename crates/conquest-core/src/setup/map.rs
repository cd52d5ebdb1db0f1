//! Map Definitions
//!
//! Map topology is supplied as data (TOML or JSON) and validated into the
//! territory and faction registries before a simulation can exist.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::faction::{Faction, FactionRegistry, MAX_FACTIONS, MIN_FACTIONS};
use crate::components::territory::{Territory, TerritoryRegistry};
use crate::config::ConfigError;

fn default_starting_points() -> u32 {
    20
}

fn default_max_points() -> u32 {
    100
}

fn default_growth_rate() -> f64 {
    1.0
}

fn default_color() -> String {
    "#808080".to_string()
}

/// One territory as written in map data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default = "default_starting_points")]
    pub starting_points: u32,
    #[serde(default = "default_max_points")]
    pub max_points: u32,
    /// Points per second while owned
    #[serde(default = "default_growth_rate")]
    pub growth_rate: f64,
    /// May be one-way; adjacency is symmetrized on load
    #[serde(default)]
    pub neighbors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl TerritoryDefinition {
    pub fn new(id: &str, name: &str, region: &str, neighbors: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            region: region.to_string(),
            starting_points: default_starting_points(),
            max_points: default_max_points(),
            growth_rate: default_growth_rate(),
            neighbors: neighbors.iter().map(|n| n.to_string()).collect(),
            owner: None,
        }
    }
}

/// One faction as written in map data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionDefinition {
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub is_player: bool,
}

/// A complete map: territories, adjacency and factions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub territories: Vec<TerritoryDefinition>,
    #[serde(default)]
    pub factions: Vec<FactionDefinition>,
}

impl MapDefinition {
    /// Load from a file; `.json` is read as JSON, anything else as TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn territory(&self, id: &str) -> Option<&TerritoryDefinition> {
        self.territories.iter().find(|t| t.id == id)
    }
}

/// Validate map data and build the registries.
///
/// Rejects faction counts outside [2, 6], duplicate ids, dangling or
/// self-referencing neighbors, owners that are not listed factions, zero
/// capacities, starting points above capacity and bad growth rates.
pub fn build_registries(
    map: &MapDefinition,
) -> Result<(TerritoryRegistry, FactionRegistry), ConfigError> {
    let count = map.factions.len();
    if !(MIN_FACTIONS..=MAX_FACTIONS).contains(&count) {
        return Err(ConfigError::FactionCount { count });
    }

    let mut factions = FactionRegistry::new();
    for def in &map.factions {
        let mut faction = Faction::new(def.id.as_str(), def.name.as_str(), def.color.as_str());
        if def.is_player {
            faction = faction.player();
        }
        if !factions.register(faction) {
            return Err(ConfigError::DuplicateFaction(def.id.clone()));
        }
    }

    let ids: BTreeSet<&str> = map.territories.iter().map(|t| t.id.as_str()).collect();
    let mut territories = TerritoryRegistry::new();
    for def in &map.territories {
        if territories.contains(&def.id) {
            return Err(ConfigError::DuplicateTerritory(def.id.clone()));
        }
        if def.max_points == 0 {
            return Err(ConfigError::InvalidCapacity(def.id.clone()));
        }
        if def.starting_points > def.max_points {
            return Err(ConfigError::StartingPointsExceedCapacity {
                territory: def.id.clone(),
                points: def.starting_points,
                max_points: def.max_points,
            });
        }
        if !(def.growth_rate >= 0.0) || !def.growth_rate.is_finite() {
            return Err(ConfigError::InvalidGrowthRate(def.id.clone()));
        }
        for neighbor in &def.neighbors {
            if neighbor == &def.id {
                return Err(ConfigError::SelfNeighbor(def.id.clone()));
            }
            if !ids.contains(neighbor.as_str()) {
                return Err(ConfigError::DanglingNeighbor {
                    territory: def.id.clone(),
                    neighbor: neighbor.clone(),
                });
            }
        }

        let mut territory = Territory::new(
            def.id.as_str(),
            def.name.as_str(),
            def.region.as_str(),
            def.max_points,
        )
        .with_points(def.starting_points)
        .with_growth_rate(def.growth_rate);
        if let Some(owner) = &def.owner {
            if factions.find(owner).is_none() {
                return Err(ConfigError::UnknownOwner {
                    territory: def.id.clone(),
                    owner: owner.clone(),
                });
            }
            territory = territory.with_owner(owner.as_str());
        }
        territories.register(territory);
    }

    for def in &map.territories {
        for neighbor in &def.neighbors {
            if territories.connect(&def.id, neighbor) && !declared_both_ways(map, def, neighbor) {
                tracing::debug!(territory = %def.id, neighbor = %neighbor, "symmetrized one-way adjacency");
            }
        }
    }

    tracing::info!(
        territories = territories.len(),
        factions = factions.len(),
        "map loaded"
    );
    Ok((territories, factions))
}

fn declared_both_ways(map: &MapDefinition, def: &TerritoryDefinition, neighbor: &str) -> bool {
    map.territory(neighbor)
        .map_or(false, |n| n.neighbors.iter().any(|back| back == &def.id))
}
