//! Faction Setup
//!
//! Creates the standard factions, randomizes a map's starting state, and
//! deals territories out to factions.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use super::map::{FactionDefinition, MapDefinition};
use crate::components::faction::{Faction, FactionRegistry, MAX_FACTIONS, MIN_FACTIONS};
use crate::config::{ConfigError, SetupConfig};

/// Canonical faction names, in creation order
pub const FACTION_NAMES: [&str; MAX_FACTIONS] =
    ["Alliance", "Empire", "Republic", "Federation", "Kingdom", "Free Army"];

/// Canonical faction colors, in creation order
pub const FACTION_COLORS: [&str; MAX_FACTIONS] =
    ["#4a9eff", "#ff4a4a", "#4aff7a", "#ffcc4a", "#aa4aff", "#ff7a4a"];

fn check_count(count: usize) -> Result<(), ConfigError> {
    if (MIN_FACTIONS..=MAX_FACTIONS).contains(&count) {
        Ok(())
    } else {
        Err(ConfigError::FactionCount { count })
    }
}

/// Definitions for `count` standard factions; the first is the player.
pub fn faction_definitions(count: usize) -> Result<Vec<FactionDefinition>, ConfigError> {
    check_count(count)?;
    Ok((0..count)
        .map(|i| FactionDefinition {
            id: format!("faction_{i}"),
            name: FACTION_NAMES[i].to_string(),
            color: FACTION_COLORS[i].to_string(),
            is_player: i == 0,
        })
        .collect())
}

/// Create and register `count` standard factions
pub fn create_factions(count: usize) -> Result<FactionRegistry, ConfigError> {
    let mut registry = FactionRegistry::new();
    for def in faction_definitions(count)? {
        let mut faction = Faction::new(def.id, def.name, def.color);
        if def.is_player {
            faction = faction.player();
        }
        registry.register(faction);
    }
    Ok(registry)
}

/// Give every territory random starting points and growth rate within the
/// configured ranges, and the configured capacity.
pub fn randomize_map(map: &mut MapDefinition, rng: &mut SmallRng, setup: &SetupConfig) {
    for territory in &mut map.territories {
        territory.max_points = setup.max_points;
        territory.starting_points = if setup.starting_points_min < setup.starting_points_max {
            rng.gen_range(setup.starting_points_min..setup.starting_points_max)
        } else {
            setup.starting_points_min
        }
        .min(setup.max_points);
        territory.growth_rate = if setup.growth_rate_min < setup.growth_rate_max {
            rng.gen_range(setup.growth_rate_min..setup.growth_rate_max)
        } else {
            setup.growth_rate_min
        };
    }
}

/// Shuffle the territories and deal `floor(n / k)` to each of the map's k
/// factions in order. Leftover territories stay neutral.
pub fn assign_initial_territories(
    map: &mut MapDefinition,
    rng: &mut SmallRng,
) -> Result<(), ConfigError> {
    let count = map.factions.len();
    check_count(count)?;

    let mut order: Vec<usize> = (0..map.territories.len()).collect();
    order.shuffle(rng);
    let per_faction = order.len() / count;

    for territory in &mut map.territories {
        territory.owner = None;
    }
    for (faction_index, chunk) in order.chunks(per_faction.max(1)).enumerate() {
        if per_faction == 0 || faction_index >= count {
            break;
        }
        let owner = &map.factions[faction_index].id;
        for &index in chunk {
            map.territories[index].owner = Some(owner.clone());
        }
    }

    tracing::debug!(factions = count, per_faction, "initial territories assigned");
    Ok(())
}
