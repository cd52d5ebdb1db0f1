//! World Map
//!
//! The default 34-territory world map across six regions.

use super::map::{MapDefinition, TerritoryDefinition};

const NORTH_AMERICA: &str = "North America";
const SOUTH_AMERICA: &str = "South America";
const EUROPE: &str = "Europe";
const ASIA: &str = "Asia";
const AFRICA: &str = "Africa";
const OCEANIA: &str = "Oceania";

/// Create the default world map. Every territory starts neutral with 20 of
/// 100 points; factions are added separately.
pub fn default_world_map() -> MapDefinition {
    let t = TerritoryDefinition::new;

    let territories = vec![
        // === NORTH AMERICA ===
        t("alaska", "Alaska", NORTH_AMERICA, &["canada", "siberia"]),
        t("canada", "Canada", NORTH_AMERICA, &["alaska", "usa_west", "usa_east", "greenland"]),
        t("greenland", "Greenland", NORTH_AMERICA, &["canada", "north_europe"]),
        t("usa_west", "Western USA", NORTH_AMERICA, &["canada", "usa_east", "mexico"]),
        t("usa_east", "Eastern USA", NORTH_AMERICA, &["canada", "usa_west", "mexico", "caribbean"]),
        t("mexico", "Mexico", NORTH_AMERICA, &["usa_west", "usa_east", "central_america"]),
        t("central_america", "Central America", NORTH_AMERICA, &["mexico", "caribbean", "colombia"]),
        t("caribbean", "Caribbean", NORTH_AMERICA, &["usa_east", "central_america", "colombia"]),
        // === SOUTH AMERICA ===
        t("colombia", "Colombia", SOUTH_AMERICA, &["central_america", "caribbean", "brazil", "andes"]),
        t("brazil", "Brazil", SOUTH_AMERICA, &["colombia", "andes", "south_cone"]),
        t("andes", "Andes", SOUTH_AMERICA, &["colombia", "brazil", "south_cone"]),
        t("south_cone", "Southern Cone", SOUTH_AMERICA, &["brazil", "andes"]),
        // === EUROPE ===
        t("north_europe", "Northern Europe", EUROPE, &["greenland", "west_europe", "central_europe", "russia_west"]),
        t("west_europe", "Western Europe", EUROPE, &["north_europe", "iberia", "central_europe", "north_africa"]),
        t("iberia", "Iberia", EUROPE, &["west_europe", "north_africa"]),
        t("central_europe", "Central Europe", EUROPE, &["north_europe", "west_europe", "italy", "east_europe", "balkans"]),
        t("italy", "Italy", EUROPE, &["central_europe", "balkans", "north_africa"]),
        t("east_europe", "Eastern Europe", EUROPE, &["central_europe", "balkans", "russia_west"]),
        t("balkans", "Balkans", EUROPE, &["central_europe", "italy", "east_europe", "middle_east"]),
        t("russia_west", "Western Russia", EUROPE, &["north_europe", "east_europe", "central_asia", "siberia"]),
        // === ASIA ===
        t("siberia", "Siberia", ASIA, &["alaska", "russia_west", "central_asia", "china_north", "far_east"]),
        t("central_asia", "Central Asia", ASIA, &["russia_west", "siberia", "middle_east", "south_asia", "china_north"]),
        t("middle_east", "Middle East", ASIA, &["balkans", "central_asia", "south_asia", "north_africa", "east_africa"]),
        t("south_asia", "South Asia", ASIA, &["central_asia", "middle_east", "southeast_asia"]),
        t("china_north", "Northern China", ASIA, &["siberia", "central_asia", "south_asia", "southeast_asia", "japan_korea", "far_east"]),
        t("far_east", "Far East", ASIA, &["siberia", "china_north", "japan_korea"]),
        t("japan_korea", "Japan and Korea", ASIA, &["far_east", "china_north"]),
        t("southeast_asia", "Southeast Asia", ASIA, &["south_asia", "china_north", "australia"]),
        // === AFRICA ===
        t("north_africa", "North Africa", AFRICA, &["iberia", "west_europe", "italy", "middle_east", "west_africa", "east_africa"]),
        t("west_africa", "West Africa", AFRICA, &["north_africa", "east_africa", "south_africa"]),
        t("east_africa", "East Africa", AFRICA, &["north_africa", "middle_east", "west_africa", "south_africa"]),
        t("south_africa", "South Africa", AFRICA, &["west_africa", "east_africa"]),
        // === OCEANIA ===
        t("australia", "Australia", OCEANIA, &["southeast_asia", "pacific"]),
        t("pacific", "Pacific Islands", OCEANIA, &["australia", "japan_korea"]),
    ];

    MapDefinition {
        name: "World Map".to_string(),
        territories,
        factions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{build_registries, faction_definitions};

    #[test]
    fn test_world_map_size() {
        let map = default_world_map();
        assert_eq!(map.territories.len(), 34);

        let regions: std::collections::BTreeSet<_> =
            map.territories.iter().map(|t| t.region.as_str()).collect();
        assert_eq!(regions.len(), 6);
    }

    #[test]
    fn test_world_map_loads_and_is_symmetric() {
        let mut map = default_world_map();
        map.factions = faction_definitions(2).unwrap();
        let (territories, _) = build_registries(&map).unwrap();

        for territory in territories.all_territories() {
            assert!(!territory.neighbors().is_empty(), "{} is isolated", territory.id);
            for neighbor in territory.neighbors() {
                assert!(territories.are_adjacent(neighbor.as_str(), territory.id.as_str()));
            }
        }
        // Declared one way only in the data
        assert!(territories.are_adjacent("japan_korea", "pacific"));
        assert!(territories.are_adjacent("south_asia", "china_north"));
    }

    #[test]
    fn test_world_map_is_connected() {
        let mut map = default_world_map();
        map.factions = faction_definitions(2).unwrap();
        let (territories, _) = build_registries(&map).unwrap();

        let mut seen = std::collections::BTreeSet::new();
        let mut frontier = vec!["alaska".to_string()];
        while let Some(id) = frontier.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            for n in territories.get(&id).unwrap().neighbors() {
                frontier.push(n.as_str().to_string());
            }
        }
        assert_eq!(seen.len(), 34);
    }
}
