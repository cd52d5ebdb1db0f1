//! Elimination and Victory
//!
//! A faction owning zero territories is eliminated, permanently. The match
//! is won when exactly one faction remains active.

use conquest_events::{EventKind, FactionId};

use crate::components::faction::{Faction, FactionRegistry};
use crate::components::territory::TerritoryRegistry;
use crate::error::Result;
use crate::events::EventQueue;

/// Eliminate `faction_id` if it owns no territory.
///
/// Returns true only when the faction is newly eliminated by this call, in
/// which case a `FactionEliminated` event is emitted. Calling it again for
/// an already eliminated faction is a no-op.
pub fn check_elimination(
    territories: &TerritoryRegistry,
    factions: &mut FactionRegistry,
    faction_id: &str,
    events: &mut EventQueue,
) -> Result<bool> {
    if territories.count_owned_by(faction_id) > 0 {
        return Ok(false);
    }
    let faction = factions.get_mut(faction_id)?;
    if !faction.eliminate() {
        return Ok(false);
    }

    tracing::info!(faction = faction_id, "faction eliminated");
    events.push(EventKind::FactionEliminated {
        faction: FactionId::from(faction_id),
    });
    Ok(true)
}

/// Run [`check_elimination`] for every faction. Returns those newly
/// eliminated, in registration order.
pub fn check_all_eliminations(
    territories: &TerritoryRegistry,
    factions: &mut FactionRegistry,
    events: &mut EventQueue,
) -> Result<Vec<FactionId>> {
    let ids: Vec<FactionId> = factions.faction_ids().into_iter().cloned().collect();
    let mut eliminated = Vec::new();
    for id in ids {
        if check_elimination(territories, factions, id.as_str(), events)? {
            eliminated.push(id);
        }
    }
    Ok(eliminated)
}

/// The sole remaining faction, if exactly one is still active.
pub fn check_victory(factions: &FactionRegistry) -> Option<&Faction> {
    let mut active = factions.all_factions().filter(|f| !f.is_eliminated());
    let first = active.next()?;
    match active.next() {
        Some(_) => None,
        None => Some(first),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::territory::Territory;

    fn setup() -> (TerritoryRegistry, FactionRegistry) {
        let mut territories = TerritoryRegistry::new();
        territories.register(Territory::new("a", "A", "", 100).with_points(10).with_owner("f1"));
        territories.register(Territory::new("b", "B", "", 100).with_points(10).with_owner("f2"));
        territories.register(Territory::new("c", "C", "", 100));

        let mut factions = FactionRegistry::new();
        factions.register(Faction::new("f1", "One", "#111111"));
        factions.register(Faction::new("f2", "Two", "#222222"));
        factions.register(Faction::new("f3", "Three", "#333333"));
        (territories, factions)
    }

    #[test]
    fn test_faction_with_territory_survives() {
        let (territories, mut factions) = setup();
        let mut events = EventQueue::new();
        assert!(!check_elimination(&territories, &mut factions, "f1", &mut events).unwrap());
        assert!(events.is_empty());
    }

    #[test]
    fn test_elimination_is_reported_once() {
        let (territories, mut factions) = setup();
        let mut events = EventQueue::new();

        assert!(check_elimination(&territories, &mut factions, "f3", &mut events).unwrap());
        assert!(!check_elimination(&territories, &mut factions, "f3", &mut events).unwrap());
        assert!(factions.get("f3").unwrap().is_eliminated());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_unknown_faction_is_an_error() {
        let (territories, mut factions) = setup();
        let mut events = EventQueue::new();
        assert!(check_elimination(&territories, &mut factions, "nobody", &mut events).is_err());
    }

    #[test]
    fn test_victory_needs_a_single_survivor() {
        let (mut territories, mut factions) = setup();
        let mut events = EventQueue::new();

        let newly = check_all_eliminations(&territories, &mut factions, &mut events).unwrap();
        assert_eq!(newly, vec![FactionId::from("f3")]);
        assert!(check_victory(&factions).is_none());

        territories
            .set_owner("b", Some(FactionId::from("f1")), &mut events)
            .unwrap();
        check_elimination(&territories, &mut factions, "f2", &mut events).unwrap();
        assert_eq!(check_victory(&factions).map(|f| f.id.as_str()), Some("f1"));
    }
}
