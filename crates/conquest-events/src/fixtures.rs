//! Sample data fixtures for testing.
//!
//! This module provides ready-made test data for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // conquest-events = { path = "../conquest-events", features = ["test-fixtures"] }
//!
//! use conquest_events::fixtures;
//!
//! let events = fixtures::sample_events();
//! ```

use crate::{
    generate_event_id, AttackId, AttackOutcome, AttackRejection, AttackResult, Event, EventKind,
    FactionId, SimTime, TerritoryId,
};

/// Returns a short, coherent match history:
/// - an attack launched from Canada against neutral Alaska
/// - a rejected attack below the minimum size
/// - the resolution conquering Alaska
/// - the elimination of faction_2 and the resulting victory
pub fn sample_events() -> Vec<Event> {
    let canada = TerritoryId::from("canada");
    let alaska = TerritoryId::from("alaska");
    let winner = FactionId::from("faction_0");
    let loser = FactionId::from("faction_2");

    let kinds = vec![
        (
            SimTime::ZERO,
            EventKind::PointsChanged {
                territory: canada.clone(),
                points: 10,
            },
        ),
        (
            SimTime::ZERO,
            EventKind::AttackStarted {
                attack_id: AttackId(1),
                attacker: winner.clone(),
                source: canada.clone(),
                target: alaska.clone(),
                points: 10,
                resolves_at: SimTime::from_millis(1500),
            },
        ),
        (
            SimTime::from_millis(200),
            EventKind::AttackRejected {
                source: canada.clone(),
                target: alaska.clone(),
                points: 4,
                rejection: AttackRejection::BelowMinimum { points: 4, minimum: 5 },
            },
        ),
        (
            SimTime::from_millis(1500),
            EventKind::OwnerChanged {
                territory: alaska.clone(),
                previous_owner: Some(loser.clone()),
                new_owner: Some(winner.clone()),
            },
        ),
        (
            SimTime::from_millis(1500),
            EventKind::AttackResolved {
                attack_id: AttackId(1),
                attacker: winner.clone(),
                source: canada,
                target: alaska,
                result: AttackResult {
                    outcome: AttackOutcome::Conquered,
                    conquered: true,
                    remaining_points: 10,
                    attacker_points: 10,
                    defender_points: 0,
                    previous_owner: Some(loser.clone()),
                },
            },
        ),
        (
            SimTime::from_millis(1500),
            EventKind::FactionEliminated { faction: loser },
        ),
        (
            SimTime::from_millis(1500),
            EventKind::Victory { faction: winner },
        ),
    ];

    kinds
        .into_iter()
        .enumerate()
        .map(|(i, (time, kind))| Event::new(generate_event_id(i as u64 + 1), time, kind))
        .collect()
}

/// Returns the victory event from samples.
pub fn victory_event() -> Event {
    sample_events()
        .into_iter()
        .find(|e| matches!(e.kind, EventKind::Victory { .. }))
        .expect("sample events contain a victory")
}
