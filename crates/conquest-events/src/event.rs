//! Event Types
//!
//! Outbound notifications emitted by the simulation core. Events are side
//! effects for renderers, UIs and logs; nothing in the core reads them back.

use serde::{Deserialize, Serialize};

use crate::attack::{AttackRejection, AttackResult, CancelReason};
use crate::ids::{AttackId, FactionId, TerritoryId};
use crate::time::SimTime;

/// Primary event categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Territory,
    Attack,
    Faction,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A territory's point total changed
    PointsChanged { territory: TerritoryId, points: u32 },
    /// A territory changed hands
    OwnerChanged {
        territory: TerritoryId,
        #[serde(skip_serializing_if = "Option::is_none")]
        previous_owner: Option<FactionId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        new_owner: Option<FactionId>,
    },
    /// Points left a source territory and are travelling to a target
    AttackStarted {
        attack_id: AttackId,
        attacker: FactionId,
        source: TerritoryId,
        target: TerritoryId,
        points: u32,
        resolves_at: SimTime,
    },
    /// An in-flight attack reached its target
    AttackResolved {
        attack_id: AttackId,
        attacker: FactionId,
        source: TerritoryId,
        target: TerritoryId,
        result: AttackResult,
    },
    /// An attack intent failed validation; nothing changed
    AttackRejected {
        source: TerritoryId,
        target: TerritoryId,
        points: u32,
        rejection: AttackRejection,
    },
    /// An in-flight attack was dropped before resolution
    AttackCancelled {
        attack_id: AttackId,
        source: TerritoryId,
        target: TerritoryId,
        points: u32,
        reason: CancelReason,
    },
    /// Points moved between two territories of the same faction
    Reinforced {
        faction: FactionId,
        source: TerritoryId,
        target: TerritoryId,
        points: u32,
        /// Points that fit under the target's capacity
        delivered: u32,
    },
    /// A faction lost its last territory
    FactionEliminated { faction: FactionId },
    /// Only one faction remains
    Victory { faction: FactionId },
}

impl EventKind {
    pub fn category(&self) -> EventCategory {
        match self {
            EventKind::PointsChanged { .. } | EventKind::OwnerChanged { .. } => {
                EventCategory::Territory
            }
            EventKind::AttackStarted { .. }
            | EventKind::AttackResolved { .. }
            | EventKind::AttackRejected { .. }
            | EventKind::AttackCancelled { .. }
            | EventKind::Reinforced { .. } => EventCategory::Attack,
            EventKind::FactionEliminated { .. } | EventKind::Victory { .. } => {
                EventCategory::Faction
            }
        }
    }

    /// Short snake_case name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::PointsChanged { .. } => "points_changed",
            EventKind::OwnerChanged { .. } => "owner_changed",
            EventKind::AttackStarted { .. } => "attack_started",
            EventKind::AttackResolved { .. } => "attack_resolved",
            EventKind::AttackRejected { .. } => "attack_rejected",
            EventKind::AttackCancelled { .. } => "attack_cancelled",
            EventKind::Reinforced { .. } => "reinforced",
            EventKind::FactionEliminated { .. } => "faction_eliminated",
            EventKind::Victory { .. } => "victory",
        }
    }
}

/// A complete simulation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (e.g., "evt_00000042")
    pub event_id: String,
    /// Simulated time of the mutation step that produced the event
    pub time: SimTime,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(event_id: impl Into<String>, time: SimTime, kind: EventKind) -> Self {
        Self {
            event_id: event_id.into(),
            time,
            kind,
        }
    }

    pub fn category(&self) -> EventCategory {
        self.kind.category()
    }

    /// Checks if a territory is mentioned by this event.
    pub fn involves_territory(&self, territory: &str) -> bool {
        match &self.kind {
            EventKind::PointsChanged { territory: t, .. }
            | EventKind::OwnerChanged { territory: t, .. } => t.as_str() == territory,
            EventKind::AttackStarted { source, target, .. }
            | EventKind::AttackResolved { source, target, .. }
            | EventKind::AttackRejected { source, target, .. }
            | EventKind::AttackCancelled { source, target, .. }
            | EventKind::Reinforced { source, target, .. } => {
                source.as_str() == territory || target.as_str() == territory
            }
            EventKind::FactionEliminated { .. } | EventKind::Victory { .. } => false,
        }
    }

    /// Checks if a faction is mentioned by this event.
    pub fn involves_faction(&self, faction: &str) -> bool {
        let is = |f: &FactionId| f.as_str() == faction;
        match &self.kind {
            EventKind::PointsChanged { .. }
            | EventKind::AttackRejected { .. }
            | EventKind::AttackCancelled { .. } => false,
            EventKind::OwnerChanged {
                previous_owner,
                new_owner,
                ..
            } => previous_owner.as_ref().map_or(false, is) || new_owner.as_ref().map_or(false, is),
            EventKind::AttackStarted { attacker, .. } => is(attacker),
            EventKind::AttackResolved {
                attacker, result, ..
            } => is(attacker) || result.previous_owner.as_ref().map_or(false, is),
            EventKind::Reinforced { faction: f, .. }
            | EventKind::FactionEliminated { faction: f }
            | EventKind::Victory { faction: f } => is(f),
        }
    }

    /// Serializes the event to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::AttackOutcome;

    fn resolved_event() -> Event {
        Event::new(
            generate_event_id(3),
            SimTime::from_millis(1500),
            EventKind::AttackResolved {
                attack_id: AttackId(1),
                attacker: FactionId::from("faction_0"),
                source: TerritoryId::from("canada"),
                target: TerritoryId::from("alaska"),
                result: AttackResult {
                    outcome: AttackOutcome::Conquered,
                    conquered: true,
                    remaining_points: 4,
                    attacker_points: 14,
                    defender_points: 10,
                    previous_owner: Some(FactionId::from("faction_2")),
                },
            },
        )
    }

    #[test]
    fn test_event_id_format() {
        assert_eq!(generate_event_id(42), "evt_00000042");
    }

    #[test]
    fn test_event_flattens_type_tag() {
        let event = Event::new(
            "evt_00000001",
            SimTime::ZERO,
            EventKind::FactionEliminated {
                faction: FactionId::from("faction_3"),
            },
        );
        let json = event.to_jsonl().unwrap();
        assert!(json.contains(r#""type":"faction_eliminated""#));
        assert!(json.contains(r#""faction":"faction_3""#));
        assert_eq!(event.kind.name(), "faction_eliminated");
    }

    #[test]
    fn test_jsonl_round_trip() {
        let event = resolved_event();
        let line = event.to_jsonl().unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(Event::from_jsonl(&line).unwrap(), event);
    }

    #[test]
    fn test_involvement() {
        let event = resolved_event();
        assert!(event.involves_territory("alaska"));
        assert!(event.involves_territory("canada"));
        assert!(!event.involves_territory("siberia"));
        assert!(event.involves_faction("faction_0"));
        assert!(event.involves_faction("faction_2"));
        assert!(!event.involves_faction("faction_1"));
        assert_eq!(event.category(), EventCategory::Attack);
    }
}
