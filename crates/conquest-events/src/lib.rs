//! Shared event types and serialization for the conquest simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for the core engine and for anything that renders
//! or records what the engine does.

pub mod attack;
pub mod event;
pub mod ids;
pub mod snapshot;
pub mod time;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export identifier types
pub use ids::{AttackId, FactionId, TerritoryId};

// Re-export time types
pub use time::{ParseTimeError, SimTime};

// Re-export attack value types
pub use attack::{
    AttackIntent, AttackOutcome, AttackPrediction, AttackRejection, AttackResult, CancelReason,
    ReinforceRejection,
};

// Re-export event types
pub use event::*;

// Re-export snapshot types
pub use snapshot::{FactionSnapshot, TerritorySnapshot, WorldSnapshot};
