use conquest_events::{AttackRejection, FactionId, ReinforceRejection, TerritoryId};
use thiserror::Error;

/// Errors returned by simulation commands and queries.
///
/// None of these are fatal: the simulation state is unchanged whenever one
/// is returned, and callers are expected to treat them as "no-op this tick".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Territory not found: {0}")]
    UnknownTerritory(TerritoryId),

    #[error("Faction not found: {0}")]
    UnknownFaction(FactionId),

    #[error("Invalid attack: {0}")]
    InvalidAttack(#[from] AttackRejection),

    #[error("Invalid reinforcement: {0}")]
    InvalidReinforcement(#[from] ReinforceRejection),

    #[error("Simulation is over")]
    SimulationOver,

    #[error("Simulation is paused")]
    Paused,
}

pub type Result<T> = std::result::Result<T, CoreError>;
