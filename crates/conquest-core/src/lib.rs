//! Territorial Conquest Simulation Engine
//!
//! Territories accumulate points, factions spend them attacking neighbors,
//! and the last faction standing wins. Everything runs on one serialized
//! state-mutation path driven by [`Simulation::tick`].

use rand::rngs::SmallRng;
use rand::SeedableRng;

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::*;
pub use config::{ConfigError, SimConfig, TiePolicy};
pub use error::{CoreError, Result};
pub use events::{EventLogger, EventQueue};
pub use simulation::{Simulation, TickReport};

// Re-export setup functions explicitly to keep module names distinct
pub use setup::{build_registries, create_factions, default_world_map, MapDefinition};

/// Seeded random number generator shared by every random draw in a run
#[derive(Debug, Clone)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}
