//! State Components
//!
//! Territories, factions and the registries that own them.

pub mod faction;
pub mod territory;

pub use faction::*;
pub use territory::*;
