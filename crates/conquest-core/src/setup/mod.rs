//! Game Setup
//!
//! Map data, validation into registries, and standard game generation.

pub mod factions;
pub mod map;
pub mod world;

pub use factions::*;
pub use map::*;
pub use world::*;
