//! Simulation Systems
//!
//! Growth, combat, elimination/victory and the AI planner. Each system works
//! on registries passed in by the caller and reports changes through the
//! event queue.

pub mod ai;
pub mod combat;
pub mod elimination;
pub mod growth;

pub use ai::{AiDecision, AiPhase, AiPlanner, AttackOpportunity};
pub use combat::{resolve_points, CombatResolver, InFlightAttack, PointResolution, Resolution};
pub use elimination::{check_all_eliminations, check_elimination, check_victory};
pub use growth::apply_growth;
