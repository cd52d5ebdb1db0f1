//! AI Planner
//!
//! One-shot greedy attack selection for non-player factions, evaluated on a
//! jittered per-faction cadence.

pub mod planner;
pub mod utility;

pub use planner::{AiDecision, AiPhase, AiPlanner, AttackOpportunity};
pub use utility::{committed_points, deployable_points, reserve_points, score_target, AttackUtility};
