//! Event Output
//!
//! The outbound event queue filled by every mutation step, and the JSONL
//! logger that records drained events.

pub mod logger;
pub mod queue;

pub use logger::EventLogger;
pub use queue::EventQueue;
