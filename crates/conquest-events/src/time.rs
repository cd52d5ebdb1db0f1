//! Simulation Time
//!
//! Simulated time is a monotonic offset from the start of the match. It is
//! kept as a [`Duration`] internally so that ordering and arithmetic are
//! exact, and serialized as fractional seconds.
//!
//! # Example
//!
//! ```
//! use conquest_events::SimTime;
//! use std::time::Duration;
//!
//! let t = SimTime::ZERO + Duration::from_millis(1500);
//! assert_eq!(t.as_secs_f64(), 1.5);
//! assert_eq!(t.to_string(), "1.500s");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Point on the simulation timeline, measured from match start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimTime(Duration);

impl SimTime {
    /// Match start.
    pub const ZERO: SimTime = SimTime(Duration::ZERO);

    pub fn from_duration(offset: Duration) -> Self {
        Self(offset)
    }

    /// Builds a time from fractional seconds. Negative or non-finite input
    /// collapses to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO))
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is in the future.
    pub fn saturating_since(self, earlier: SimTime) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: Duration) -> SimTime {
        SimTime(self.0.saturating_add(rhs))
    }
}

impl Sub for SimTime {
    type Output = Duration;

    fn sub(self, rhs: SimTime) -> Duration {
        self.saturating_since(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0.as_secs_f64())
    }
}

/// Error type for parsing SimTime from strings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseTimeError {
    #[error("invalid time: '{0}', expected seconds such as '12.5s'")]
    InvalidFormat(String),
    #[error("time must be finite and non-negative: '{0}'")]
    OutOfRange(String),
}

impl FromStr for SimTime {
    type Err = ParseTimeError;

    /// Parses "12.5s" or a bare "12.5".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix('s').unwrap_or(trimmed);
        let secs: f64 = number
            .parse()
            .map_err(|_| ParseTimeError::InvalidFormat(s.to_string()))?;
        Duration::try_from_secs_f64(secs)
            .map(SimTime)
            .map_err(|_| ParseTimeError::OutOfRange(s.to_string()))
    }
}

impl Serialize for SimTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0.as_secs_f64())
    }
}

impl<'de> Deserialize<'de> for SimTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map(SimTime)
            .map_err(serde::de::Error::custom)
    }
}
