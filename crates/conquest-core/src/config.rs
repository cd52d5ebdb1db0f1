//! Simulation Configuration
//!
//! All tunable settings are loaded from a TOML file. Every section falls back
//! to defaults so a partial file (or none at all) is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Attack validation and resolution settings
    #[serde(default)]
    pub combat: CombatConfig,
    /// Point growth settings
    #[serde(default)]
    pub growth: GrowthConfig,
    /// AI opponent settings
    #[serde(default)]
    pub ai: AiConfig,
    /// Generated map settings
    #[serde(default)]
    pub setup: SetupConfig,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns this configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks every section for values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.combat.validate()?;
        self.ai.validate()?;
        self.setup.validate()
    }
}

/// How an exact tie between attacker and defender points is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// Both sides are depleted; the defender keeps the territory at 0 points
    #[default]
    DefenderHolds,
    /// The attacker takes the territory with a single point left
    AttackerWins,
}

/// Combat configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Smallest attack that passes validation
    pub min_attack_points: u32,
    /// Seconds between commitment and resolution
    pub travel_delay_secs: f64,
    /// Exact-tie rule
    pub tie_policy: TiePolicy,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            min_attack_points: 5,
            travel_delay_secs: 1.5,
            tie_policy: TiePolicy::DefenderHolds,
        }
    }
}

impl CombatConfig {
    pub fn travel_delay(&self) -> Duration {
        secs(self.travel_delay_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_attack_points == 0 {
            return Err(invalid("combat.min_attack_points", "must be at least 1"));
        }
        non_negative("combat.travel_delay_secs", self.travel_delay_secs)
    }
}

/// What happens to fractional growth between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FractionalGrowth {
    /// Carry the fractional remainder to the next step; whole points are
    /// applied with floor-on-apply
    #[default]
    Carry,
    /// Floor every step and discard the remainder
    Truncate,
}

/// Growth configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    pub fractional: FractionalGrowth,
}

/// Heuristic weights for scoring a candidate attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Multiplier on deployable / target points
    pub ratio: f32,
    /// Flat bonus when deployable points strictly exceed the target's
    pub conquerable: f32,
    /// Flat bonus for neutral targets
    pub neutral: f32,
    /// Multiplier on target capacity
    pub capacity: f32,
    /// Half-width of the uniform random perturbation
    pub noise: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            ratio: 50.0,
            conquerable: 100.0,
            neutral: 30.0,
            capacity: 0.2,
            noise: 10.0,
        }
    }
}

/// AI opponent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Run AI decisions from the simulation clock
    pub enabled: bool,
    /// Let the AI also drive the player faction (headless runs)
    pub control_player: bool,
    /// Seconds between decisions
    pub decision_interval_secs: f64,
    /// Each interval is perturbed uniformly within +/- this many seconds
    pub decision_jitter_secs: f64,
    /// First decisions are staggered in [initial_delay_min_secs, decision_interval_secs)
    pub initial_delay_min_secs: f64,
    /// Probability of committing to the best opportunity found
    pub aggressiveness: f32,
    /// Fraction of capacity kept back for defense
    pub reserve_ratio: f32,
    /// Points sent above the target's current total
    pub attack_overflow: u32,
    /// Opportunities scoring at or below this are ignored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
    pub weights: ScoreWeights,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            control_player: false,
            decision_interval_secs: 3.0,
            decision_jitter_secs: 0.5,
            initial_delay_min_secs: 1.0,
            aggressiveness: 0.6,
            reserve_ratio: 0.3,
            attack_overflow: 10,
            min_score: None,
            weights: ScoreWeights::default(),
        }
    }
}

impl AiConfig {
    pub fn decision_interval(&self) -> Duration {
        secs(self.decision_interval_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.decision_interval_secs > 0.0) || !self.decision_interval_secs.is_finite() {
            return Err(invalid("ai.decision_interval_secs", "must be positive"));
        }
        non_negative("ai.decision_jitter_secs", self.decision_jitter_secs)?;
        if self.decision_jitter_secs >= self.decision_interval_secs {
            return Err(invalid(
                "ai.decision_jitter_secs",
                "must be smaller than ai.decision_interval_secs",
            ));
        }
        non_negative("ai.initial_delay_min_secs", self.initial_delay_min_secs)?;
        if !(0.0..=1.0).contains(&self.aggressiveness) {
            return Err(invalid("ai.aggressiveness", "must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.reserve_ratio) {
            return Err(invalid("ai.reserve_ratio", "must be within [0, 1]"));
        }
        if !(self.weights.noise >= 0.0) || !self.weights.noise.is_finite() {
            return Err(invalid("ai.weights.noise", "must be finite and non-negative"));
        }
        Ok(())
    }
}

/// Settings for generated maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    pub starting_points_min: u32,
    pub starting_points_max: u32,
    pub growth_rate_min: f64,
    pub growth_rate_max: f64,
    pub max_points: u32,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            starting_points_min: 15,
            starting_points_max: 30,
            growth_rate_min: 0.5,
            growth_rate_max: 1.5,
            max_points: 100,
        }
    }
}

impl SetupConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_points == 0 {
            return Err(invalid("setup.max_points", "must be at least 1"));
        }
        if self.starting_points_min > self.starting_points_max {
            return Err(invalid("setup.starting_points_min", "exceeds setup.starting_points_max"));
        }
        if self.starting_points_max > self.max_points {
            return Err(invalid("setup.starting_points_max", "exceeds setup.max_points"));
        }
        non_negative("setup.growth_rate_min", self.growth_rate_min)?;
        if self.growth_rate_min > self.growth_rate_max || !self.growth_rate_max.is_finite() {
            return Err(invalid("setup.growth_rate_max", "must be finite and >= setup.growth_rate_min"));
        }
        Ok(())
    }
}

/// Errors that can occur while loading configuration or map data.
///
/// All of these surface before a simulation exists.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("faction count {count} outside [2, 6]")]
    FactionCount { count: usize },

    #[error("duplicate territory id: {0}")]
    DuplicateTerritory(String),

    #[error("duplicate faction id: {0}")]
    DuplicateFaction(String),

    #[error("territory {territory} lists unknown neighbor {neighbor}")]
    DanglingNeighbor { territory: String, neighbor: String },

    #[error("territory {0} lists itself as a neighbor")]
    SelfNeighbor(String),

    #[error("territory {territory} is owned by unknown faction {owner}")]
    UnknownOwner { territory: String, owner: String },

    #[error("territory {0} has zero capacity")]
    InvalidCapacity(String),

    #[error("territory {territory} starts with {points} points over its capacity of {max_points}")]
    StartingPointsExceedCapacity {
        territory: String,
        points: u32,
        max_points: u32,
    },

    #[error("territory {0} has a negative or non-finite growth rate")]
    InvalidGrowthRate(String),

    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

fn invalid(name: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, "must be finite and non-negative"))
    }
}

/// Validated seconds to a duration; anything unrepresentable becomes zero.
pub(crate) fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

/// Returns the default configuration as a TOML string.
pub fn default_config_toml() -> Result<String, ConfigError> {
    SimConfig::default().to_toml()
}
