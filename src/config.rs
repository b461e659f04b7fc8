//! Campaign configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file,
//! then `ARENA_*` environment variables (`__` separates nested keys, e.g.
//! `ARENA_TICK__MIN_MS=250`).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{ActorProfile, Stats};
use crate::progression::ProgressionCurve;
use crate::scheduler::TickRange;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ARENA_";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("exactly two actors required, found {0}")]
    ActorCount(usize),

    #[error("duplicate actor name: {0}")]
    DuplicateName(String),

    #[error("invalid {stat} for {actor}: {value}")]
    InvalidStat {
        actor: String,
        stat: &'static str,
        value: f64,
    },

    #[error("tick interval range is empty")]
    EmptyTickRange,

    #[error("tick interval range is inverted ({min_ms}ms > {max_ms}ms)")]
    InvertedTickRange { min_ms: u64, max_ms: u64 },

    #[error("match cap must be at least 1")]
    MatchCap,

    #[error("invalid progression {field}: {value}")]
    InvalidCurve { field: &'static str, value: f64 },

    #[error("time scale must be positive, got {0}")]
    InvalidTimeScale(f64),

    #[error("config file not found: {0}")]
    Missing(PathBuf),

    #[error("failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// Full campaign configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// The two combatants, side A first
    pub actors: Vec<ActorProfile>,
    /// Delay between turns
    pub tick: TickRange,
    /// Number of matches in the campaign
    pub match_cap: u32,
    /// Difficulty curve
    pub progression: ProgressionCurve,
    /// Game-speed multiplier; tick delays are divided by it
    pub time_scale: f64,
    /// Seed for reproducible campaigns
    pub seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            actors: vec![
                ActorProfile::new("Fighter A", Stats::default()),
                ActorProfile::new("Fighter B", Stats::default()),
            ],
            tick: TickRange::new(500, 1000),
            match_cap: 100,
            progression: ProgressionCurve::default(),
            time_scale: 1.0,
            seed: None,
        }
    }
}

impl ArenaConfig {
    /// Layered configuration sources
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(ArenaConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate configuration
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
        }
        let config: ArenaConfig = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check every constraint a campaign relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actors.len() != 2 {
            return Err(ConfigError::ActorCount(self.actors.len()));
        }

        let mut names = HashSet::new();
        for actor in &self.actors {
            if !names.insert(actor.name.as_str()) {
                return Err(ConfigError::DuplicateName(actor.name.clone()));
            }
            validate_stats(actor)?;
        }

        self.tick.validate()?;

        if self.match_cap < 1 {
            return Err(ConfigError::MatchCap);
        }

        validate_curve(&self.progression)?;

        if !self.time_scale.is_finite() || self.time_scale <= 0.0 {
            return Err(ConfigError::InvalidTimeScale(self.time_scale));
        }

        Ok(())
    }

    /// The two base profiles, side A first
    pub fn profiles(&self) -> Result<[ActorProfile; 2], ConfigError> {
        match self.actors.as_slice() {
            [a, b] => Ok([a.clone(), b.clone()]),
            other => Err(ConfigError::ActorCount(other.len())),
        }
    }

    /// Tick range after applying the time scale
    pub fn effective_tick(&self) -> TickRange {
        self.tick.scaled(self.time_scale)
    }
}

fn validate_stats(actor: &ActorProfile) -> Result<(), ConfigError> {
    let invalid = |stat, value| ConfigError::InvalidStat {
        actor: actor.name.clone(),
        stat,
        value,
    };

    for (stat, value) in actor.stats.fields() {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(stat, value));
        }
    }
    if actor.stats.strike_rate <= 0.0 {
        return Err(invalid("strike_rate", actor.stats.strike_rate));
    }
    for (stat, value) in [
        ("critical_rate", actor.stats.critical_rate),
        ("evasion_rate", actor.stats.evasion_rate),
    ] {
        if value > 100.0 {
            return Err(invalid(stat, value));
        }
    }
    Ok(())
}

fn validate_curve(curve: &ProgressionCurve) -> Result<(), ConfigError> {
    for (field, value) in [
        ("k_alpha", curve.k_alpha),
        ("k_rand", curve.k_rand),
        ("max_health_increment", curve.max_health_increment),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidCurve { field, value });
        }
    }
    if !curve.base_health.is_finite() || curve.base_health <= 0.0 {
        return Err(ConfigError::InvalidCurve {
            field: "base_health",
            value: curve.base_health,
        });
    }
    Ok(())
}
