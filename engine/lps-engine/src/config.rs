use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cache::CacheConfig;
use crate::error::EngineError;
use crate::models::LeagueId;
use crate::{DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_TIE_BREAK_SEED_MULTIPLIER};

/// Configuration for a Last Person Standing deployment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LpsConfig {
    /// League being tracked
    pub league: LeagueConfig,

    /// Elimination engine parameters
    pub engine: EngineSettings,

    /// Provider response memoization
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Classic league ID on the fantasy provider
    pub league_id: LeagueId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Maximum entry score requests in flight per gameweek
    pub max_concurrent_fetches: usize,

    /// Tie-break draw seed is `gameweek * tie_break_seed_multiplier`
    pub tie_break_seed_multiplier: u64,

    /// Refuse to compute through a gameweek the provider has not finalized
    pub require_finalized: bool,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self { league_id: 1_124_151 }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            tie_break_seed_multiplier: DEFAULT_TIE_BREAK_SEED_MULTIPLIER,
            require_finalized: false,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_concurrent_fetches == 0 {
            return Err(EngineError::Config("max_concurrent_fetches must be at least 1".into()));
        }
        if self.tie_break_seed_multiplier == 0 {
            return Err(EngineError::Config("tie_break_seed_multiplier must be non-zero".into()));
        }
        Ok(())
    }
}

impl LpsConfig {
    /// Load defaults, then a TOML file, then `LPS__*` environment variables.
    ///
    /// An explicit `path` must exist; without one an `lps.toml` is picked up if present.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        } else {
            builder = builder.add_source(::config::File::with_name("lps").required(false));
        }

        let mut config: Self = builder
            .add_source(
                ::config::Environment::with_prefix("LPS").separator("__").try_parsing(true),
            )
            .build()
            .context("Failed to build LPS configuration")?
            .try_deserialize()
            .context("Failed to parse LPS configuration")?;

        if let Ok(league_id) = std::env::var("LPS_LEAGUE_ID") {
            config.league.league_id =
                league_id.parse().with_context(|| format!("Invalid LPS_LEAGUE_ID: {league_id}"))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables only
    pub fn from_env() -> anyhow::Result<Self> {
        Self::load(None)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.engine.validate()
    }
}
