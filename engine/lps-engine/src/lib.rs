//! # Last Person Standing
//!
//! Elimination engine for a "Last Person Standing" contest layered on top of a
//! fantasy league. Every gameweek the scheduled number of lowest-scoring
//! survivors is removed, ties are broken by overall rank and transfer cost, and
//! anything still tied after that is settled by a draw seeded from the gameweek.
//!
//! League data comes from a [`LeagueDataProvider`]. The engine never talks to
//! the network itself; wrap the provider in a [`CachedProvider`] to memoize
//! responses between runs.

pub mod awards;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod provider;
pub mod ranking;
pub mod schedule;
pub mod scoring;
pub mod summary;

pub use awards::{gameweek_slammers, Medal, SlammerRow};
pub use cache::{CacheConfig, CachedProvider};
pub use config::{EngineSettings, LeagueConfig, LpsConfig};
pub use engine::EliminationEngine;
pub use error::{EngineError, ProviderError, Result};
pub use models::*;
pub use provider::{
    fetch_entry_score, CompletedGameweeks, FixtureScore, InMemoryProvider, LeagueDataProvider,
    LeagueFixture,
};
pub use schedule::{
    eliminations_for_gameweek, next_elimination_gameweek, scheduled_eliminations_through,
    SEASON_GAMEWEEKS,
};
pub use scoring::{GameweekScore, ScoreFetch, ScoreSource};
pub use summary::{LeagueSummary, ScheduledElimination};

/// Current version of the engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default multiplier applied to the gameweek number to seed tie-break draws
pub const DEFAULT_TIE_BREAK_SEED_MULTIPLIER: u64 = 10_007;

/// Default number of entry score requests in flight at once
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Overall rank assigned when the provider does not report one
pub const UNRANKED: u64 = 1_000_000_000;
