//! Error types for the elimination engine and its data providers

use crate::models::{Gameweek, LeagueId};
use thiserror::Error;

/// Errors raised by a league data provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("HTTP request to {endpoint} failed: {reason}")]
    Http { endpoint: String, reason: String },

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("{endpoint} not found")]
    NotFound { endpoint: String },

    #[error("Malformed payload from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Errors that abort an elimination run
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Standings for league {league_id} unavailable: {source}")]
    StandingsUnavailable { league_id: LeagueId, source: ProviderError },

    #[error("Completed gameweeks unavailable: {0}")]
    CompletedGameweeksUnavailable(#[source] ProviderError),

    #[error("Invalid target gameweek {0}, gameweeks start at 1")]
    InvalidGameweek(Gameweek),

    #[error("Gameweek {requested} is not finalized (latest finalized: {latest:?})")]
    GameweekNotFinalized { requested: Gameweek, latest: Option<Gameweek> },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
