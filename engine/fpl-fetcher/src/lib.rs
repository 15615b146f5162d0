//! Fantasy Premier League Fetcher
//!
//! HTTP implementation of [`lps_engine::LeagueDataProvider`] backed by the
//! public fantasy.premierleague.com API. Handles paginated classic-league
//! standings, per-entry gameweek picks and the finished gameweek list.

pub mod client;
pub mod config;
pub mod models;

pub use client::FplClient;
pub use config::FplConfig;
pub use models::*;
