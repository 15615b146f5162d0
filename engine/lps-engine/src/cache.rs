//! Time-based memoization of provider responses
//!
//! Finalized gameweek data rarely changes, but the provider does publish
//! corrections, so every cached response expires after a bounded TTL.
//! Only successful responses are stored.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::ProviderError;
use crate::models::{EntryId, Gameweek, LeagueId, Participant};
use crate::provider::{CompletedGameweeks, LeagueDataProvider};

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for league standings in seconds
    pub standings_ttl_secs: u64,

    /// TTL for entry gameweek payloads in seconds
    pub entry_score_ttl_secs: u64,

    /// TTL for the finalized gameweek list in seconds
    pub completed_gameweeks_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            standings_ttl_secs: 600,           // 10 minutes
            entry_score_ttl_secs: 600,         // 10 minutes
            completed_gameweeks_ttl_secs: 600, // 10 minutes
        }
    }
}

impl CacheConfig {
    pub fn standings_ttl(&self) -> Duration {
        Duration::from_secs(self.standings_ttl_secs)
    }

    pub fn entry_score_ttl(&self) -> Duration {
        Duration::from_secs(self.entry_score_ttl_secs)
    }

    pub fn completed_gameweeks_ttl(&self) -> Duration {
        Duration::from_secs(self.completed_gameweeks_ttl_secs)
    }
}

#[derive(Debug, Clone)]
struct Cached<T> {
    value: T,
    stored_at: Instant,
}

impl<T: Clone> Cached<T> {
    fn new(value: T) -> Self {
        Self { value, stored_at: Instant::now() }
    }

    fn fresh(&self, ttl: Duration) -> Option<T> {
        (self.stored_at.elapsed() < ttl).then(|| self.value.clone())
    }
}

/// Provider wrapper memoizing responses by request parameters
pub struct CachedProvider {
    inner: Arc<dyn LeagueDataProvider>,
    config: CacheConfig,
    standings: DashMap<LeagueId, Cached<Vec<Participant>>>,
    scores: DashMap<(EntryId, Gameweek), Cached<Value>>,
    completed: Mutex<Option<Cached<CompletedGameweeks>>>,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn LeagueDataProvider>, config: CacheConfig) -> Self {
        Self {
            inner,
            config,
            standings: DashMap::new(),
            scores: DashMap::new(),
            completed: Mutex::new(None),
        }
    }

    /// Drop every memoized response
    pub fn invalidate_all(&self) {
        self.standings.clear();
        self.scores.clear();
        *self.completed.lock() = None;
    }

    /// Number of memoized entry payloads, expired ones included
    pub fn cached_scores(&self) -> usize {
        self.scores.len()
    }
}

#[async_trait]
impl LeagueDataProvider for CachedProvider {
    async fn league_standings(&self, league_id: LeagueId) -> Result<Vec<Participant>, ProviderError> {
        let ttl = self.config.standings_ttl();
        let hit = self.standings.get(&league_id).and_then(|c| c.fresh(ttl));
        if let Some(hit) = hit {
            debug!("Cache hit for standings of league {}", league_id);
            return Ok(hit);
        }

        let standings = self.inner.league_standings(league_id).await?;
        self.standings.insert(league_id, Cached::new(standings.clone()));
        Ok(standings)
    }

    async fn entry_gameweek_score(
        &self,
        entry_id: EntryId,
        gameweek: Gameweek,
    ) -> Result<Value, ProviderError> {
        let key = (entry_id, gameweek);
        let ttl = self.config.entry_score_ttl();
        let hit = self.scores.get(&key).and_then(|c| c.fresh(ttl));
        if let Some(hit) = hit {
            debug!("Cache hit for entry {} gameweek {}", entry_id, gameweek);
            return Ok(hit);
        }

        let payload = self.inner.entry_gameweek_score(entry_id, gameweek).await?;
        self.scores.insert(key, Cached::new(payload.clone()));
        Ok(payload)
    }

    async fn completed_gameweeks(&self) -> Result<CompletedGameweeks, ProviderError> {
        let ttl = self.config.completed_gameweeks_ttl();
        let hit = self.completed.lock().as_ref().and_then(|c| c.fresh(ttl));
        if let Some(hit) = hit {
            return Ok(hit);
        }

        let completed = self.inner.completed_gameweeks().await?;
        *self.completed.lock() = Some(Cached::new(completed.clone()));
        Ok(completed)
    }
}
