//! League data provider contract and an in-memory implementation

use anyhow::Context;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

use crate::error::ProviderError;
use crate::models::{EntryId, Gameweek, LeagueId, Participant};
use crate::scoring::ScoreFetch;

/// Gameweeks whose scores the provider considers final
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedGameweeks {
    pub finished: BTreeSet<Gameweek>,
}

impl CompletedGameweeks {
    pub fn new(finished: impl IntoIterator<Item = Gameweek>) -> Self {
        Self { finished: finished.into_iter().collect() }
    }

    /// Latest finished gameweek
    pub fn latest(&self) -> Option<Gameweek> {
        self.finished.iter().next_back().copied()
    }

    pub fn contains(&self, gameweek: Gameweek) -> bool {
        self.finished.contains(&gameweek)
    }
}

/// Source of league standings and per-entry gameweek scores
#[async_trait]
pub trait LeagueDataProvider: Send + Sync {
    /// Full standings for a league, ordered by overall rank
    async fn league_standings(&self, league_id: LeagueId) -> Result<Vec<Participant>, ProviderError>;

    /// Raw gameweek payload for one entry
    async fn entry_gameweek_score(
        &self,
        entry_id: EntryId,
        gameweek: Gameweek,
    ) -> Result<Value, ProviderError>;

    /// Gameweeks that have been finalized
    async fn completed_gameweeks(&self) -> Result<CompletedGameweeks, ProviderError>;
}

/// Fetch one entry's payload, turning provider errors into a failed fetch
pub async fn fetch_entry_score(
    provider: &dyn LeagueDataProvider,
    entry_id: EntryId,
    gameweek: Gameweek,
) -> ScoreFetch {
    match provider.entry_gameweek_score(entry_id, gameweek).await {
        Ok(payload) => ScoreFetch::Fetched(payload),
        Err(e) => ScoreFetch::Failed { reason: e.to_string() },
    }
}

/// League data stored as JSON, used for offline runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueFixture {
    pub league_id: LeagueId,
    pub standings: Vec<Participant>,
    #[serde(default)]
    pub scores: Vec<FixtureScore>,
    #[serde(default)]
    pub finished_gameweeks: Vec<Gameweek>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureScore {
    pub entry_id: EntryId,
    pub gameweek: Gameweek,

    /// Points after transfer cost
    pub points: i64,
    #[serde(default)]
    pub transfers_cost: i64,
}

/// Provider backed by in-memory maps
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    league_id: LeagueId,
    standings: Vec<Participant>,
    payloads: HashMap<(EntryId, Gameweek), Value>,
    failing: HashSet<(EntryId, Gameweek)>,
    flaky: Mutex<HashMap<(EntryId, Gameweek), usize>>,
    standings_unavailable: bool,
    finished: BTreeSet<Gameweek>,
    score_requests: AtomicUsize,
    standings_requests: AtomicUsize,
}

impl InMemoryProvider {
    pub fn new(league_id: LeagueId, standings: Vec<Participant>) -> Self {
        Self { league_id, standings, ..Default::default() }
    }

    pub fn from_fixture(fixture: LeagueFixture) -> Self {
        let mut provider = Self::new(fixture.league_id, fixture.standings);
        for score in fixture.scores {
            provider = provider.with_score(
                score.entry_id,
                score.gameweek,
                score.points,
                score.transfers_cost,
            );
        }
        provider.with_finished_gameweeks(fixture.finished_gameweeks)
    }

    /// Load a [`LeagueFixture`] from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        let fixture: LeagueFixture = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse fixture {}", path.display()))?;
        Ok(Self::from_fixture(fixture))
    }

    /// Record a score in the provider's wire shape, `points` being after transfer cost
    pub fn with_score(
        self,
        entry_id: EntryId,
        gameweek: Gameweek,
        points: i64,
        transfers_cost: i64,
    ) -> Self {
        let payload = json!({
            "entry_history": {
                "event": gameweek,
                "points": points,
                "event_transfers_cost": transfers_cost,
            }
        });
        self.with_payload(entry_id, gameweek, payload)
    }

    pub fn with_payload(mut self, entry_id: EntryId, gameweek: Gameweek, payload: Value) -> Self {
        self.payloads.insert((entry_id, gameweek), payload);
        self
    }

    /// Make every fetch of this entry's gameweek fail
    pub fn with_failing_score(mut self, entry_id: EntryId, gameweek: Gameweek) -> Self {
        self.failing.insert((entry_id, gameweek));
        self
    }

    pub fn with_standings_unavailable(mut self) -> Self {
        self.standings_unavailable = true;
        self
    }

    pub fn with_finished_gameweeks(mut self, gameweeks: impl IntoIterator<Item = Gameweek>) -> Self {
        self.finished.extend(gameweeks);
        self
    }

    /// Fail the first `failures` fetches of this entry's gameweek, then serve it
    pub fn with_flaky_score(self, entry_id: EntryId, gameweek: Gameweek, failures: usize) -> Self {
        self.flaky.lock().insert((entry_id, gameweek), failures);
        self
    }

    /// Number of entry score requests served so far
    pub fn score_requests(&self) -> usize {
        self.score_requests.load(Ordering::Relaxed)
    }

    pub fn standings_requests(&self) -> usize {
        self.standings_requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LeagueDataProvider for InMemoryProvider {
    async fn league_standings(&self, league_id: LeagueId) -> Result<Vec<Participant>, ProviderError> {
        self.standings_requests.fetch_add(1, Ordering::Relaxed);
        let endpoint = format!("standings/{league_id}");

        if self.standings_unavailable {
            return Err(ProviderError::Unavailable(endpoint));
        }
        if league_id != self.league_id {
            return Err(ProviderError::NotFound { endpoint });
        }

        let mut standings = self.standings.clone();
        standings.sort_by_key(|participant| participant.overall_rank);
        Ok(standings)
    }

    async fn entry_gameweek_score(
        &self,
        entry_id: EntryId,
        gameweek: Gameweek,
    ) -> Result<Value, ProviderError> {
        self.score_requests.fetch_add(1, Ordering::Relaxed);
        let endpoint = format!("entry/{entry_id}/event/{gameweek}");

        let flaky = match self.flaky.lock().get_mut(&(entry_id, gameweek)) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        };
        if flaky || self.failing.contains(&(entry_id, gameweek)) {
            debug!("Simulated failure for {}", endpoint);
            return Err(ProviderError::Unavailable(endpoint));
        }

        self.payloads
            .get(&(entry_id, gameweek))
            .cloned()
            .ok_or(ProviderError::NotFound { endpoint })
    }

    async fn completed_gameweeks(&self) -> Result<CompletedGameweeks, ProviderError> {
        Ok(CompletedGameweeks { finished: self.finished.clone() })
    }
}
