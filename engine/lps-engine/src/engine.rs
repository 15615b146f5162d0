//! Last Person Standing elimination engine
//!
//! A run is a sequential fold over gameweeks 1..=target: each gameweek starts
//! from the survivors the previous one left behind. Within a gameweek the
//! survivor scores are fetched concurrently and ranked once all have arrived.

use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::awards::{gameweek_slammers, SlammerRow};
use crate::config::EngineSettings;
use crate::error::{EngineError, Result};
use crate::models::*;
use crate::provider::{fetch_entry_score, LeagueDataProvider};
use crate::ranking::{select_eliminations, Selected};
use crate::schedule::eliminations_for_gameweek;
use crate::scoring::{GameweekScore, ScoreFetch, ScoreSource};
use crate::summary::LeagueSummary;

/// Computes eliminations from a league data provider
pub struct EliminationEngine {
    provider: Arc<dyn LeagueDataProvider>,
    settings: EngineSettings,
}

impl EliminationEngine {
    /// Create a new engine
    pub fn new(provider: Arc<dyn LeagueDataProvider>, settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { provider, settings })
    }

    /// Replay the contest from gameweek 1 through `target`
    pub async fn compute_eliminations_through(
        &self,
        league_id: LeagueId,
        target: Gameweek,
    ) -> Result<EliminationOutcome> {
        if target < 1 {
            return Err(EngineError::InvalidGameweek(target));
        }
        if self.settings.require_finalized {
            self.ensure_finalized(target).await?;
        }

        let standings = self.standings(league_id).await?;
        // First occurrence of a duplicated entry wins
        let participants: BTreeMap<EntryId, Participant> =
            standings.into_iter().rev().map(|p| (p.entry_id, p)).collect();
        let mut survivors: BTreeSet<EntryId> = participants.keys().copied().collect();

        info!(
            "Computing eliminations for league {} through gameweek {} ({} entries)",
            league_id,
            target,
            survivors.len()
        );

        let mut log = EliminationLog::new();
        let mut survivor_counts = BTreeMap::new();

        for gameweek in 1..=target {
            let event = self.run_gameweek(gameweek, &participants, &mut survivors).await;
            info!(
                "Gameweek {}: {} scheduled, {} eliminated, {} -> {} survivors ({:?})",
                gameweek,
                event.scheduled,
                event.eliminated.len(),
                event.survivors_before,
                survivors.len(),
                event.status
            );
            survivor_counts.insert(gameweek, survivors.len());
            log.insert(gameweek, event);
        }

        let mut survivor_standings: Vec<Participant> =
            survivors.iter().filter_map(|id| participants.get(id).cloned()).collect();
        survivor_standings.sort_by(|a, b| {
            a.overall_rank.cmp(&b.overall_rank).then_with(|| a.manager_name.cmp(&b.manager_name))
        });

        Ok(EliminationOutcome {
            league_id,
            target_gameweek: target,
            log,
            survivors,
            survivor_standings,
            survivor_counts,
        })
    }

    /// Gameweek medal table for every league entry
    pub async fn gameweek_slammers(
        &self,
        league_id: LeagueId,
        gameweek: Gameweek,
    ) -> Result<Vec<SlammerRow>> {
        if gameweek < 1 {
            return Err(EngineError::InvalidGameweek(gameweek));
        }

        let standings = self.standings(league_id).await?;
        let entry_ids: Vec<EntryId> = standings.iter().map(|p| p.entry_id).collect();
        let fetched: BTreeMap<EntryId, ScoreFetch> =
            self.fetch_scores(gameweek, &entry_ids).await.into_iter().collect();

        let rows = standings
            .into_iter()
            .map(|participant| {
                let (score, source) = fetched
                    .get(&participant.entry_id)
                    .map(GameweekScore::from_fetch)
                    .unwrap_or((GameweekScore::zero(), ScoreSource::Fallback));
                SnapshotRow { participant, score, source }
            })
            .collect();

        Ok(gameweek_slammers(rows))
    }

    /// League size, leader and upcoming elimination
    pub async fn league_summary(&self, league_id: LeagueId) -> Result<LeagueSummary> {
        let standings = self.standings(league_id).await?;
        let latest_finished = match self.provider.completed_gameweeks().await {
            Ok(completed) => completed.latest(),
            Err(e) => {
                warn!("Completed gameweeks unavailable for summary: {}", e);
                None
            }
        };

        Ok(LeagueSummary::new(&standings, latest_finished))
    }

    async fn standings(&self, league_id: LeagueId) -> Result<Vec<Participant>> {
        self.provider
            .league_standings(league_id)
            .await
            .map_err(|source| EngineError::StandingsUnavailable { league_id, source })
    }

    async fn ensure_finalized(&self, target: Gameweek) -> Result<()> {
        let completed = self
            .provider
            .completed_gameweeks()
            .await
            .map_err(EngineError::CompletedGameweeksUnavailable)?;

        let latest = completed.latest();
        match latest {
            Some(latest) if target <= latest => Ok(()),
            _ => Err(EngineError::GameweekNotFinalized { requested: target, latest }),
        }
    }

    async fn run_gameweek(
        &self,
        gameweek: Gameweek,
        participants: &BTreeMap<EntryId, Participant>,
        survivors: &mut BTreeSet<EntryId>,
    ) -> GameweekEliminations {
        let scheduled = eliminations_for_gameweek(gameweek);
        let survivors_before = survivors.len();

        if scheduled == 0 {
            return GameweekEliminations::empty(
                gameweek,
                scheduled,
                survivors_before,
                GameweekStatus::NothingScheduled,
            );
        }
        if survivors_before <= 1 {
            return GameweekEliminations::empty(
                gameweek,
                scheduled,
                survivors_before,
                GameweekStatus::ContestDecided,
            );
        }

        let entry_ids: Vec<EntryId> = survivors.iter().copied().collect();
        let fetched = self.fetch_scores(gameweek, &entry_ids).await;

        if fetched.iter().all(|(_, fetch)| fetch.is_failed()) {
            warn!("Gameweek {}: no survivor score could be fetched, skipping eliminations", gameweek);
            return GameweekEliminations::empty(
                gameweek,
                scheduled,
                survivors_before,
                GameweekStatus::SnapshotUnavailable,
            );
        }

        let rows: Vec<SnapshotRow> = fetched
            .into_iter()
            .filter_map(|(entry_id, fetch)| {
                let participant = participants.get(&entry_id)?.clone();
                if let ScoreFetch::Failed { reason } = &fetch {
                    warn!(
                        "Gameweek {}: score for entry {} unavailable, ranking it on zero points: {}",
                        gameweek, entry_id, reason
                    );
                }
                let (score, source) = GameweekScore::from_fetch(&fetch);
                Some(SnapshotRow { participant, score, source })
            })
            .collect();

        let selected =
            select_eliminations(rows, scheduled, gameweek, self.settings.tie_break_seed_multiplier);

        let mut eliminated = Vec::with_capacity(selected.len());
        for Selected { row, reason } in selected {
            if !survivors.remove(&row.entry_id()) {
                continue;
            }
            let (score, score_source) = self.refresh_score(gameweek, &row).await;
            eliminated.push(EliminatedEntry {
                elimination_order: eliminated.len() + 1,
                entry_id: row.participant.entry_id,
                manager_name: row.participant.manager_name,
                team_name: row.participant.team_name,
                score,
                score_source,
                overall_rank: row.participant.overall_rank,
                overall_points: row.participant.overall_total_points,
                reason,
            });
        }

        GameweekEliminations {
            gameweek,
            scheduled,
            survivors_before,
            status: GameweekStatus::Completed,
            eliminated,
        }
    }

    /// Fetch payloads for `entry_ids`, sorted by entry ID regardless of completion order
    async fn fetch_scores(
        &self,
        gameweek: Gameweek,
        entry_ids: &[EntryId],
    ) -> Vec<(EntryId, ScoreFetch)> {
        let provider = self.provider.as_ref();
        let mut fetched: Vec<(EntryId, ScoreFetch)> = stream::iter(entry_ids.iter().copied())
            .map(|entry_id| async move {
                (entry_id, fetch_entry_score(provider, entry_id, gameweek).await)
            })
            .buffer_unordered(self.settings.max_concurrent_fetches)
            .collect()
            .await;

        fetched.sort_by_key(|(entry_id, _)| *entry_id);
        debug!("Gameweek {}: fetched {} entry scores", gameweek, fetched.len());
        fetched
    }

    // The permanent record gets a fresh fetch; the ranking pass may have fallen back to zero
    async fn refresh_score(&self, gameweek: Gameweek, row: &SnapshotRow) -> (GameweekScore, ScoreSource) {
        let fetch = fetch_entry_score(self.provider.as_ref(), row.entry_id(), gameweek).await;
        match GameweekScore::from_fetch(&fetch) {
            (score, ScoreSource::Provider) => (score, ScoreSource::Provider),
            (_, ScoreSource::Fallback) => (row.score, row.source),
        }
    }
}
