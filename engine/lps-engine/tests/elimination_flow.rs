//! End-to-end elimination runs against the in-memory provider

use lps_engine::{
    eliminations_for_gameweek, CacheConfig, CachedProvider, EliminationEngine, EliminationOutcome,
    EliminationReason, EngineSettings, EntryId, Gameweek, GameweekStatus, InMemoryProvider,
    Medal, Participant, ScoreSource,
};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

const LEAGUE: u64 = 1_124_151;

fn participant(entry_id: EntryId, overall_rank: u64) -> Participant {
    Participant {
        entry_id,
        manager_name: format!("Manager {entry_id}"),
        team_name: format!("Team {entry_id}"),
        overall_rank,
        overall_total_points: 2500 - overall_rank as i64 * 7,
    }
}

/// League of `size` entries where entry N is ranked N and scores follow `points(entry, gw)`
fn league(size: u64, target: Gameweek, points: impl Fn(EntryId, Gameweek) -> i64) -> InMemoryProvider {
    let standings = (1..=size).map(|id| participant(id, id)).collect();
    let mut provider = InMemoryProvider::new(LEAGUE, standings);
    for gameweek in 1..=target {
        for entry_id in 1..=size {
            provider = provider.with_score(entry_id, gameweek, points(entry_id, gameweek), 0);
        }
    }
    provider
}

async fn run(provider: InMemoryProvider, target: Gameweek) -> EliminationOutcome {
    EliminationEngine::new(Arc::new(provider), EngineSettings::default())
        .unwrap()
        .compute_eliminations_through(LEAGUE, target)
        .await
        .unwrap()
}

fn eliminated_ids(outcome: &EliminationOutcome, gameweek: Gameweek) -> Vec<EntryId> {
    outcome.eliminations_for(gameweek).iter().map(|e| e.entry_id).collect()
}

fn assert_consistent(outcome: &EliminationOutcome, league_size: usize) {
    // One event per gameweek
    let gameweeks: Vec<Gameweek> = outcome.log.keys().copied().collect();
    assert_eq!(gameweeks, (1..=outcome.target_gameweek).collect::<Vec<_>>());

    let mut seen = BTreeSet::new();
    let mut alive = league_size;
    for (gameweek, event) in &outcome.log {
        assert_eq!(event.survivors_before, alive, "gameweek {gameweek}");

        let scheduled = eliminations_for_gameweek(*gameweek);
        let expected = match event.status {
            GameweekStatus::Completed => scheduled.min(alive),
            _ => 0,
        };
        if alive <= 1 {
            assert_ne!(event.status, GameweekStatus::Completed, "gameweek {gameweek}");
        }
        assert_eq!(event.eliminated.len(), expected, "gameweek {gameweek}");

        for entry in &event.eliminated {
            assert!(seen.insert(entry.entry_id), "entry {} eliminated twice", entry.entry_id);
            assert!(!outcome.survivors.contains(&entry.entry_id));
            assert_eq!(entry.score.raw_points - entry.score.minus_points, entry.score.net_points);
        }

        alive -= event.eliminated.len();
        assert_eq!(outcome.survivor_counts[gameweek], alive);
    }
    assert_eq!(outcome.survivors.len(), alive);
}

#[tokio::test]
async fn test_three_tied_for_two_slots() {
    // Net points [10, 10, 10, 20, 30] in gameweek 2
    let provider = InMemoryProvider::new(
        LEAGUE,
        vec![participant(1, 4), participant(2, 1), participant(3, 5), participant(4, 2), participant(5, 3)],
    )
    .with_score(1, 2, 10, 0)
    .with_score(2, 2, 10, 0)
    .with_score(3, 2, 10, 0)
    .with_score(4, 2, 20, 0)
    .with_score(5, 2, 30, 0);

    let outcome = run(provider, 2).await;

    // Entry 2 has the best overall rank of the tied three and survives
    assert_eq!(eliminated_ids(&outcome, 2), vec![3, 1]);
    assert!(outcome.survivors.contains(&2));
    assert!(outcome
        .eliminations_for(2)
        .iter()
        .all(|e| e.reason == EliminationReason::TieBreak));
}

#[tokio::test]
async fn test_worse_rank_eliminated_first() {
    let provider = InMemoryProvider::new(
        LEAGUE,
        vec![participant(1, 5), participant(2, 50), participant(3, 1), participant(4, 2)],
    )
    .with_score(1, 36, 44, 0)
    .with_score(2, 36, 44, 0)
    .with_score(3, 36, 80, 0)
    .with_score(4, 36, 90, 0);

    let outcome = EliminationEngine::new(Arc::new(provider), EngineSettings::default())
        .unwrap()
        .compute_eliminations_through(LEAGUE, 36)
        .await
        .unwrap();

    // Gameweeks 2..=35 have no scores, so the first fetchable week is 36 with one slot
    assert_eq!(eliminated_ids(&outcome, 36), vec![2]);
    assert!(outcome.survivors.contains(&1));
}

#[tokio::test]
async fn test_everyone_out_then_quiet() {
    // Gameweek 2 leaves three survivors for a 3-elimination week
    let provider = league(5, 10, |entry_id, _| entry_id as i64 * 10);
    let outcome = run(provider, 10).await;

    assert_eq!(eliminated_ids(&outcome, 2), vec![1, 2]);
    assert_eq!(outcome.survivor_counts[&2], 3);
    assert_eq!(eliminated_ids(&outcome, 3), vec![3, 4, 5]);
    assert_eq!(outcome.survivor_counts[&3], 0);
    assert!(outcome.survivors.is_empty());
    assert!(outcome.survivor_standings.is_empty());

    for gameweek in 4..=10 {
        let event = &outcome.log[&gameweek];
        assert!(event.is_empty());
        assert_eq!(event.status, GameweekStatus::ContestDecided);
    }
    assert_consistent(&outcome, 5);
}

#[tokio::test]
async fn test_last_person_standing_wins() {
    let provider = league(5, 8, |entry_id, gameweek| (entry_id as i64 * 13 + gameweek as i64 * 7) % 50);
    let outcome = run(provider, 8).await;

    assert_eq!(outcome.survivors.len(), 0);
    assert_consistent(&outcome, 5);

    let provider = league(3, 3, |entry_id, _| entry_id as i64);
    let outcome = run(provider, 3).await;
    assert_eq!(outcome.winner().map(|p| p.entry_id), Some(3));
    assert_eq!(outcome.log[&3].status, GameweekStatus::ContestDecided);
}

#[tokio::test]
async fn test_failed_fetch_does_not_abort_run() {
    // Entry 12 tops every week but cannot be fetched in gameweek 4
    let provider = league(12, 6, |entry_id, _| entry_id as i64 * 10).with_failing_score(12, 4);
    let outcome = run(provider, 6).await;

    assert_eq!(eliminated_ids(&outcome, 4), vec![12, 6, 7]);
    assert_eq!(outcome.eliminations_for(4)[0].score_source, ScoreSource::Fallback);
    assert_eq!(outcome.eliminations_for(4)[1].score_source, ScoreSource::Provider);
    assert_eq!(outcome.log[&5].status, GameweekStatus::Completed);
    assert_consistent(&outcome, 12);
}

#[tokio::test]
async fn test_runs_are_reproducible() {
    // Everyone ties every week, so every elimination goes to the tie-break
    let first = run(league(30, 12, |_, _| 42), 12).await;
    let second = run(league(30, 12, |_, _| 42), 12).await;

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert!(first
        .eliminated_in_order()
        .all(|e| e.reason == EliminationReason::TieBreak));
    assert_consistent(&first, 30);
}

#[tokio::test]
async fn test_rank_ties_fall_to_seeded_draw() {
    let standings = (1..=8).map(|id| participant(id, 3)).collect();
    let mut provider = InMemoryProvider::new(LEAGUE, standings);
    for entry_id in 1..=8 {
        provider = provider.with_score(entry_id, 2, 35, 4);
    }

    let outcome = run(provider, 2).await;
    let event = outcome.eliminations_for(2);
    assert_eq!(event.len(), 2);
    assert!(event.iter().all(|e| e.reason == EliminationReason::CoinToss));
}

#[tokio::test]
async fn test_larger_target_replays_from_start() {
    let points = |entry_id: EntryId, gameweek: Gameweek| ((entry_id as i64 * 31 + gameweek as i64 * 11) % 70) + 10;
    let short = run(league(40, 9, points), 5).await;
    let long = run(league(40, 9, points), 9).await;

    for gameweek in 1..=5 {
        assert_eq!(short.log[&gameweek], long.log[&gameweek]);
    }
    assert!(long.survivors.is_subset(&short.survivors));
}

#[tokio::test]
async fn test_cached_provider_reuses_snapshots() {
    let inner = Arc::new(league(20, 4, |entry_id, gameweek| (entry_id as i64 * gameweek as i64) % 23));
    let cached = Arc::new(CachedProvider::new(inner.clone(), CacheConfig::default()));
    let engine = EliminationEngine::new(cached, EngineSettings::default()).unwrap();

    let first = engine.compute_eliminations_through(LEAGUE, 4).await.unwrap();
    let requests = inner.score_requests();
    let second = engine.compute_eliminations_through(LEAGUE, 4).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(inner.score_requests(), requests);
    assert_eq!(inner.standings_requests(), 1);
}

#[tokio::test]
async fn test_concurrency_limit_does_not_change_result() {
    let points = |entry_id: EntryId, gameweek: Gameweek| ((entry_id as i64 * 7 + gameweek as i64 * 3) % 9) * 5;
    let mut outcomes = Vec::new();
    for max_concurrent_fetches in [1, 4, 64] {
        let settings = EngineSettings { max_concurrent_fetches, ..Default::default() };
        let engine = EliminationEngine::new(Arc::new(league(25, 8, points)), settings).unwrap();
        outcomes.push(engine.compute_eliminations_through(LEAGUE, 8).await.unwrap());
    }

    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(outcomes[1], outcomes[2]);
}

#[tokio::test]
async fn test_slammers_and_summary() {
    let provider = league(6, 3, |entry_id, _| [70, 55, 70, 40, 62, 12][entry_id as usize - 1])
        .with_failing_score(6, 3)
        .with_finished_gameweeks(1..=3);
    let engine = EliminationEngine::new(Arc::new(provider), EngineSettings::default()).unwrap();

    let table = engine.gameweek_slammers(LEAGUE, 3).await.unwrap();
    assert_eq!(table.len(), 6);
    assert_eq!(table[0].medal, Some(Medal::Gold));
    assert_eq!(table[1].medal, Some(Medal::Gold));
    assert_eq!(table[2].entry_id, 5);
    assert_eq!(table[2].medal, Some(Medal::Bronze));
    assert_eq!(table[5].entry_id, 6);
    assert_eq!(table[5].gameweek_points, 0);

    let summary = engine.league_summary(LEAGUE).await.unwrap();
    assert_eq!(summary.total_managers, 6);
    assert_eq!(summary.leader.map(|p| p.entry_id), Some(1));
    assert_eq!(summary.latest_finished_gameweek, Some(3));
    assert_eq!(summary.next_elimination.map(|n| n.gameweek), Some(4));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_leagues_stay_consistent(
        size in 1u64..40,
        target in 1i32..=38,
        scores in prop::collection::vec(0i64..6, 40 * 38),
        failures in prop::collection::vec((1u64..40, 1i32..=38), 0..10),
    ) {
        let mut provider = league(size, target, |entry_id, gameweek| {
            scores[((entry_id - 1) as usize) * 38 + (gameweek - 1) as usize]
        });
        for (entry_id, gameweek) in failures {
            provider = provider.with_failing_score(entry_id, gameweek);
        }

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let outcome = runtime.block_on(run(provider, target));
        assert_consistent(&outcome, size as usize);
    }
}
