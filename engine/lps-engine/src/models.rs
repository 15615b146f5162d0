use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::scoring::{GameweekScore, ScoreSource};

/// Fantasy league identifier
pub type LeagueId = u64;

/// Stable identifier of a participant's entry in the underlying competition
pub type EntryId = u64;

/// Gameweek number, 1-based
pub type Gameweek = i32;

/// A league participant as reported by the standings collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub entry_id: EntryId,

    /// Manager display name (e.g., "Jane Smith")
    pub manager_name: String,

    /// Team display name (e.g., "Klopp Dogg")
    pub team_name: String,

    /// League rank, 1-based, smaller is better
    pub overall_rank: u64,

    /// Season total points
    pub overall_total_points: i64,
}

/// One survivor's score for the gameweek being ranked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub participant: Participant,
    pub score: GameweekScore,
    pub source: ScoreSource,
}

impl SnapshotRow {
    pub fn entry_id(&self) -> EntryId {
        self.participant.entry_id
    }

    pub fn net_points(&self) -> i64 {
        self.score.net_points
    }
}

/// Why an entry was picked for elimination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EliminationReason {
    /// Scored inside the bottom block without needing a tie-break
    BelowCutoff,

    /// Lost the tie at the cutoff on overall rank or transfer cost
    TieBreak,

    /// Still tied after every tie-break field, lost the seeded draw
    CoinToss,
}

/// An entry removed from the contest, with the data it was removed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminatedEntry {
    /// Position within the gameweek's eliminations, 1-based
    pub elimination_order: usize,
    pub entry_id: EntryId,
    pub manager_name: String,
    pub team_name: String,
    #[serde(flatten)]
    pub score: GameweekScore,
    pub score_source: ScoreSource,
    pub overall_rank: u64,
    pub overall_points: i64,
    pub reason: EliminationReason,
}

/// How a gameweek was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameweekStatus {
    /// Eliminations were applied
    Completed,

    /// Schedule has no eliminations for this gameweek
    NothingScheduled,

    /// One or zero survivors were left before the gameweek
    ContestDecided,

    /// No survivor score could be fetched, nobody was eliminated
    SnapshotUnavailable,
}

/// Elimination event for one gameweek
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekEliminations {
    pub gameweek: Gameweek,
    pub scheduled: usize,
    pub survivors_before: usize,
    pub status: GameweekStatus,
    pub eliminated: Vec<EliminatedEntry>,
}

impl GameweekEliminations {
    /// An event that removed nobody
    pub fn empty(
        gameweek: Gameweek,
        scheduled: usize,
        survivors_before: usize,
        status: GameweekStatus,
    ) -> Self {
        Self { gameweek, scheduled, survivors_before, status, eliminated: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.eliminated.is_empty()
    }
}

/// Gameweek number to elimination event, total over 1..=target
pub type EliminationLog = BTreeMap<Gameweek, GameweekEliminations>;

/// Result of one elimination run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminationOutcome {
    pub league_id: LeagueId,
    pub target_gameweek: Gameweek,
    pub log: EliminationLog,

    /// Entries still standing after the target gameweek
    pub survivors: BTreeSet<EntryId>,

    /// Survivors sorted by overall rank, then manager name
    pub survivor_standings: Vec<Participant>,

    /// Number of survivors after each gameweek
    pub survivor_counts: BTreeMap<Gameweek, usize>,
}

impl EliminationOutcome {
    /// Eliminations recorded for a gameweek, empty when none
    pub fn eliminations_for(&self, gameweek: Gameweek) -> &[EliminatedEntry] {
        self.log.get(&gameweek).map(|event| event.eliminated.as_slice()).unwrap_or(&[])
    }

    /// Every eliminated entry in the order it left the contest
    pub fn eliminated_in_order(&self) -> impl Iterator<Item = &EliminatedEntry> {
        self.log.values().flat_map(|event| event.eliminated.iter())
    }

    pub fn winner(&self) -> Option<&Participant> {
        match self.survivor_standings.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}
