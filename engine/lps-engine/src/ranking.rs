//! Bottom-block selection for a single gameweek
//!
//! Survivors are ranked by net points. The bottom block is every entry scoring
//! at or below the net points of the `k`-th worst entry. Entries strictly below
//! the block's top score go out unconditionally; the entries tied on the top
//! score compete for the remaining slots, worse overall rank first, then more
//! transfer cost. Entries that still compare equal across the cut are settled
//! by a shuffle seeded from the gameweek alone, so reruns always agree.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cmp::{Ordering, Reverse};
use tracing::debug;

use crate::models::{EliminationReason, Gameweek, SnapshotRow};

/// An entry chosen for elimination and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    pub row: SnapshotRow,
    pub reason: EliminationReason,
}

/// Elimination priority: fewer net points, worse overall rank, more transfer cost
pub fn elimination_priority(a: &SnapshotRow, b: &SnapshotRow) -> Ordering {
    a.score
        .net_points
        .cmp(&b.score.net_points)
        .then_with(|| tie_break_key(a).cmp(&tie_break_key(b)))
}

fn tie_break_key(row: &SnapshotRow) -> (Reverse<u64>, Reverse<i64>) {
    (Reverse(row.participant.overall_rank), Reverse(row.score.minus_points))
}

/// Seed for the tie-break draw, a pure function of the gameweek
pub fn tie_break_seed(gameweek: Gameweek, multiplier: u64) -> u64 {
    u64::from(gameweek.unsigned_abs()).wrapping_mul(multiplier)
}

/// Pick `eliminations` entries out of `rows`.
///
/// Rows should arrive in a stable order (by entry ID) so that entries equal on
/// every ranking field keep a reproducible relative order. Returns strict
/// eliminations first, in ranked order, followed by the tie winners in
/// tie-break order.
pub fn select_eliminations(
    mut rows: Vec<SnapshotRow>,
    eliminations: usize,
    gameweek: Gameweek,
    seed_multiplier: u64,
) -> Vec<Selected> {
    if eliminations == 0 || rows.is_empty() {
        return Vec::new();
    }

    rows.sort_by(elimination_priority);

    let block_len = if eliminations >= rows.len() {
        rows.len()
    } else {
        let threshold = rows[eliminations - 1].net_points();
        rows.iter().take_while(|row| row.net_points() <= threshold).count()
    };
    rows.truncate(block_len);

    // Sorted ascending, so the block's top score is its last row
    let block_max = rows[block_len - 1].net_points();
    let strict_len = rows.iter().take_while(|row| row.net_points() < block_max).count();
    let tied = rows.split_off(strict_len);
    let remaining_slots = eliminations.saturating_sub(strict_len);

    debug!(
        "Gameweek {}: bottom block of {} at <= {} net points, {} strictly out, {} tied for {} slots",
        gameweek,
        block_len,
        block_max,
        strict_len,
        tied.len(),
        remaining_slots
    );

    let mut selected: Vec<Selected> = rows
        .into_iter()
        .map(|row| Selected { row, reason: EliminationReason::BelowCutoff })
        .collect();

    if remaining_slots == 0 {
        return selected;
    }

    if remaining_slots >= tied.len() {
        selected.extend(
            tied.into_iter().map(|row| Selected { row, reason: EliminationReason::BelowCutoff }),
        );
        return selected;
    }

    selected.extend(break_tie(tied, remaining_slots, gameweek, seed_multiplier));
    selected
}

// `tied` is already in tie-break order because the full ranking sorts on the same keys
fn break_tie(
    mut tied: Vec<SnapshotRow>,
    slots: usize,
    gameweek: Gameweek,
    seed_multiplier: u64,
) -> Vec<Selected> {
    let boundary = tie_break_key(&tied[slots - 1]);
    if boundary != tie_break_key(&tied[slots]) {
        tied.truncate(slots);
        return tied
            .into_iter()
            .map(|row| Selected { row, reason: EliminationReason::TieBreak })
            .collect();
    }

    // Rows equal to the boundary key are contiguous
    let start = tied.iter().position(|row| tie_break_key(row) == boundary).unwrap_or(0);
    let end = tied.iter().rposition(|row| tie_break_key(row) == boundary).map_or(tied.len(), |i| i + 1);
    tied.truncate(end);
    let mut drawn = tied.split_off(start);

    let seed = tie_break_seed(gameweek, seed_multiplier);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    drawn.shuffle(&mut rng);
    drawn.truncate(slots - start);

    debug!(
        "Gameweek {}: {} entries still tied after tie-breaks, drawing {} with seed {}",
        gameweek,
        end - start,
        slots - start,
        seed
    );

    tied.into_iter()
        .map(|row| Selected { row, reason: EliminationReason::TieBreak })
        .chain(drawn.into_iter().map(|row| Selected { row, reason: EliminationReason::CoinToss }))
        .collect()
}
