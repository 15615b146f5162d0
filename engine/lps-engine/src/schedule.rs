//! Elimination schedule for the season

use crate::models::Gameweek;

/// Number of gameweeks in a season
pub const SEASON_GAMEWEEKS: Gameweek = 38;

/// Number of entries eliminated in a gameweek.
///
/// Gameweek 1 is a free week, the cut is heaviest mid-season and tapers off to
/// one per week for the run-in. Anything outside the season yields 0.
pub fn eliminations_for_gameweek(gameweek: Gameweek) -> usize {
    match gameweek {
        2..=6 => 2,
        7..=27 => 3,
        28..=35 => 2,
        36..=38 => 1,
        _ => 0,
    }
}

/// First gameweek after `after` with eliminations scheduled, and its count
pub fn next_elimination_gameweek(after: Gameweek) -> Option<(Gameweek, usize)> {
    (after.saturating_add(1).max(1)..=SEASON_GAMEWEEKS)
        .map(|gameweek| (gameweek, eliminations_for_gameweek(gameweek)))
        .find(|(_, count)| *count > 0)
}

/// Total eliminations scheduled from gameweek 1 through `target`
pub fn scheduled_eliminations_through(target: Gameweek) -> usize {
    (1..=target.min(SEASON_GAMEWEEKS)).map(eliminations_for_gameweek).sum()
}
