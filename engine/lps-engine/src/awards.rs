//! Gameweek Slammers: the week's top scorers with tie-aware medals

use serde::{Deserialize, Serialize};

use crate::models::{EntryId, SnapshotRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// Medal for a tie group starting at this 1-based position
    fn for_position(position: usize) -> Option<Self> {
        match position {
            1 => Some(Medal::Gold),
            2 => Some(Medal::Silver),
            3 => Some(Medal::Bronze),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlammerRow {
    /// Table position, 1-based
    pub position: usize,
    pub entry_id: EntryId,
    pub manager_name: String,
    pub team_name: String,
    pub gameweek_points: i64,
    pub total_points: i64,
    pub medal: Option<Medal>,
}

/// Rank by gameweek net points, then season total, and hand out medals.
///
/// Entries tied on gameweek points share the medal of the position their group
/// starts at, and the group consumes that many positions: a two-way tie for
/// first takes gold and the next group starts at third.
pub fn gameweek_slammers(mut rows: Vec<SnapshotRow>) -> Vec<SlammerRow> {
    rows.sort_by(|a, b| {
        b.score
            .net_points
            .cmp(&a.score.net_points)
            .then_with(|| {
                b.participant.overall_total_points.cmp(&a.participant.overall_total_points)
            })
    });

    let mut table = Vec::with_capacity(rows.len());
    let mut group_start = 1;
    let mut previous: Option<i64> = None;

    for (index, row) in rows.into_iter().enumerate() {
        let position = index + 1;
        if previous != Some(row.score.net_points) {
            group_start = position;
            previous = Some(row.score.net_points);
        }

        table.push(SlammerRow {
            position,
            entry_id: row.participant.entry_id,
            manager_name: row.participant.manager_name,
            team_name: row.participant.team_name,
            gameweek_points: row.score.net_points,
            total_points: row.participant.overall_total_points,
            medal: Medal::for_position(group_start),
        });
    }

    table
}
