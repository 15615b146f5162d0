use serde::{Deserialize, Serialize};

use crate::models::{Gameweek, Participant};
use crate::schedule::next_elimination_gameweek;

/// Next gameweek with eliminations on the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledElimination {
    pub gameweek: Gameweek,
    pub eliminations: usize,
}

/// League overview shown before drilling into eliminations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueSummary {
    pub total_managers: usize,
    pub leader: Option<Participant>,
    pub latest_finished_gameweek: Option<Gameweek>,
    pub next_elimination: Option<ScheduledElimination>,
}

impl LeagueSummary {
    pub fn new(standings: &[Participant], latest_finished_gameweek: Option<Gameweek>) -> Self {
        let leader = standings.iter().min_by_key(|p| p.overall_rank).cloned();
        let next_elimination = next_elimination_gameweek(latest_finished_gameweek.unwrap_or(0))
            .map(|(gameweek, eliminations)| ScheduledElimination { gameweek, eliminations });

        Self { total_managers: standings.len(), leader, latest_finished_gameweek, next_elimination }
    }
}
