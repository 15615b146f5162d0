use lps_engine::{CompletedGameweeks, EntryId, Gameweek, Participant, UNRANKED};
use serde::{Deserialize, Serialize};

/// One page of `leagues-classic/{id}/standings/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsResponse {
    pub standings: StandingsPage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandingsPage {
    #[serde(default)]
    pub has_next: bool,

    #[serde(default)]
    pub page: u32,

    #[serde(default)]
    pub results: Vec<StandingRow>,
}

/// A single manager row in a classic league table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingRow {
    /// Entry (team) ID
    pub entry: EntryId,

    /// Team name
    #[serde(default)]
    pub entry_name: String,

    /// Manager name
    #[serde(default)]
    pub player_name: String,

    /// Position in the league table
    #[serde(default)]
    pub rank: Option<u64>,

    /// Season total points
    #[serde(default)]
    pub total: Option<i64>,
}

impl StandingRow {
    /// Convert to the engine's participant, ranking unranked rows last
    pub fn to_participant(&self) -> Participant {
        Participant {
            entry_id: self.entry,
            manager_name: self.player_name.clone(),
            team_name: self.entry_name.clone(),
            overall_rank: self.rank.unwrap_or(UNRANKED),
            overall_total_points: self.total.unwrap_or(0),
        }
    }
}

/// The parts of `bootstrap-static/` the engine needs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapStatic {
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Gameweek,

    #[serde(default)]
    pub finished: bool,

    #[serde(default)]
    pub deadline_time: Option<String>,
}

impl BootstrapStatic {
    pub fn completed_gameweeks(&self) -> CompletedGameweeks {
        CompletedGameweeks::new(self.events.iter().filter(|e| e.finished).map(|e| e.id))
    }
}
