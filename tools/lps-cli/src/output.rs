//! Plain-text rendering for CLI output

use colored::*;
use lps_engine::{
    eliminations_for_gameweek, EliminationOutcome, EliminationReason, Gameweek, GameweekStatus, LeagueSummary,
    Medal, ScheduledElimination, ScoreSource, SlammerRow, SEASON_GAMEWEEKS,
};

pub fn schedule_rows() -> Vec<ScheduledElimination> {
    (1..=SEASON_GAMEWEEKS)
        .map(|gameweek| ScheduledElimination { gameweek, eliminations: eliminations_for_gameweek(gameweek) })
        .collect()
}

pub fn schedule_lines(rows: &[ScheduledElimination]) -> Vec<String> {
    let mut lines = vec![format!("{}", "Elimination schedule".bold())];
    lines.extend(rows.iter().map(|row| format!("GW{:>2}  {}", row.gameweek, row.eliminations)));
    let total: usize = rows.iter().map(|row| row.eliminations).sum();
    lines.push(format!("Total  {total}"));
    lines
}

fn reason_label(reason: EliminationReason) -> &'static str {
    match reason {
        EliminationReason::BelowCutoff => "lowest score",
        EliminationReason::TieBreak => "tie-break",
        EliminationReason::CoinToss => "draw",
    }
}

fn status_label(status: GameweekStatus) -> &'static str {
    match status {
        GameweekStatus::Completed => "completed",
        GameweekStatus::NothingScheduled => "no eliminations scheduled",
        GameweekStatus::ContestDecided => "contest decided",
        GameweekStatus::SnapshotUnavailable => "scores unavailable",
    }
}

pub fn elimination_lines(outcome: &EliminationOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "{} league {} through GW{}",
        "Last Person Standing".bold(),
        outcome.league_id,
        outcome.target_gameweek
    )];

    for (gameweek, event) in &outcome.log {
        if event.is_empty() {
            lines.push(format!("GW{gameweek}: {}", status_label(event.status)));
            continue;
        }
        lines.push(format!(
            "GW{gameweek}: {} of {} out ({} survivors before)",
            event.eliminated.len(),
            event.scheduled,
            event.survivors_before
        ));
        for entry in &event.eliminated {
            let fallback = match entry.score_source {
                ScoreSource::Fallback => " [score unavailable]",
                ScoreSource::Provider => "",
            };
            lines.push(format!(
                "  {}. {} ({}) {} pts ({} raw, -{}) rank {}, {}{}",
                entry.elimination_order,
                entry.manager_name,
                entry.team_name,
                entry.score.net_points,
                entry.score.raw_points,
                entry.score.minus_points,
                entry.overall_rank,
                reason_label(entry.reason),
                fallback
            ));
        }
    }

    match outcome.winner() {
        Some(winner) => lines.push(format!(
            "{} {} ({})",
            "Winner:".green().bold(),
            winner.manager_name,
            winner.team_name
        )),
        None => lines.push(format!("{} survivors remaining", outcome.survivors.len())),
    }
    lines
}

fn medal_label(medal: Option<Medal>) -> String {
    match medal {
        Some(Medal::Gold) => "Gold".yellow().bold().to_string(),
        Some(Medal::Silver) => "Silver".white().bold().to_string(),
        Some(Medal::Bronze) => "Bronze".red().to_string(),
        None => String::new(),
    }
}

pub fn slammer_lines(gameweek: Gameweek, rows: &[SlammerRow]) -> Vec<String> {
    let mut lines = vec![format!("{} GW{gameweek}", "Gameweek Slammers".bold())];
    lines.extend(rows.iter().map(|row| {
        format!(
            "{:>3}. {} ({}) {} pts, {} total {}",
            row.position,
            row.manager_name,
            row.team_name,
            row.gameweek_points,
            row.total_points,
            medal_label(row.medal)
        )
        .trim_end()
        .to_string()
    }));
    lines
}

pub fn summary_lines(summary: &LeagueSummary) -> Vec<String> {
    let mut lines = vec![format!("Total managers: {}", summary.total_managers)];
    if let Some(leader) = &summary.leader {
        lines.push(format!(
            "Current leader: {} ({}) {} pts",
            leader.manager_name, leader.team_name, leader.overall_total_points
        ));
    }
    if let Some(gameweek) = summary.latest_finished_gameweek {
        lines.push(format!("Latest finished gameweek: {gameweek}"));
    }
    match &summary.next_elimination {
        Some(next) => lines.push(format!(
            "LPS schedule: {} eliminations in GW{}",
            next.eliminations, next.gameweek
        )),
        None => lines.push("LPS schedule: no eliminations scheduled".to_string()),
    }
    lines
}
