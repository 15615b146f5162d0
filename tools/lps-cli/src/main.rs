//! Last Person Standing CLI
//!
//! Commands:
//! - schedule: elimination counts per gameweek
//! - eliminations: replay the contest through a gameweek
//! - slammers: a gameweek's top scorers
//! - summary: league size, leader and next elimination

mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fpl_fetcher::{FplClient, FplConfig};
use lps_engine::{
    CachedProvider, EliminationEngine, Gameweek, InMemoryProvider, LeagueDataProvider, LpsConfig,
};

#[derive(Parser)]
#[command(name = "lps")]
#[command(about = "Last Person Standing elimination tracker for a fantasy league")]
#[command(version)]
struct Cli {
    /// Classic league ID, overrides configuration
    #[arg(long, global = true)]
    league: Option<u64>,

    /// Read league data from a JSON fixture instead of the live API
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scheduled eliminations per gameweek
    Schedule,

    /// Eliminations from gameweek 1 through the given gameweek
    Eliminations {
        #[arg(short, long)]
        gameweek: Gameweek,
    },

    /// Top scorers for a gameweek
    Slammers {
        #[arg(short, long)]
        gameweek: Gameweek,
    },

    /// League summary and next scheduled elimination
    Summary,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = LpsConfig::load(cli.config.as_deref())?;
    if let Some(league_id) = cli.league {
        config.league.league_id = league_id;
    }
    let league_id = config.league.league_id;

    match cli.command {
        Commands::Schedule => {
            emit(cli.json, &output::schedule_rows(), |rows| output::schedule_lines(rows))
        }
        Commands::Eliminations { gameweek } => {
            let outcome = build_engine(cli.fixture.as_deref(), &config)?
                .compute_eliminations_through(league_id, gameweek)
                .await
                .with_context(|| format!("Failed to compute eliminations through gameweek {gameweek}"))?;
            emit(cli.json, &outcome, output::elimination_lines)
        }
        Commands::Slammers { gameweek } => {
            let table = build_engine(cli.fixture.as_deref(), &config)?
                .gameweek_slammers(league_id, gameweek)
                .await
                .with_context(|| format!("Failed to build gameweek {gameweek} slammers"))?;
            emit(cli.json, &table, |rows| output::slammer_lines(gameweek, rows))
        }
        Commands::Summary => {
            let summary = build_engine(cli.fixture.as_deref(), &config)?
                .league_summary(league_id)
                .await
                .with_context(|| format!("Failed to summarize league {league_id}"))?;
            emit(cli.json, &summary, output::summary_lines)
        }
    }
}

fn build_engine(fixture: Option<&Path>, config: &LpsConfig) -> anyhow::Result<EliminationEngine> {
    let provider: Arc<dyn LeagueDataProvider> = match fixture {
        Some(path) => {
            info!("Using fixture {}", path.display());
            Arc::new(InMemoryProvider::from_json_file(path)?)
        }
        None => Arc::new(FplClient::new(FplConfig::from_env()?)?),
    };
    let provider = Arc::new(CachedProvider::new(provider, config.cache.clone()));
    Ok(EliminationEngine::new(provider, config.engine.clone())?)
}

fn emit<T: Serialize>(json: bool, value: &T, lines: impl Fn(&T) -> Vec<String>) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        for line in lines(value) {
            println!("{line}");
        }
    }
    Ok(())
}
