//! Arena CLI — run bot-vs-bot games from the command line.
//!
//! Usage:
//!   cargo run --release --bin arena -- --games 100 --players 4
//!   cargo run --release --bin arena -- --games 50 --strategies greedy,random,greedy,random
//!   cargo run --release --bin arena -- --profiles bot_profiles.toml

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use rayon::prelude::*;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use citadels_engine::bot::{strategy_from_name, BotDriver, Strategy};
use citadels_engine::engine::{GameConfig, GameEngine, Move};

#[derive(Parser)]
#[command(name = "arena", about = "Run bot-vs-bot games of the city-building card game")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Base random seed; game i uses seed + i
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of seats at the table (4-7)
    #[arg(long, default_value = "4")]
    players: usize,

    /// Comma-separated strategy per seat: "greedy" or "random".
    /// A short list wraps around the table.
    #[arg(long, default_value = "greedy", value_delimiter = ',')]
    strategies: Vec<String>,

    /// TOML file with a `strategies` array; overrides --strategies
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Step budget per game before a run is declared stalled
    #[arg(long, default_value = "5000")]
    max_steps: usize,
}

#[derive(Debug, Deserialize)]
struct ProfilesFile {
    strategies: Vec<String>,
}

struct GameOutcome {
    winner: Option<String>,
    scores: Vec<(String, u32)>,
    steps: usize,
    completed: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    if !(4..=7).contains(&cli.players) {
        return Err("the table seats between 4 and 7 players".into());
    }

    let names = match &cli.profiles {
        Some(path) => {
            let file: ProfilesFile = toml::from_str(&std::fs::read_to_string(path)?)?;
            file.strategies
        }
        None => cli.strategies.clone(),
    };
    if names.is_empty() {
        return Err("at least one strategy is required".into());
    }
    for name in &names {
        if strategy_from_name(name).is_none() {
            return Err(format!("unknown strategy {name:?}").into());
        }
    }
    let seat_names: Vec<String> = (0..cli.players)
        .map(|seat| format!("seat{seat}:{}", names[seat % names.len()]))
        .collect();

    tracing::info!(
        games = cli.games,
        players = cli.players,
        strategies = ?names,
        "starting arena run"
    );
    let started = std::time::Instant::now();

    let outcomes: Vec<GameOutcome> = (0..cli.games)
        .into_par_iter()
        .map(|i| {
            play_one(
                cli.seed + i as u64,
                cli.players,
                &names,
                &seat_names,
                cli.max_steps,
            )
        })
        .collect();

    print_summary(&outcomes, &seat_names, started.elapsed());
    Ok(())
}

fn play_one(
    seed: u64,
    players: usize,
    strategy_names: &[String],
    seat_names: &[String],
    max_steps: usize,
) -> GameOutcome {
    let mut engine = GameEngine::new(GameConfig {
        random_seed: Some(seed),
    });
    for name in seat_names.iter().take(players) {
        engine
            .add_player(name.clone(), true)
            .expect("lobby accepts up to seven seats");
    }
    engine
        .apply(0, &Move::StartGame)
        .expect("a full lobby can always start");

    let strategies: Vec<Box<dyn Strategy>> = (0..players)
        .map(|seat| {
            strategy_from_name(&strategy_names[seat % strategy_names.len()])
                .expect("strategy names are validated up front")
        })
        .collect();

    let report = BotDriver::new(max_steps).run_to_completion(&mut engine, &strategies);
    let standings = &engine.state().standings;
    let winner = match standings.as_slice() {
        [] => None,
        [first] => Some(first.name.clone()),
        [first, second, ..] if first.score == second.score => None,
        [first, ..] => Some(first.name.clone()),
    };

    GameOutcome {
        winner,
        scores: standings.iter().map(|s| (s.name.clone(), s.score)).collect(),
        steps: report.steps,
        completed: report.completed,
    }
}

fn print_summary(outcomes: &[GameOutcome], seat_names: &[String], elapsed: std::time::Duration) {
    let games = outcomes.len();
    let mut wins: HashMap<&str, usize> = HashMap::new();
    let mut scores: HashMap<&str, Vec<u32>> = HashMap::new();
    let mut draws = 0;
    let mut stalled = 0;
    let mut total_steps = 0usize;

    for outcome in outcomes {
        match &outcome.winner {
            Some(name) => *wins.entry(name.as_str()).or_default() += 1,
            None if outcome.completed => draws += 1,
            None => {}
        }
        if !outcome.completed {
            stalled += 1;
        }
        for (name, score) in &outcome.scores {
            scores.entry(name.as_str()).or_default().push(*score);
        }
        total_steps += outcome.steps;
    }

    println!("Arena results ({games} games, {:.1}s)", elapsed.as_secs_f64());
    println!("{}", "=".repeat(60));
    for name in seat_names {
        let won = wins.get(name.as_str()).copied().unwrap_or(0);
        let avg = scores
            .get(name.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.iter().sum::<u32>() as f64 / s.len() as f64)
            .unwrap_or(0.0);
        println!(
            "  {name:>16}: {won:4} wins ({:5.1}%)  avg score {avg:5.1}",
            won as f64 * 100.0 / games.max(1) as f64,
        );
    }
    println!("  {:>16}: {draws}", "draws");
    if stalled > 0 {
        println!("  {:>16}: {stalled}", "stalled");
    }
    println!(
        "  {:>16}: {:.0}",
        "avg steps",
        total_steps as f64 / games.max(1) as f64
    );
}
