#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Valor Lanes session in the terminal.

mod catalog;
mod render;
mod terminal;
mod transcript;

use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use valor_core::{Difficulty, GameConfig, HeroClass};
use valor_system_bootstrap::Bootstrap;
use valor_system_rounds::RoundScheduler;
use valor_world::query;

use crate::{terminal::Terminal, transcript::Transcript};

/// Offset separating the reinforcement stream from the board and dice seeds.
const SPAWN_SEED_OFFSET: u64 = 2;

/// Lane-based tactical combat between heroes and monsters.
#[derive(Debug, Parser)]
#[command(name = "valor", version, about)]
struct Args {
    /// Difficulty preset: easy, medium or hard.
    #[arg(long)]
    difficulty: Option<Difficulty>,
    /// Seed for the board, dice and reinforcements. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Hero classes in lane order, separated by commas.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "warrior,sorcerer,paladin"
    )]
    heroes: Vec<HeroClass>,
    /// TOML file with game settings; flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "warn")]
    log_level: String,
    /// Writes every event as a JSON line to this file.
    #[arg(long)]
    transcript: Option<PathBuf>,
    /// Stops after this many rounds if nobody has won.
    #[arg(long)]
    rounds: Option<u32>,
}

/// Entry point for the Valor Lanes command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let file = args
        .config
        .as_ref()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))
        })
        .transpose()?;
    let config = resolve_config(file.as_deref(), &args)?;
    let seed = config.seed.unwrap_or_default();

    let mut world = Bootstrap
        .assemble(config.clone(), &args.heroes)
        .context("failed to set up the board")?;
    println!("{}", Bootstrap.welcome_banner(&world));
    println!(
        "Difficulty {}, seed {seed}. Answer with the numbers shown; q quits.",
        config.difficulty
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut terminal = Terminal::new(stdin.lock(), stdout.lock(), catalog::catalog());
    if let Some(path) = &args.transcript {
        let file = File::create(path)
            .with_context(|| format!("failed to create transcript {}", path.display()))?;
        terminal = terminal.with_transcript(Transcript::new(Box::new(BufWriter::new(file))));
    }

    let mut scheduler = RoundScheduler::new(&config, seed.wrapping_add(SPAWN_SEED_OFFSET));
    match scheduler.play(&mut world, &mut terminal, args.rounds) {
        Ok(Some(winner)) => println!(
            "The {winner} are victorious in round {}.",
            query::round(&world)
        ),
        Ok(None) => println!("Round limit reached without a winner."),
        Err(error) if error.kind() == io::ErrorKind::Interrupted => println!("Farewell."),
        Err(error) => return Err(error).context("failed to read player input"),
    }
    terminal
        .finish()
        .context("failed to write the session transcript")
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level `{level}`"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

/// Merges the optional TOML settings with command-line overrides and fixes
/// the seed so the session can be replayed.
fn resolve_config(file: Option<&str>, args: &Args) -> Result<GameConfig> {
    let mut config: GameConfig = match file {
        Some(text) => toml::from_str(text).context("invalid game config")?,
        None => GameConfig::default(),
    };
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty;
    }
    config.seed = args.seed.or(config.seed).or_else(|| Some(rand::random()));
    tracing::debug!(?config, "configuration resolved");
    Ok(config)
}
