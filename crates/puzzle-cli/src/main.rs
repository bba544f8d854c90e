//! Terminal host for the puzzle engine.
//!
//! Every command prints JSON on stdout. Logs go to stderr, filtered by
//! `RUST_LOG` (default `warn`).

mod app;
mod storage;

use anyhow::Result;
use app::App;
use clap::{Parser, Subcommand};
use puzzle_core::{Clock, Difficulty, SystemClock};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use storage::{Environment, StorageConfig};
use tracing_subscriber::EnvFilter;

/// Seeded logic puzzles from the command line
#[derive(Parser)]
#[command(name = "puzzles")]
#[command(about = "Deterministic puzzle engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Storage backend: local, test or production
    #[arg(long, env = "PUZZLE_ENV", default_value = "local", global = true)]
    env: String,

    /// Directory for stats and saved sessions
    #[arg(long, env = "PUZZLE_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Mirror directory used in production
    #[arg(long, env = "PUZZLE_SYNC_DIR", global = true)]
    sync_dir: Option<PathBuf>,

    /// Player identity for mirrored records
    #[arg(long, env = "PUZZLE_PLAYER", default_value = "player", global = true)]
    player: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every game
    List,

    /// Print a puzzle without starting a session
    Generate {
        game: String,
        #[arg(long)]
        seed: Option<u32>,
        #[arg(short, long, default_value_t = 1)]
        difficulty: u8,
    },

    /// Abandon the saved session and start a new puzzle
    New {
        game: String,
        #[arg(short, long, default_value_t = 1)]
        difficulty: u8,
        #[arg(long)]
        seed: Option<u32>,
    },

    /// Resume (or start) a game and print it
    Show {
        game: String,
        #[arg(short, long, default_value_t = 1)]
        difficulty: u8,
    },

    /// Apply one action to the current puzzle, given as JSON
    Act { game: String, action: String },

    /// Read actions from stdin, one JSON object per line
    Play {
        game: String,
        #[arg(short, long, default_value_t = 1)]
        difficulty: u8,
    },

    /// Back to the initial state of the current puzzle
    Reset { game: String },

    /// Ask for a hint
    Hint { game: String },

    /// Show stats for one game or all of them
    Stats { game: Option<String> },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StorageConfig {
        env: Environment::from_name(&cli.env),
        data_dir: cli.data_dir.unwrap_or_else(StorageConfig::default_data_dir),
        sync_dir: cli.sync_dir,
        player: cli.player,
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = storage::create_store(&config, clock.clone())?;
    let app = App::new(store, clock);

    let output = match cli.command {
        Command::List => app.list(),
        Command::Generate { game, seed, difficulty } => app.generate(&game, seed, Difficulty::new(difficulty))?,
        Command::New { game, difficulty, seed } => app.new_puzzle(&game, Difficulty::new(difficulty), seed)?,
        Command::Show { game, difficulty } => app.show(&game, Difficulty::new(difficulty))?,
        Command::Act { game, action } => app.act(&game, &action)?,
        Command::Play { game, difficulty } => {
            let stdin = std::io::stdin();
            return app.play(&game, Difficulty::new(difficulty), stdin.lock(), std::io::stdout());
        }
        Command::Reset { game } => app.reset(&game)?,
        Command::Hint { game } => app.hint(&game)?,
        Command::Stats { game } => app.stats(game.as_deref())?,
    };
    print(&output)
}

fn print(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
