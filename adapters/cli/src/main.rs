#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Outpost matches and inspects snapshots.

mod digest;
mod snapshot_transfer;

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use outpost_system_skirmish::{Skirmish, Strategy};
use outpost_world::{
    config::GameConfig,
    generation::{generate, AWAY_TEAM, HOME_TEAM},
    query::team_view,
    snapshot::Snapshot,
    Game,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "outpost=info";

#[derive(Debug, Parser)]
#[command(name = "outpost", about = "Turn-based grid skirmish engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a board and play two baseline strategies against each other.
    Run(RunArgs),
    /// Print a summary of a snapshot file, transfer string or stdin (`-`).
    Inspect {
        /// Snapshot JSON file, transfer string file, or `-` for stdin.
        source: String,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// TOML match configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the board generator seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the turn limit.
    #[arg(long)]
    turns: Option<u32>,
    /// Mirror every turn into a replica and compare snapshot digests.
    #[arg(long)]
    replica: bool,
    /// Writes the final snapshot as JSON.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Prints the final snapshot as a transfer string.
    #[arg(long)]
    export: bool,
}

/// Entry point for the Outpost command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(&args),
        Commands::Inspect { source } => inspect(&source),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(args: &RunArgs) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(turns) = args.turns {
        config.max_turns = turns;
    }
    config.validate().context("invalid match configuration")?;
    Ok(config)
}

fn run(args: &RunArgs) -> Result<()> {
    let config = load_config(args)?;
    let mut game = generate(&config).context("failed to generate board")?;
    let mut replica = if args.replica {
        Some(Game::from_snapshot(&game.snapshot()).context("failed to build replica")?)
    } else {
        None
    };
    info!(
        seed = config.seed,
        width = config.width,
        height = config.height,
        max_turns = config.max_turns,
        "match started"
    );

    let mut home = Skirmish::default();
    let mut away = Skirmish::default();
    loop {
        let mut commands = home.commands(&team_view(&game, HOME_TEAM));
        commands.extend(away.commands(&team_view(&game, AWAY_TEAM)));
        let Some(actions) = game.execute_turn(&commands) else {
            break;
        };
        let turn = game.turn();

        if let Some(replica) = replica.as_mut() {
            replica
                .import_turn(turn, actions)
                .with_context(|| format!("replica rejected turn {turn}"))?;
            let expected = digest::snapshot_digest(&game.snapshot())?;
            let actual = digest::snapshot_digest(&replica.snapshot())?;
            if expected != actual {
                bail!("replica diverged at turn {turn}: {actual} != {expected}");
            }
            debug!(turn, digest = %expected, "replica in sync");
        }
    }

    print_summary(&game);
    if replica.is_some() {
        println!("replica matched every turn");
    }

    let snapshot = game.snapshot();
    if let Some(path) = &args.output {
        let json =
            serde_json::to_string_pretty(&snapshot).context("failed to serialise snapshot")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
        info!(path = %path.display(), "snapshot written");
    }
    if args.export {
        println!("{}", snapshot_transfer::encode(&snapshot)?);
    }
    Ok(())
}

fn inspect(source: &str) -> Result<()> {
    let contents = read_source(source)?;
    let trimmed = contents.trim();
    let snapshot: Snapshot = if trimmed.starts_with(snapshot_transfer::SNAPSHOT_HEADER) {
        snapshot_transfer::decode(trimmed).context("failed to decode transfer string")?
    } else {
        serde_json::from_str(trimmed).context("failed to parse snapshot JSON")?
    };
    let game = Game::from_snapshot(&snapshot).context("snapshot describes an invalid game")?;

    print_summary(&game);
    println!("digest {}", digest::snapshot_digest(&snapshot)?);
    Ok(())
}

fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut buffer = String::new();
        let _ = io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read snapshot from stdin")?;
        return Ok(buffer);
    }
    let path = Path::new(source);
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_summary(game: &Game) {
    println!(
        "board {}x{}, turn {}/{}, population cap {}",
        game.width(),
        game.height(),
        game.turn(),
        game.max_turns(),
        game.max_pop()
    );
    for team in game.teams() {
        let headquarters = game
            .headquarters(team.id())
            .map_or_else(|| "destroyed".to_owned(), |unit| format!("{} hp", unit.hp()));
        println!(
            "team {} ({}): food {}, headquarters {}, citizens {}, fighters {}",
            team.id(),
            team.color(),
            team.food_count(),
            headquarters,
            game.citizens(team.id()).count(),
            game.fighters(team.id()).count()
        );
    }
    println!(
        "walls {}, loose food {}",
        game.walls().count(),
        game.loose_food_cells().len()
    );

    if game.is_over() {
        match game.winner() {
            Some(team) => println!("team {team} wins"),
            None => println!("draw"),
        }
    } else {
        println!("in progress");
    }
}
