#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays an AstroBots match to completion.

mod roster;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use astrobots_core::{ArenaConfig, WELCOME_BANNER};
use astrobots_system_turn::{Match, Outcome};
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "astrobots", about = "Play a headless AstroBots match")]
struct Args {
    /// TOML file overriding arena defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Turn limit, overriding the configuration.
    #[arg(long)]
    max_turns: Option<u32>,
    /// Random seed, overriding the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Print the state string after every turn.
    #[arg(long)]
    states: bool,
}

/// Entry point for the AstroBots command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => settings::load(path)?,
        None => ArenaConfig::default(),
    };
    if let Some(max_turns) = args.max_turns {
        config.max_turns = max_turns;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    println!("{WELCOME_BANNER}");
    let roster = roster::default_roster();
    let sink = |line: &str| println!("{line}");
    let mut game = Match::new(config, &roster, sink).context("failed to set up the match")?;

    while !game.is_over() {
        game.step();
        if args.states {
            println!("{}", game.state_string());
        }
    }

    if let Some(Outcome::Win(ship)) = game.outcome() {
        let name = game
            .ship_names()
            .find_map(|(id, name)| (id == ship).then_some(name))
            .unwrap_or("unknown");
        info!(ship = ship.get(), %name, turn = game.turn(), "match won");
    }
    println!("{}", game.state_string());
    Ok(())
}
