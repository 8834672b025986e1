#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless cubesnake sessions.

mod config;
mod runner;
mod script;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cubesnake_core::{Controller, SessionMode};

use crate::{
    config::GameConfig,
    runner::{RunOptions, Summary},
    script::KeyScript,
};

#[derive(Parser, Debug)]
#[command(
    name = "cubesnake",
    version,
    about = "Run a headless 3D snake session and report the outcome"
)]
struct Cli {
    /// TOML configuration file; built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Actors participating in the session.
    #[arg(long, value_enum, default_value_t = ModeArg::Versus)]
    mode: ModeArg,

    /// Simulated seconds to run before stopping.
    #[arg(long, default_value_t = 60)]
    seconds: u64,

    /// Simulated duration of one frame in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Player keys, one per move: w s a d e q, 1 and 2 switch strategy, `.` idles.
    #[arg(long, default_value = "")]
    keys: String,

    /// Let the autopilot drive the player as well.
    #[arg(long)]
    demo: bool,

    /// Overrides the rival pilot seed from the config file.
    #[arg(long)]
    rival_seed: Option<u64>,

    /// Overrides the food placement seed from the config file.
    #[arg(long)]
    food_seed: Option<u64>,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Player only.
    Classic,
    /// Player against a computer-controlled rival.
    Versus,
}

impl From<ModeArg> for SessionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Classic => SessionMode::Classic,
            ModeArg::Versus => SessionMode::VersusRival,
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Entry point for the cubesnake command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.rival_seed {
        config.rival.seed = seed;
    }
    if let Some(seed) = cli.food_seed {
        config.food.seed = seed;
    }

    let script = KeyScript::parse(&cli.keys).context("failed to parse --keys")?;
    let options = RunOptions {
        mode: cli.mode.into(),
        player_controller: if cli.demo {
            Controller::Autopilot
        } else {
            Controller::Keyboard
        },
        duration: Duration::from_secs(cli.seconds),
        frame: Duration::from_millis(cli.frame_ms.max(1)),
    };

    let summary = runner::run(&config, &options, script);
    if cli.json {
        let rendered =
            serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
        println!("{rendered}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!(
        "{:?} session: {} frames, {} ms simulated",
        summary.mode, summary.frames, summary.simulated_ms
    );
    println!(
        "arena half extent {}, player speed {}, rival speed {}{}",
        summary.arena.half_extent,
        summary.arena.player_speed,
        summary.arena.rival_speed,
        if summary.arena.reverse_on_eat {
            ", reverse on eat"
        } else {
            ""
        },
    );
    match summary.end_cause {
        Some(cause) => println!("game over: {cause:?}"),
        None => println!("player still alive"),
    }
    println!(
        "food eaten: {}, turns dropped: {}",
        summary.food_eaten, summary.turns_dropped
    );
    for actor in &summary.actors {
        let status = match actor.crash {
            Some(collision) => format!("crashed ({collision:?})"),
            None if actor.alive => "alive".to_owned(),
            None => "stopped".to_owned(),
        };
        println!(
            "actor {} [{:?}]: score {}, length {}, head ({}, {}, {}), {status}",
            actor.id,
            actor.controller,
            actor.score,
            actor.length,
            actor.head.x(),
            actor.head.y(),
            actor.head.z(),
        );
    }
}
