//! roomsim - headless driver for the tile-room simulation engine
//!
//! Loads a room from a pack, steps it for a fixed number of ticks and writes
//! the room events it emits to a JSONL log.

mod config;
mod headless;

use anyhow::Result;
use config::{SimConfig, DEFAULT_CONFIG_PATH};
use std::{env, path::PathBuf};
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting roomsim v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    if cli.help {
        print_usage();
        return Ok(());
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut cfg = SimConfig::load_from_path(&config_path);
    cli.apply(&mut cfg);

    let summary = headless::run(&cfg)?;
    println!(
        "room {} story {}: {} ticks, {} events, {} occupied cells",
        summary.room,
        summary.story,
        summary.ticks,
        summary.events.values().sum::<usize>(),
        summary.occupied_cells
    );
    Ok(())
}

fn print_usage() {
    println!(
        "usage: roomsim [--config PATH] [--pack PATH] [--room N] [--story N] [--ticks N]\n\
         \x20              [--seed N] [--events PATH] [--summary PATH] [--replay N] [--apprentice]"
    );
}

#[derive(Debug, Default)]
struct CliOptions {
    help: bool,
    config: Option<PathBuf>,
    pack: Option<PathBuf>,
    room: Option<u16>,
    story: Option<u16>,
    ticks: Option<u64>,
    seed: Option<u64>,
    events: Option<PathBuf>,
    summary: Option<PathBuf>,
    replay: Option<usize>,
    apprentice: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => opts.help = true,
                "--apprentice" => opts.apprentice = true,
                "--config" => opts.config = path_arg(&arg, args.next()),
                "--pack" => opts.pack = path_arg(&arg, args.next()),
                "--events" => opts.events = path_arg(&arg, args.next()),
                "--summary" => opts.summary = path_arg(&arg, args.next()),
                "--room" => opts.room = number_arg(&arg, args.next()),
                "--story" => opts.story = number_arg(&arg, args.next()),
                "--ticks" => opts.ticks = number_arg(&arg, args.next()),
                "--seed" => opts.seed = number_arg(&arg, args.next()),
                "--replay" => opts.replay = number_arg(&arg, args.next()),
                other => tracing::warn!(arg = other, "Ignoring unknown argument"),
            }
        }

        opts
    }

    fn apply(&self, cfg: &mut SimConfig) {
        if let Some(pack) = &self.pack {
            cfg.pack = Some(pack.clone());
        }
        if let Some(room) = self.room {
            cfg.room = room;
        }
        if let Some(story) = self.story {
            cfg.story = story;
        }
        if let Some(ticks) = self.ticks {
            cfg.ticks = ticks;
        }
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(events) = &self.events {
            cfg.events = Some(events.clone());
        }
        if let Some(summary) = &self.summary {
            cfg.summary = Some(summary.clone());
        }
        if let Some(replay) = self.replay {
            cfg.replay = Some(replay);
        }
        cfg.apprentice |= self.apprentice;
    }
}

fn path_arg(flag: &str, value: Option<String>) -> Option<PathBuf> {
    if value.is_none() {
        tracing::error!("{flag} requires a path");
    }
    value.map(PathBuf::from)
}

fn number_arg<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let Some(raw) = value else {
        tracing::error!("{flag} requires an integer");
        return None;
    };
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!(%err, value = %raw, "{flag} must be an integer");
            None
        }
    }
}
