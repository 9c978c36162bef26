//! keepinv - death-inventory retention harness
//!
//! Loads the retention configuration, then plays a scripted death/respawn
//! scenario against simulated players.

mod commands;
mod scenario;

use anyhow::{Context, Result};
use keepinv_retention::{
    KeepInventory, PreferenceStore, RetentionConfig, DEFAULT_CONFIG_PATH,
    DEFAULT_PREFERENCES_PATH,
};
use keepinv_testkit::JsonlSink;
use scenario::{Scenario, ScenarioRunner};
use std::{env, path::PathBuf};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting keepinv v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    if cli.help {
        print_usage();
        return Ok(());
    }

    let config = RetentionConfig::load_async(&cli.config).await;
    let preferences = if config.persist_player_settings {
        PreferenceStore::load_from_path(&cli.prefs).with_context(|| {
            format!("Failed to load preferences from {}", cli.prefs.display())
        })?
    } else {
        PreferenceStore::new()
    };
    let service = KeepInventory::with_preferences(preferences);
    let config = service.install_config(config);

    let Some(script) = cli.script else {
        println!("{}", serde_json::to_string_pretty(&*config)?);
        return Ok(());
    };

    let events = cli.events.map(JsonlSink::create).transpose()?;
    let scenario = Scenario::from_path(&script)?;
    let mut runner = ScenarioRunner::new(&service, events);
    let summary = runner.run(&scenario)?;

    for line in &summary.command_lines {
        println!("{line}");
    }
    println!(
        "deaths={} retained={} restores={} failures={}",
        summary.deaths, summary.retained, summary.restores, summary.failures
    );

    if config.persist_player_settings {
        service
            .preferences()
            .save_to_path(&cli.prefs)
            .with_context(|| format!("Failed to save preferences to {}", cli.prefs.display()))?;
    }
    let pending = service.snapshots().len();
    if pending > 0 {
        warn!(pending, "discarding snapshots of players who never respawned");
    }
    service.clear_all_snapshots();
    Ok(())
}

struct CliOptions {
    config: PathBuf,
    prefs: PathBuf,
    script: Option<PathBuf>,
    events: Option<PathBuf>,
    help: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            prefs: PathBuf::from(DEFAULT_PREFERENCES_PATH),
            script: None,
            events: None,
            help: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config = PathBuf::from(path);
                    } else {
                        tracing::error!("--config requires a file path");
                    }
                }
                "--prefs" => {
                    if let Some(path) = args.next() {
                        opts.prefs = PathBuf::from(path);
                    } else {
                        tracing::error!("--prefs requires a file path");
                    }
                }
                "--script" => {
                    if let Some(path) = args.next() {
                        opts.script = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--script requires a file path");
                    }
                }
                "--events" => {
                    if let Some(path) = args.next() {
                        opts.events = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--events requires a file path");
                    }
                }
                "--help" | "-h" => opts.help = true,
                other => tracing::warn!("Unknown argument: {other}"),
            }
        }

        opts
    }
}

fn print_usage() {
    println!("Usage: keepinv [--config <path>] [--prefs <path>] [--script <path>] [--events <path>]");
    println!("  --config   retention config TOML (default {DEFAULT_CONFIG_PATH})");
    println!("  --prefs    persisted player preferences (default {DEFAULT_PREFERENCES_PATH})");
    println!("  --script   JSON death/respawn scenario to run");
    println!("  --events   write hook outcomes as JSONL");
}
