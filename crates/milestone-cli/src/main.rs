//! `milestone` -- keep an event registry in a JSON snapshot file.
//!
//! Each invocation hydrates a registry from the snapshot file, runs one
//! operation, and writes the snapshot back if the operation changed
//! anything. Every change notification is logged, so the tool doubles as a
//! way to watch what a game would see from its subscribers.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration from `milestone-config.yaml` (defaults if absent)
//! 3. Initialize structured logging (tracing)
//! 4. Load the snapshot file and hydrate the registry
//! 5. Subscribe the change logger
//! 6. Run the command, persist, print the result

mod commands;
mod config;
mod error;
mod store;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use milestone_events::EventRegistry;
use milestone_types::EventRecord;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use crate::config::{LoggingConfig, MilestoneConfig};
use crate::store::SnapshotFile;

/// Milestone - namespaced event counters with change notification
#[derive(Debug, Parser)]
#[command(name = "milestone", version, about, propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "milestone-config.yaml")]
    config: PathBuf,

    /// Snapshot file (overrides config and environment)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Namespace for keyed operations (default namespace if omitted)
    #[arg(short, long, global = true, default_value = "")]
    namespace: String,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = MilestoneConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(path) = &cli.snapshot {
        config.snapshot.path.clone_from(path);
    }

    init_logging(&config.logging);

    let file = SnapshotFile::new(&config.snapshot.path, config.snapshot.pretty);
    info!(
        config = %cli.config.display(),
        snapshot = %file.path().display(),
        namespace = %cli.namespace,
        "milestone starting"
    );

    let snapshot = file.load().context("loading snapshot")?;
    let mut registry = EventRegistry::from_snapshot(snapshot);
    if config.logging.log_changes {
        registry.subscribe(log_change);
    }

    let output = cli
        .command
        .execute(&mut registry, &cli.namespace)
        .context("running command")?;

    if cli.command.is_mutating() {
        file.save(&registry.export_snapshot())
            .context("saving snapshot")?;
    }

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Install the global tracing subscriber, writing to stderr so command
/// output on stdout stays machine-readable.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Registry subscriber that logs each change.
fn log_change(record: &EventRecord) {
    info!(
        key = %record.key,
        namespace = %record.namespace,
        value = record.value,
        "Event changed"
    );
}
