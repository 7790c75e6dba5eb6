//! # hoover-cli
//!
//! Command-line entry point (C13): `migrate` provisions the columnar and
//! search-engine schemas, `add_disk_dataset` registers a dataset and runs
//! the pipeline end to end, and `worker` runs either a single worker type
//! in-process or, with no argument, the supervisor that keeps the full
//! worker topology alive.

mod commands;
mod context;
mod supervisor;
mod worker;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use worker::WorkerQueue;

#[derive(Parser)]
#[command(name = "hoover4", about = "Forensic content ingestion and indexing pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the columnar store schema, the search engine schema, and
    /// confirm the object store bucket is reachable.
    Migrate,
    /// Register a disk-backed dataset and run the pipeline from scratch.
    AddDiskDataset { name: String, path: PathBuf },
    /// Run a single worker type in-process, or the supervisor if no queue
    /// is given.
    Worker { queue: Option<WorkerQueue> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("HOOVER4_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = hoover_config::Config::load().unwrap_or_else(|error| {
        tracing::warn!(%error, "failed to load config, falling back to defaults");
        hoover_config::Config::default()
    });

    match cli.command {
        Commands::Migrate => commands::migrate(&config).await,
        Commands::AddDiskDataset { name, path } => commands::add_disk_dataset(&config, &name, &path).await,
        Commands::Worker { queue: Some(queue) } => worker::run_worker(queue).await,
        Commands::Worker { queue: None } => {
            supervisor::run_supervisor(config.workers.worker_count_common).await
        }
    }
}
