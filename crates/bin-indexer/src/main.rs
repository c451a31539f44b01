//! BIN Indexer - range table ingestion tool

use std::process;

use anyhow::{Context, Result};
use bin_indexer::{
    config::Config,
    formats::Format,
    index::IntervalIndex,
    location::{Location, LocationIo},
    orchestrator::IngestionOrchestrator,
    reference::IsoTables,
    storage::{StorageBackend, Store},
};
use bin_indexer_common::logging::{init_logging, LogConfig, LogLevel};
use clap::Parser;
use tracing::{error, info, info_span};

#[derive(Parser, Debug)]
#[command(name = "bin-indexer")]
#[command(author, version, about = "Process BIN Account Range Tables")]
struct Cli {
    /// Format of the BIN file (redsys_3.8, mastercard_simplified)
    #[arg(short, long)]
    format: String,

    /// BIN file to ingest, local path or s3://bucket/key
    #[arg(short = 'p', long)]
    file_path: String,

    /// Record store (redis, memory)
    #[arg(short, long, default_value = "redis")]
    storage: String,

    /// Index output: file, directory, s3://bucket/key or s3://bucket/prefix/
    #[arg(short, long)]
    index: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over flags
    let log_config = match LogConfig::builder()
        .level(log_level)
        .log_file_prefix("bin-indexer")
        .build()
        .with_env_overrides()
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        },
    };

    let _guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        },
    };

    if let Err(e) = run(&cli).await {
        error!(error = %format!("{:#}", e), "Ingestion failed");
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let format: Format = cli.format.parse()?;
    let backend: StorageBackend = cli.storage.parse()?;
    let input = Location::parse(&cli.file_path)?;
    let output = Location::parse(&cli.index)?;

    let config = Config::load().context("Failed to load configuration")?;
    let descriptor = format.descriptor()?;

    let store = Store::connect(backend, &config.redis)
        .await
        .with_context(|| format!("Failed to open {} storage", backend))?;
    let io = LocationIo::new(config.s3);

    let span = info_span!("ingest", format = %format, storage = %backend);
    let mut orchestrator =
        IngestionOrchestrator::new(&descriptor, &store, IntervalIndex::new(), &IsoTables, span);

    let summary = orchestrator
        .run(&io, &input, &output)
        .await
        .with_context(|| format!("Failed to ingest {}", input))?;

    if let Some(reconciliation) = &summary.reconciliation {
        info!(reconciliation = %reconciliation, "Trailer reconciliation");
    }

    Ok(())
}
