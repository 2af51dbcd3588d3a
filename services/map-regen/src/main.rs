//! Story density map regeneration service.
//!
//! Renders one translucent marker per postal prefix with approved stories
//! onto the basemap and publishes the PNG:
//! - `--once` regenerates a single time and exits non-zero on failure
//! - otherwise watches the record store and regenerates on each new
//!   approval, coalescing bursts into one follow-up run

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use map_common::GeographicBoundingBox;
use tokio::sync::broadcast;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use map_regen::{
    run_watcher, JsonFileStore, LocationSource, RegenConfig, RegenerationQueue, Regenerator,
    StoreWatcher,
};

#[derive(Parser, Debug)]
#[command(name = "map-regen")]
#[command(about = "Regenerates the story density map")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "MAP_REGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Regenerate once and exit
    #[arg(long)]
    once: bool,

    /// Published PNG path
    #[arg(short, long, env = "MAP_OUTPUT_PATH")]
    output: Option<PathBuf>,

    /// Postal-code CSV
    #[arg(long, env = "MAP_DATASET_PATH")]
    dataset: Option<PathBuf>,

    /// Basemap image
    #[arg(long, env = "MAP_BASEMAP_PATH")]
    basemap: Option<PathBuf>,

    /// JSON export of story records
    #[arg(long, env = "MAP_RECORDS_PATH")]
    records: Option<PathBuf>,

    /// Mapped region as north,south,east,west
    #[arg(long)]
    bbox: Option<String>,

    /// Seed for marker radius jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn apply(&self, config: &mut RegenConfig) -> Result<()> {
        if let Some(output) = &self.output {
            config.paths.output = output.clone();
        }
        if let Some(dataset) = &self.dataset {
            config.paths.dataset = dataset.clone();
        }
        if let Some(basemap) = &self.basemap {
            config.paths.basemap = basemap.clone();
        }
        if let Some(records) = &self.records {
            config.store.records = records.clone();
        }
        if let Some(bbox) = &self.bbox {
            config.region.bbox = GeographicBoundingBox::from_csv_string(bbox)
                .with_context(|| format!("invalid --bbox '{}'", bbox))?;
        }
        if self.seed.is_some() {
            config.markers.seed = self.seed;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if args.json_logs {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let mut config = match &args.config {
        Some(path) => RegenConfig::load(path)?,
        None => RegenConfig::default(),
    };
    args.apply(&mut config)?;

    info!(
        dataset = %config.paths.dataset.display(),
        basemap = %config.paths.basemap.display(),
        output = %config.paths.output.display(),
        records = %config.store.records.display(),
        "Starting density map regeneration service"
    );

    let source: Arc<dyn LocationSource> = Arc::new(JsonFileStore::new(&config.store.records));
    let poll_interval = config.store.poll_interval();
    let regenerator = Arc::new(Regenerator::new(config, source.clone())?);

    if args.once {
        info!("Running single regeneration");
        let summary = regenerator
            .regenerate()
            .await
            .context("regeneration failed")?;
        info!(
            markers = summary.markers_drawn,
            unresolved = summary.unresolved,
            out_of_range = summary.out_of_range,
            "Single regeneration complete"
        );
        return Ok(());
    }

    let queue = Arc::new(RegenerationQueue::start(regenerator));

    // Existing records are already on the map once the first run finishes
    let mut watcher = StoreWatcher::new(source);
    match watcher.prime().await {
        Ok(count) => info!(records = count, "Primed store watcher"),
        Err(e) => error!(error = %e, "Could not read record store, all records will count as new"),
    }
    queue.trigger();

    // Shutdown signal
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Handle Ctrl+C
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown_tx_clone.send(()).ok();
    });

    run_watcher(watcher, queue.clone(), poll_interval, shutdown_tx.subscribe()).await;
    queue.shutdown().await;

    if let Some(outcome) = queue.last_outcome() {
        info!(success = outcome.is_success(), "Last regeneration outcome");
    }

    Ok(())
}
