use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster_pulse::api::state::AppState;
use roster_pulse::config::AppConfig;
use roster_pulse::fetch::{HttpSource, SnapshotSource};
use roster_pulse::models::{Manifest, ManifestDataset, ManifestSnapshot};
use roster_pulse::normalize::AdapterRegistry;
use roster_pulse::storage::{write_json, LocalSource, StorageConfig};
use roster_pulse::worker::{run_job, WorkerRequest, WorkerResponse};

#[derive(Parser)]
#[command(name = "roster-pulse")]
#[command(about = "Guild roster snapshot analytics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List datasets in the manifest
    Datasets {
        /// Read from a static host instead of the data directory
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Compute analytics for one dataset
    Compute {
        /// Dataset ID
        #[arg(long)]
        dataset: String,

        /// Read from a static host instead of the data directory
        #[arg(long)]
        base_url: Option<String>,

        /// Write the result here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Fetch and normalize every snapshot of a dataset without computing
    Validate {
        /// Dataset ID
        #[arg(long)]
        dataset: String,

        /// Read from a static host instead of the data directory
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!("Starting roster-pulse v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Datasets { base_url } => {
            let source = build_source(&config, base_url.as_deref())?;
            let manifest = source.load_manifest().await?;

            if manifest.datasets.is_empty() {
                println!("No datasets in manifest.");
            }
            for dataset in &manifest.datasets {
                println!(
                    "{:<24} {:<16} {:>4} snapshots  {}",
                    dataset.id,
                    dataset.format,
                    manifest.snapshots_for(dataset.id.as_str()).len(),
                    dataset.label
                );
            }
        }
        Commands::Compute {
            dataset,
            base_url,
            out,
            pretty,
        } => {
            let source = build_source(&config, base_url.as_deref())?;
            let manifest = source.load_manifest().await?;
            let (dataset, snapshots) = select_dataset(&manifest, &dataset)?;

            let request = WorkerRequest {
                dataset_id: dataset.id.clone(),
                format: dataset.format.clone(),
                snapshots,
            };
            let (tx, mut rx) = mpsc::unbounded_channel();
            let job = tokio::spawn(run_job(
                request,
                source,
                Arc::new(AdapterRegistry::default()),
                config.engine.clone(),
                tx,
            ));

            let mut outcome = None;
            while let Some(response) = rx.recv().await {
                match response {
                    WorkerResponse::Progress { message } => eprintln!("{}", message),
                    terminal => outcome = Some(terminal),
                }
            }
            job.await?;

            let result = match outcome {
                Some(WorkerResponse::Result { payload, .. }) => payload,
                Some(WorkerResponse::Error { error }) => bail!(error),
                _ => bail!("Job ended without a result"),
            };

            match out {
                Some(path) => write_json(&path, result.as_ref(), pretty).await?,
                None if pretty => println!("{}", serde_json::to_string_pretty(&result)?),
                None => println!("{}", serde_json::to_string(&result)?),
            }
        }
        Commands::Validate { dataset, base_url } => {
            let source = build_source(&config, base_url.as_deref())?;
            let manifest = source.load_manifest().await?;
            let (dataset, snapshots) = select_dataset(&manifest, &dataset)?;

            let registry = AdapterRegistry::default();
            let adapter = registry.require(&dataset.format)?;

            let mut failures = 0;
            for snapshot in &snapshots {
                let normalized = match source.fetch_snapshot(snapshot).await {
                    Ok(raw) => adapter.normalize(&raw, snapshot).map_err(anyhow::Error::from),
                    Err(e) => Err(e.into()),
                };
                match normalized {
                    Ok(normalized) => println!(
                        "ok    {:<24} {:>3} guilds {:>5} members  {}",
                        snapshot.id,
                        normalized.guilds.len(),
                        normalized.member_count(),
                        snapshot.label
                    ),
                    Err(e) => {
                        failures += 1;
                        println!("FAIL  {:<24} {}", snapshot.id, e);
                    }
                }
            }

            if failures > 0 {
                bail!("{} of {} snapshots failed validation", failures, snapshots.len());
            }
            println!("All {} snapshots valid.", snapshots.len());
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let source = build_source(&config, None)?;
            let state = AppState::from_source(
                source,
                Arc::new(AdapterRegistry::default()),
                config.engine.clone(),
            )
            .await?;
            let app = roster_pulse::api::build_router(state, &config.server.cors_origin);

            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

/// HTTP source when a base URL is given (flag, then config), otherwise the
/// local data directory.
fn build_source(config: &AppConfig, base_url: Option<&str>) -> Result<Arc<dyn SnapshotSource>> {
    match base_url.or(config.source.base_url.as_deref()) {
        Some(url) => Ok(Arc::new(HttpSource::new(url, &config.source)?)),
        None => Ok(Arc::new(LocalSource::new(StorageConfig::new(
            config.data_dir.clone(),
        )))),
    }
}

/// Look up a dataset and its snapshots, rejecting ones that cannot be
/// computed.
fn select_dataset(manifest: &Manifest, id: &str) -> Result<(ManifestDataset, Vec<ManifestSnapshot>)> {
    let Some(dataset) = manifest.dataset(id) else {
        bail!("Unknown dataset {}", id);
    };
    if dataset.format == "custom-raw" {
        bail!("Custom parsing not configured.");
    }
    let snapshots = manifest.snapshots_for(id);
    if snapshots.is_empty() {
        bail!("No snapshots found for this dataset.");
    }
    Ok((dataset.clone(), snapshots))
}
