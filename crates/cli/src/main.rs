mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use coursesync_core::{
    DEFAULT_CONCURRENCY, DEFAULT_STORE_TIMEOUT_SECS, Registry, env_parse_with_default,
};
use coursesync_fetch::{CourseFeedClient, FetchSettings};
use coursesync_service::{Orchestrator, SyncService};
use coursesync_storage::StorageBackend;
use tracing_subscriber::EnvFilter;

use crate::config::StoreConfig;

/// Exit status for configuration problems detected before any work starts.
const EXIT_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(name = "coursesync", version)]
#[command(about = "Sync motorcycle safety course availability into a course store", long_about = None)]
struct Cli {
    /// Institution registry JSON file; the bundled registry is used when omitted
    #[arg(long, env = "COURSESYNC_REGISTRY")]
    registry: Option<PathBuf>,

    /// Institutions processed at once (defaults to COURSESYNC_CONCURRENCY, then 1)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Sync into an in-memory store; no credentials needed and nothing is persisted
    #[arg(long)]
    dry_run: bool,
}

fn load_registry(path: Option<&PathBuf>) -> Result<Registry> {
    let registry = match path {
        Some(path) => Registry::from_path(path)?,
        None => Registry::bundled()?,
    };
    Ok(registry)
}

async fn open_store(config: Option<StoreConfig>, store_timeout: Duration) -> Result<StorageBackend> {
    let store = match config {
        None => StorageBackend::new_memory(),
        Some(StoreConfig::Postgres { url }) => StorageBackend::new_postgres(&url).await?,
        Some(StoreConfig::Rest { url, key }) => StorageBackend::new_rest(&url, key, store_timeout)?,
    };
    tracing::info!(backend = store.kind(), "course store ready");
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let store_config = if cli.dry_run {
        None
    } else {
        match StoreConfig::from_env() {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(ExitCode::from(EXIT_CONFIG));
            },
        }
    };

    let registry = load_registry(cli.registry.as_ref())?;
    let concurrency = cli
        .concurrency
        .unwrap_or_else(|| env_parse_with_default("COURSESYNC_CONCURRENCY", DEFAULT_CONCURRENCY));
    let store_timeout = Duration::from_secs(
        env_parse_with_default("COURSESYNC_STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT_SECS).max(1),
    );

    let store = Arc::new(open_store(store_config, store_timeout).await?);
    let fetcher = CourseFeedClient::new(&FetchSettings::from_env())?;
    let sync = SyncService::new(store).with_store_timeout(store_timeout);
    let orchestrator = Orchestrator::new(fetcher, sync).with_concurrency(concurrency);

    let cancel = orchestrator.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, no further institutions will be started");
            cancel.store(true, Ordering::Release);
        }
    });

    println!("{}", "=".repeat(80));
    println!("Course availability sync{}", if cli.dry_run { " (dry run)" } else { "" });
    println!("{}", "=".repeat(80));

    let report = orchestrator.run(&registry).await;

    println!("{}", "=".repeat(80));
    println!("{}", report.summary);
    Ok(ExitCode::SUCCESS)
}
