use anyhow::{Context, Result};
use config::DashboardConfig;
use processor::{CleanerSettings, DataCleaner};
use std::env;
use storage::TableCache;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod models;
mod processor;
mod report;
mod storage;

const DEFAULT_CONFIG_PATH: &str = "src/configs/dashboard.toml";

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // First positional argument overrides the bundled config
    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = DashboardConfig::from_file(&config_path)
        .with_context(|| format!("Failed to load dashboard configuration from {}", config_path))?;

    info!(
        "Loaded dashboard configuration: raw={} processed={}",
        config.data.raw_path.display(),
        config.data.processed_path.display()
    );

    let cleaner = DataCleaner::new(CleanerSettings {
        processed_path: config.data.processed_path.clone(),
        constant_column: config.data.constant_column.clone(),
    })?;
    let cache = TableCache::new(config.data.raw_path.clone(), cleaner);

    let table = cache
        .get_or_clean()
        .with_context(|| format!("Failed to clean {}", config.data.raw_path.display()))?;

    if table.is_empty() {
        warn!("Cleaned table is empty, every page will render without data");
    }

    if let Some(cleaned_at) = cache.cleaned_at() {
        info!("Cleaned {} restaurants at {}", table.len(), cleaned_at.to_rfc3339());
    }

    println!("Cleaned table preview:\n{}", table.display_frame()?.head(Some(5)));

    for page in config::Page::ALL {
        match config.default_countries(page) {
            Some(countries) => info!("{} page opens with countries {:?}", page, countries),
            None => info!("{} page opens with every country", page),
        }
    }

    let snapshot = report::build_snapshot(&config, &table)?;
    report::print_snapshot(&snapshot);

    if let Some(path) = &config.data.snapshot_path {
        report::write_snapshot(&snapshot, path)?;
    }

    let artifact = storage::csv_store::download_artifact(
        &config.data.processed_path,
        &config.data.export_file_name,
    )?;
    info!(
        "Download ready: {} ({}, {} bytes)",
        artifact.file_name,
        artifact.mime,
        artifact.bytes.len()
    );

    info!("Dashboard pipeline completed");
    Ok(())
}
