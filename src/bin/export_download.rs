use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[path = "../storage/csv_store.rs"]
mod csv_store;

#[derive(Debug, Deserialize)]
struct ExportConfig {
    data: ExportSection,
}

#[derive(Debug, Deserialize)]
struct ExportSection {
    processed_path: PathBuf,
    export_file_name: String,
}

/// Renders the processed side file as the `;` separated download next to it.
fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "src/configs/dashboard.toml".to_string());
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read dashboard config file: {}", config_path))?;
    let config: ExportConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse dashboard config file: {}", config_path))?;

    let processed = &config.data.processed_path;
    if !processed.exists() {
        anyhow::bail!(
            "Processed file {} not found, run the dashboard pipeline first",
            processed.display()
        );
    }

    let artifact = csv_store::download_artifact(processed, &config.data.export_file_name)?;

    let target = processed
        .parent()
        .map(|dir| dir.join(&artifact.file_name))
        .unwrap_or_else(|| PathBuf::from(&artifact.file_name));

    // Same name as the processed file would clobber it
    let target = if target == *processed {
        target.with_file_name(format!("download_{}", artifact.file_name))
    } else {
        target
    };

    std::fs::write(&target, &artifact.bytes)
        .with_context(|| format!("Failed to write download file: {}", target.display()))?;

    info!(
        "Wrote {} ({}, {} bytes) to {}",
        artifact.file_name,
        artifact.mime,
        artifact.bytes.len(),
        target.display()
    );

    Ok(())
}
