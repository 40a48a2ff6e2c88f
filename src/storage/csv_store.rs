use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] PolarsError),
}

/// The cleaned table as offered to dashboard users.
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

pub const DOWNLOAD_SEPARATOR: u8 = b';';

/// Reads a comma separated file keeping every column as text, so values
/// survive a read/write cycle untouched.
pub fn read_csv_as_text(path: &Path) -> Result<DataFrame, StorageError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );

    Ok(df)
}

/// Writes `df` next to `path` under a unique temporary name and renames it
/// into place. Readers never observe a half-written file.
pub fn write_csv_atomic(
    df: &mut DataFrame,
    path: &Path,
    separator: u8,
) -> Result<(), StorageError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|source| StorageError::Io {
        path: parent.clone(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "data.csv".to_string());
    let tmp_path = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    let result = write_csv(df, &tmp_path, separator).and_then(|_| {
        fs::rename(&tmp_path, path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })
    });

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result?;

    info!("Persisted {} rows to {}", df.height(), path.display());
    Ok(())
}

fn write_csv(df: &mut DataFrame, path: &Path, separator: u8) -> Result<(), StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(io_err)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(separator)
        .finish(df)?;
    file.sync_all().map_err(io_err)?;

    Ok(())
}

/// Serializes a frame into an in-memory CSV buffer.
pub fn csv_bytes(df: &mut DataFrame, separator: u8) -> Result<Vec<u8>, StorageError> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(separator)
        .finish(df)?;
    Ok(buf)
}

/// Re-reads the persisted cleaned file and renders it `;` separated.
pub fn download_artifact(
    processed_path: &Path,
    file_name: &str,
) -> Result<DownloadArtifact, StorageError> {
    let mut df = read_csv_as_text(processed_path)?;
    let bytes = csv_bytes(&mut df, DOWNLOAD_SEPARATOR)?;

    Ok(DownloadArtifact {
        file_name: file_name.to_string(),
        mime: "text/csv",
        bytes,
    })
}
