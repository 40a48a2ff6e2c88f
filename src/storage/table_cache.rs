use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;
use tracing::{debug, info};

use crate::processor::{CleanError, CleanedTable, DataCleaner};

/// Identity of the raw source as seen on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceFingerprint {
    pub fn of(path: &Path) -> Result<Self, CleanError> {
        let metadata =
            fs::metadata(path).map_err(|_| CleanError::SourceNotFound(path.to_path_buf()))?;

        Ok(SourceFingerprint {
            path: path.to_path_buf(),
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

struct CacheEntry {
    fingerprint: SourceFingerprint,
    table: Arc<CleanedTable>,
    cleaned_at: DateTime<Utc>,
}

/// Cleans the raw source once and hands the same table to every view until
/// the source file changes. Cleaning, and with it the side file write, only
/// ever happens while holding the cache lock.
pub struct TableCache {
    source: PathBuf,
    cleaner: DataCleaner,
    entry: Mutex<Option<CacheEntry>>,
}

impl TableCache {
    pub fn new(source: impl Into<PathBuf>, cleaner: DataCleaner) -> Self {
        TableCache {
            source: source.into(),
            cleaner,
            entry: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, Option<CacheEntry>> {
        // a failed clean never stores an entry
        self.entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_or_clean(&self) -> Result<Arc<CleanedTable>, CleanError> {
        let fingerprint = SourceFingerprint::of(&self.source)?;
        let mut entry = self.lock();

        if let Some(cached) = entry.as_ref() {
            if cached.fingerprint == fingerprint {
                debug!("Serving cleaned table cached at {}", cached.cleaned_at);
                return Ok(Arc::clone(&cached.table));
            }
            info!("Source {} changed, cleaning again", self.source.display());
        }

        let table = Arc::new(self.cleaner.clean(&self.source)?);
        *entry = Some(CacheEntry {
            fingerprint,
            table: Arc::clone(&table),
            cleaned_at: Utc::now(),
        });

        Ok(table)
    }

    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    pub fn cleaned_at(&self) -> Option<DateTime<Utc>> {
        self.lock().as_ref().map(|entry| entry.cleaned_at)
    }
}
