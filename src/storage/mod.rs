pub mod csv_store;
pub mod table_cache;

pub use csv_store::{DownloadArtifact, StorageError};
pub use table_cache::TableCache;
