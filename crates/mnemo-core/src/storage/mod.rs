//! Card storage backends.

mod memory;
mod sqlite;

use std::sync::Arc;

pub use memory::MemoryCardStore;
pub use sqlite::SqliteCardStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::MnemoResult;
use crate::traits::CardStore;

/// Open the backend named by the configuration.
pub fn open_store(config: &StorageConfig) -> MnemoResult<Arc<dyn CardStore>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryCardStore::new())),
        StorageBackend::Sqlite => {
            if let Some(parent) = config.db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Ok(Arc::new(SqliteCardStore::new(&config.db_path)?))
        }
    }
}
