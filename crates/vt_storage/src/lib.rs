use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vt_core::{ArticleStorage, Result};

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: ArticleStorage {
    fn get_error_message() -> &'static str
    where
        Self: Sized;

    async fn new() -> Result<Self>
    where
        Self: Sized;
}

/// Which persistence backend the pipeline writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    #[default]
    Sqlite,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => write!(f, "memory"),
            StorageKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Opens the requested backend. `path` is only used by file-backed stores.
pub async fn open_storage(kind: StorageKind, path: Option<&Path>) -> Result<Arc<dyn ArticleStorage>> {
    match kind {
        StorageKind::Memory => Ok(Arc::new(InMemoryStorage::new())),
        StorageKind::Sqlite => open_sqlite(path).await,
    }
}

#[cfg(feature = "sqlite")]
async fn open_sqlite(path: Option<&Path>) -> Result<Arc<dyn ArticleStorage>> {
    let opened = match path {
        Some(path) => SQLiteStorage::new_with_path(path).await,
        None => <SQLiteStorage as StorageBackend>::new().await,
    };
    let storage = opened.map_err(|e| {
        vt_core::Error::storage(format!("{} ({})", SQLiteStorage::get_error_message(), e))
    })?;
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "sqlite"))]
async fn open_sqlite(_path: Option<&Path>) -> Result<Arc<dyn ArticleStorage>> {
    Err(vt_core::Error::storage(
        "sqlite storage requires the `sqlite` feature of vt_storage",
    ))
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{open_storage, StorageBackend, StorageKind};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_storage() {
        let storage = open_storage(StorageKind::Memory, None).await.unwrap();
        assert!(storage.load_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_storage_kind_display() {
        assert_eq!(StorageKind::Memory.to_string(), "memory");
        assert_eq!(StorageKind::default(), StorageKind::Sqlite);
    }
}
