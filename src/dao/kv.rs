//! Client-local key-value namespace backing every store.
//!
//! Each logical store owns one key whose value is the JSON document for its
//! full collection; mutations rewrite the value wholesale, last-writer-wins.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::{fs, sync::RwLock};
use tracing::warn;

use crate::dao::storage::{StorageError, StorageResult};

/// Abstraction over the persistence layer for store collections.
pub trait KvBackend: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>>;
    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: Value) -> BoxFuture<'static, StorageResult<()>>;
    /// Drop the value stored under `key`; absent keys are a no-op.
    fn remove(&self, key: &str) -> BoxFuture<'static, StorageResult<()>>;
}

#[derive(Clone)]
/// File-backed namespace holding every key in one JSON document on disk.
pub struct FileBackend {
    path: Arc<PathBuf>,
    cells: Arc<RwLock<IndexMap<String, Value>>>,
}

impl FileBackend {
    /// Open the blob at `path`, creating parent directories as needed.
    ///
    /// A missing document starts the namespace empty; an unreadable one is
    /// logged and replaced on the next write.
    pub async fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|source| {
                    StorageError::unavailable(
                        format!("could not create `{}`", parent.display()),
                        source,
                    )
                })?;
            }
        }

        let cells = match fs::read_to_string(path).await {
            Ok(contents) => match serde_json::from_str::<IndexMap<String, Value>>(&contents) {
                Ok(map) => map,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "persisted blob unreadable; starting with an empty namespace"
                    );
                    IndexMap::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => IndexMap::new(),
            Err(source) => {
                return Err(StorageError::unavailable(
                    format!("could not read `{}`", path.display()),
                    source,
                ));
            }
        };

        Ok(Self {
            path: Arc::new(path.to_path_buf()),
            cells: Arc::new(RwLock::new(cells)),
        })
    }

    async fn flush(path: &Path, cells: &IndexMap<String, Value>) -> StorageResult<()> {
        let payload = serde_json::to_vec_pretty(cells)
            .map_err(|source| StorageError::encode(path.display().to_string(), source))?;
        fs::write(path, payload).await.map_err(|source| {
            StorageError::unavailable(format!("could not write `{}`", path.display()), source)
        })
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let cells = Arc::clone(&self.cells);
        let key = key.to_owned();
        Box::pin(async move {
            let guard = cells.read().await;
            Ok(guard.get(&key).cloned())
        })
    }

    fn put(&self, key: &str, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        let cells = Arc::clone(&self.cells);
        let path = Arc::clone(&self.path);
        let key = key.to_owned();
        Box::pin(async move {
            let mut guard = cells.write().await;
            guard.insert(key, value);
            Self::flush(&path, &guard).await
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'static, StorageResult<()>> {
        let cells = Arc::clone(&self.cells);
        let path = Arc::clone(&self.path);
        let key = key.to_owned();
        Box::pin(async move {
            let mut guard = cells.write().await;
            if guard.shift_remove(&key).is_none() {
                return Ok(());
            }
            Self::flush(&path, &guard).await
        })
    }
}

#[derive(Clone, Default)]
/// In-memory namespace; nothing survives the process. Used by tests and as a
/// throwaway backend when no durability is wanted.
pub struct MemoryBackend {
    cells: Arc<RwLock<IndexMap<String, Value>>>,
}

impl MemoryBackend {
    /// Create an empty in-memory namespace.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let cells = Arc::clone(&self.cells);
        let key = key.to_owned();
        Box::pin(async move {
            let guard = cells.read().await;
            Ok(guard.get(&key).cloned())
        })
    }

    fn put(&self, key: &str, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        let cells = Arc::clone(&self.cells);
        let key = key.to_owned();
        Box::pin(async move {
            let mut guard = cells.write().await;
            guard.insert(key, value);
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'static, StorageResult<()>> {
        let cells = Arc::clone(&self.cells);
        let key = key.to_owned();
        Box::pin(async move {
            let mut guard = cells.write().await;
            guard.shift_remove(&key);
            Ok(())
        })
    }
}
