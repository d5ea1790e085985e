//! Read-only storage backend.
//!
//! Wraps another backend for dry runs: reads are passed through, writes are
//! logged and reported as successful without touching the inner backend.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::{BackendHandle, StorageBackend, error::Result, path::validate as validate_path};

/// Read-only storage backend.
///
/// Wraps another backend and silently drops all write operations, logging an
/// [`info event`](tracing::Event). Paths that *would* have been written are
/// remembered, so [`exists`](StorageBackend::exists) answers as if the writes
/// had happened and a dry run predicts the same renames a real run would
/// make.
pub struct ReadOnlyBackend {
    inner: BackendHandle,
    pretend: RwLock<HashSet<PathBuf>>,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner, pretend: RwLock::default() }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let validated = validate_path(path)?;
        if self.pretend.read().await.contains(&validated) {
            return Ok(true);
        }
        self.inner.exists(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        let validated = validate_path(path)?;
        tracing::info!(path = %validated.display(), "Skipping directory creation during read-only mode");
        self.pretend.write().await.insert(validated);
        Ok(())
    }

    async fn copy_new(&self, source: &Path, path: &Path) -> Result<u64> {
        let validated = validate_path(path)?;
        if self.exists(&validated).await? {
            exn::bail!(crate::error::ErrorKind::AlreadyExists(validated));
        }
        let bytes = tokio::fs::metadata(source)
            .await
            .map_err(|e| crate::error::ErrorKind::from_io(e, source))?
            .len();
        tracing::info!(source = %source.display(), path = %validated.display(), bytes, "Skipping copy during read-only mode");
        self.pretend.write().await.insert(validated);
        Ok(bytes)
    }
}
