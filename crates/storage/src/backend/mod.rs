//! Storage backend trait and implementations.
//!
//! The [`StorageBackend`] trait is the only way the commit pipeline touches
//! the destination tree, which lets a dry run swap in [`ReadOnlyBackend`] and
//! lets tests inject failures with `MockBackend`.

mod local;
#[cfg(feature = "mock")]
mod mock;
mod ro;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Unified interface for destination storage.
///
/// # Path Handling
/// Destination paths are relative to the storage root and must be validated
/// using [`validate_path`](crate::validate_path) before use. Implementations
/// enforce this validation. Source paths are absolute paths on the local
/// filesystem and are only ever read.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use movr_storage::{backend::StorageBackend, error::{ErrorKind, Result}};
///
/// async fn commit_once(backend: &dyn StorageBackend, source: &Path) -> Result<bool> {
///     backend.create_dir_all(Path::new("Headshots")).await?;
///     match backend.copy_new(source, Path::new("Headshots/IMG.jpg")).await {
///         Ok(_) => Ok(true),
///         Err(err) if matches!(&*err, ErrorKind::AlreadyExists(_)) => Ok(false),
///         Err(err) => Err(err),
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend (used for logging only).
    fn name(&self) -> &str;

    /// Check if a file or directory exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a directory and all missing parents.
    ///
    /// Idempotent: succeeds if the directory already exists, but fails if
    /// something that isn't a directory is in the way.
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copy the bytes of a local `source` file to `path`, returning the
    /// number of bytes written.
    ///
    /// Never overwrites: returns
    /// [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) if `path`
    /// is already taken. The parent directory must already exist.
    async fn copy_new(&self, source: &Path, path: &Path) -> Result<u64>;
}
