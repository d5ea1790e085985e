//! Local filesystem storage backend.
//!
//! Files are stored beneath a configured destination directory and accessed
//! through `tokio::fs` for async I/O.

use crate::error::ErrorKind;
use crate::{StorageBackend, error::Result, path::validate as validate_path};
use async_trait::async_trait;
use std::fs::create_dir_all as sync_create_dir;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Local filesystem storage backend.
///
/// All paths are relative to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use movr_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("local", "/Volumes/Studio/Deliveries")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    /// Destination root
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend, creating the root directory if
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, or exists and is not a
    /// directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            // Only happens once per run; not worth making the constructor async.
            sync_create_dir(&root).map_err(|e| ErrorKind::from_io(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates the path and joins it with the root directory.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::create_dir_all(&abs_path).await.map_err(|e| ErrorKind::from_io(e, path))?)
    }

    async fn copy_new(&self, source: &Path, path: &Path) -> Result<u64> {
        let abs_path = self.absolute_path(path)?;
        let mut reader = fs::File::open(source).await.map_err(|e| ErrorKind::from_io(e, source))?;
        // `create_new` makes the existence check and the creation a single
        // atomic step, so a file that appeared since the caller last looked
        // is still never overwritten.
        let mut writer = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&abs_path)
            .await
            .map_err(|e| ErrorKind::from_io(e, path))?;
        let copied = async {
            let bytes = tokio::io::copy(&mut reader, &mut writer).await?;
            writer.flush().await?;
            writer.sync_all().await?;
            Ok::<_, std::io::Error>(bytes)
        }
        .await;
        match copied {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                // The file was created by this call, so it is ours to remove.
                drop(writer);
                if let Err(cleanup) = fs::remove_file(&abs_path).await {
                    tracing::warn!(path = %abs_path.display(), error = %cleanup, "Could not remove partial copy");
                }
                exn::bail!(ErrorKind::from_io(err, path))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn source_file(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_new_requires_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("name", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("name", "relative/path").is_err());
        assert!(LocalBackend::new("name", "./relative").is_err());
    }

    #[test]
    fn test_new_creates_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("deliveries/2024");
        let backend = LocalBackend::new("name", &root).unwrap();
        assert!(root.is_dir());
        assert_eq!(backend.root(), root);
    }

    #[test]
    fn test_new_rejects_file_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = source_file(&temp_dir, "not-a-dir", b"x");
        assert!(LocalBackend::new("name", file).is_err());
    }

    #[test]
    fn test_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let expected = temp_dir.path().join("Headshots/IMG.jpg");
        assert_eq!(backend.absolute_path(Path::new("Headshots/IMG.jpg")).unwrap(), expected);
        assert!(backend.absolute_path(Path::new("../etc/passwd")).is_err());
    }

    #[tokio::test]
    async fn test_create_dir_all_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let folder = Path::new("Product Photographer > Master Images – Lifestyle");
        backend.create_dir_all(folder).await.unwrap();
        backend.create_dir_all(folder).await.unwrap();
        assert!(temp_dir.path().join(folder).is_dir());
        assert!(backend.exists(folder).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_dir_all_blocked_by_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        source_file(&temp_dir, "Product Images", b"in the way");
        assert!(backend.create_dir_all(Path::new("Product Images")).await.is_err());
    }

    #[tokio::test]
    async fn test_copy_new() {
        let sources = tempfile::tempdir().unwrap();
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let source = source_file(&sources, "raw.jpg", b"pixels");
        backend.create_dir_all(Path::new("Headshots")).await.unwrap();
        let bytes = backend.copy_new(&source, Path::new("Headshots/IMG.jpg")).await.unwrap();
        assert_eq!(bytes, 6);
        assert_eq!(std::fs::read(temp_dir.path().join("Headshots/IMG.jpg")).unwrap(), b"pixels");
        // Source is untouched.
        assert_eq!(std::fs::read(&source).unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn test_copy_new_never_overwrites() {
        let sources = tempfile::tempdir().unwrap();
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let first = source_file(&sources, "first.jpg", b"first");
        let second = source_file(&sources, "second.jpg", b"second");
        backend.copy_new(&first, Path::new("IMG.jpg")).await.unwrap();
        let err = backend.copy_new(&second, Path::new("IMG.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        assert_eq!(std::fs::read(temp_dir.path().join("IMG.jpg")).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_copy_new_missing_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let err = backend.copy_new(&temp_dir.path().join("nope.jpg"), Path::new("IMG.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        assert!(!backend.exists(Path::new("IMG.jpg")).await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_new_missing_parent() {
        let sources = tempfile::tempdir().unwrap();
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let source = source_file(&sources, "raw.jpg", b"pixels");
        let err = backend.copy_new(&source, Path::new("Headshots/IMG.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_path_security() {
        let sources = tempfile::tempdir().unwrap();
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let source = source_file(&sources, "raw.jpg", b"pixels");
        assert!(backend.exists(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.create_dir_all(Path::new("../escape")).await.is_err());
        assert!(backend.copy_new(&source, Path::new("a/../../escape.jpg")).await.is_err());
    }
}
