//! In-memory storage backend for testing.

use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::StorageBackend;

/// In-memory storage backend for testing.
///
/// Files and directories live behind [`RwLock`]s, so all trait methods can
/// operate on `&self` without external synchronisation. Source files are
/// still read from the real filesystem.
///
/// Any path under a prefix registered with
/// [`deny`](MockBackend::deny) fails with
/// [`PermissionDenied`](ErrorKind::PermissionDenied), which is how tests
/// simulate an unwritable destination folder.
///
/// # Examples
///
/// ```
/// use movr_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([("Headshots/IMG.jpg", b"taken")]).deny("Product Images");
/// assert!(backend.exists(Path::new("Headshots/IMG.jpg")).await?);
/// assert!(backend.create_dir_all(Path::new("Product Images")).await.is_err());
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
    directories: RwLock<HashSet<PathBuf>>,
    denied: Vec<PathBuf>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files (and their parent
    /// directories).
    ///
    /// Panics if any path fails validation. If test setup is wrong, then the
    /// test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        let mut directories = HashSet::new();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                panic!("MockBackend::with_files: invalid path {}", path.display());
            };
            directories.extend(validated.ancestors().skip(1).filter(|p| !p.as_os_str().is_empty()).map(Path::to_path_buf));
            map.insert(validated, data.into());
        }
        Self {
            name: "mock".to_string(),
            files: RwLock::new(map),
            directories: RwLock::new(directories),
            denied: Vec::new(),
        }
    }

    /// Change the name of the mock backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Make every write at or beneath `prefix` fail with a permission error.
    pub fn deny(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.denied.push(prefix.into());
        self
    }

    /// Contents of a file written to (or seeded into) the backend.
    pub async fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let path = validate_path(path.as_ref()).ok()?;
        self.files.read().await.get(&path).cloned()
    }

    /// All file paths currently stored, sorted.
    pub async fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.files.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn check_denied(&self, path: &Path) -> Result<()> {
        if self.denied.iter().any(|prefix| path.starts_with(prefix)) {
            exn::bail!(ErrorKind::PermissionDenied(path.to_path_buf()));
        }
        Ok(())
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        Ok(self.files.read().await.contains_key(&path) || self.directories.read().await.contains(&path))
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        let path = validate_path(path)?;
        self.check_denied(&path)?;
        let files = self.files.read().await;
        let mut directories = self.directories.write().await;
        for ancestor in path.ancestors().filter(|p| !p.as_os_str().is_empty()) {
            if files.contains_key(ancestor) {
                exn::bail!(ErrorKind::AlreadyExists(ancestor.to_path_buf()));
            }
            directories.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    async fn copy_new(&self, source: &Path, path: &Path) -> Result<u64> {
        let path = validate_path(path)?;
        self.check_denied(&path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
            && !self.directories.read().await.contains(parent)
        {
            exn::bail!(ErrorKind::NotFound(parent.to_path_buf()));
        }
        let data = tokio::fs::read(source).await.map_err(|e| ErrorKind::from_io(e, source))?;
        let mut files = self.files.write().await;
        if files.contains_key(&path) {
            exn::bail!(ErrorKind::AlreadyExists(path));
        }
        let bytes = data.len() as u64;
        files.insert(path, data);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.jpg");
        std::fs::write(&path, b"pixels").unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn test_copy_and_read_back() {
        let (_dir, source) = source();
        let backend = MockBackend::default();
        backend.create_dir_all(Path::new("Headshots")).await.unwrap();
        backend.copy_new(&source, Path::new("Headshots/IMG.jpg")).await.unwrap();
        assert_eq!(backend.contents("Headshots/IMG.jpg").await.unwrap(), b"pixels");
        assert_eq!(backend.paths().await, vec![PathBuf::from("Headshots/IMG.jpg")]);
    }

    #[tokio::test]
    async fn test_with_files_registers_directories() {
        let backend = MockBackend::with_files([("a/b/file.jpg", Vec::from(*b"x"))]);
        assert!(backend.exists(Path::new("a")).await.unwrap());
        assert!(backend.exists(Path::new("a/b")).await.unwrap());
        assert!(backend.exists(Path::new("a/b/file.jpg")).await.unwrap());
        assert!(!backend.exists(Path::new("c")).await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_never_overwrites() {
        let (_dir, source) = source();
        let backend = MockBackend::with_files([("IMG.jpg", Vec::from(*b"first"))]);
        let err = backend.copy_new(&source, Path::new("IMG.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        assert_eq!(backend.contents("IMG.jpg").await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_copy_requires_parent() {
        let (_dir, source) = source();
        let backend = MockBackend::default();
        let err = backend.copy_new(&source, Path::new("Headshots/IMG.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_denied_prefix() {
        let (_dir, source) = source();
        let backend = MockBackend::default().with_name("locked").deny("Product Images");
        assert_eq!(backend.name(), "locked");
        let err = backend.create_dir_all(Path::new("Product Images")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::PermissionDenied(_)));
        let err = backend.copy_new(&source, Path::new("Product Images/IMG.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::PermissionDenied(_)));
        backend.create_dir_all(Path::new("Headshots")).await.unwrap();
    }

    #[tokio::test]
    async fn test_directory_blocked_by_file() {
        let backend = MockBackend::with_files([("Headshots", Vec::from(*b"oops"))]);
        assert!(backend.create_dir_all(Path::new("Headshots")).await.is_err());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let backend = MockBackend::default();
        assert!(backend.exists(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.create_dir_all(Path::new("../escape")).await.is_err());
    }

    #[test]
    #[should_panic(expected = "invalid path")]
    fn test_with_files_panics_on_bad_path() {
        MockBackend::with_files([("../escape", Vec::from(*b"bad"))]);
    }
}
