use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use movr_cache::Repository;
use std::path::{Path, PathBuf};

/// Recent destinations kept.
pub const MAX_RECENT_PATHS: usize = 5;

/// Destination roots used for recent commits, most recent first, without
/// duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentPaths {
    paths: Vec<PathBuf>,
}
impl RecentPaths {
    /// `paths` is taken as most recent first; later duplicates and anything
    /// past the limit are dropped.
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut recent = Self::default();
        for path in paths {
            if !recent.paths.contains(&path) && recent.paths.len() < MAX_RECENT_PATHS {
                recent.paths.push(path);
            }
        }
        recent
    }

    pub async fn load(repo: &Repository) -> Result<Self> {
        Ok(Self::new(repo.load_recent_paths().await.or_raise(|| ErrorKind::Store)?))
    }

    pub async fn save(&self, repo: &Repository) -> Result<()> {
        repo.save_recent_paths(&self.paths).await.or_raise(|| ErrorKind::Store)
    }

    /// Move `path` to the front, adding it if it is new.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.paths.retain(|existing| existing != &path);
        self.paths.insert(0, path);
        self.paths.truncate(MAX_RECENT_PATHS);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn most_recent(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    /// Forget destinations that no longer exist. Returns how many were
    /// dropped.
    pub fn prune_missing(&mut self) -> usize {
        let before = self.paths.len();
        self.paths.retain(|path| path.exists());
        before - self.paths.len()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }
}
