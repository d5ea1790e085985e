//! Memoised, coalescing thumbnail loading.
//!
//! Decoding is somebody else's job: a [`ThumbnailLoader`] turns a source path
//! into whatever image type the front end wants. [`ThumbnailCache`] makes
//! sure each path is loaded at most once, even when many requests for it
//! arrive while the first load is still running.

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared, join_all};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

/// How many results are remembered before the oldest is forgotten.
pub const DEFAULT_CAPACITY: usize = 200;
/// [`ThumbnailCache::preload`] only warms this many paths.
pub const PRELOAD_LIMIT: usize = 10;

#[async_trait]
pub trait ThumbnailLoader: Send + Sync + 'static {
    type Image: Clone + Send + Sync + 'static;

    /// `None` if the file is missing or cannot be decoded.
    async fn load(&self, path: &Path) -> Option<Self::Image>;
}

/// Loads the raw file contents and leaves decoding to the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawBytesLoader;

#[async_trait]
impl ThumbnailLoader for RawBytesLoader {
    type Image = Arc<[u8]>;

    async fn load(&self, path: &Path) -> Option<Self::Image> {
        tokio::fs::read(path).await.ok().map(Arc::from)
    }
}

type InFlight<I> = Shared<BoxFuture<'static, Option<I>>>;

struct State<I> {
    ready: HashMap<PathBuf, Option<I>>,
    order: VecDeque<PathBuf>,
    in_flight: HashMap<PathBuf, InFlight<I>>,
}
impl<I> Default for State<I> {
    fn default() -> Self {
        Self { ready: HashMap::new(), order: VecDeque::new(), in_flight: HashMap::new() }
    }
}

/// Thumbnail cache in front of a [`ThumbnailLoader`].
///
/// One mutex guards both the finished results and the registry of loads in
/// progress, so a path is either ready, in flight, or neither. The lock is
/// never held across an `.await`.
pub struct ThumbnailCache<L: ThumbnailLoader> {
    loader: Arc<L>,
    capacity: usize,
    state: Mutex<State<L::Image>>,
}
impl<L: ThumbnailLoader> ThumbnailCache<L> {
    pub fn new(loader: L) -> Self {
        Self::with_capacity(loader, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(loader: L, capacity: usize) -> Self {
        Self { loader: Arc::new(loader), capacity: capacity.max(1), state: Mutex::new(State::default()) }
    }

    /// The thumbnail for `path`, loading it if needed.
    ///
    /// Concurrent calls for the same path share a single load.
    pub async fn get(&self, path: &Path) -> Option<L::Image> {
        let load = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(image) = state.ready.get(path) {
                return image.clone();
            }
            match state.in_flight.get(path) {
                Some(load) => {
                    trace!(path = %path.display(), "joining in-flight thumbnail load");
                    load.clone()
                },
                None => {
                    let loader = Arc::clone(&self.loader);
                    let owned = path.to_path_buf();
                    let load = async move { loader.load(&owned).await }.boxed().shared();
                    state.in_flight.insert(path.to_path_buf(), load.clone());
                    load
                },
            }
        };

        let image = load.clone().await;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the first finisher of this load stores the result. After a
        // clear the registry holds either nothing or a newer load for the
        // same path, and neither may be touched.
        let current = state.in_flight.get(path).is_some_and(|entry| entry.ptr_eq(&load));
        if current {
            state.in_flight.remove(path);
            if state.order.len() >= self.capacity
                && let Some(oldest) = state.order.pop_front()
            {
                state.ready.remove(&oldest);
            }
            state.order.push_back(path.to_path_buf());
            state.ready.insert(path.to_path_buf(), image.clone());
        }
        image
    }

    /// Warm the cache for the first [`PRELOAD_LIMIT`] paths, concurrently.
    pub async fn preload(&self, paths: &[PathBuf]) {
        join_all(paths.iter().take(PRELOAD_LIMIT).map(|path| self.get(path))).await;
    }

    /// Whether a finished result is cached for `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).ready.contains_key(path)
    }

    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = State::default();
    }
}
