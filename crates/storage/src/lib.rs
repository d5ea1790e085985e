//! Destination storage for committed assets.
//!
//! Everything the commit pipeline writes goes through a [`StorageBackend`]
//! rooted at the destination directory. Backends never overwrite: copying
//! onto an existing path fails with
//! [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) so the caller can
//! pick a different name.

pub mod backend;
pub mod error;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::path::{validate as validate_path, validate_file_name};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
