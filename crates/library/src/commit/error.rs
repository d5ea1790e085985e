//! Error types for the [`commit`](super) module.
//!
//! These never escape the commit stream: each one is turned into a
//! [`CommitOutcome::Failed`](crate::CommitOutcome::Failed) whose reason is
//! the error's display text, so the storage error it wraps is spelled out in
//! the message rather than only kept as a child frame.

use derive_more::{Display, Error};
use movr_storage::error::Error as StorageError;

/// A commit error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for commit operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The canonical name is not a single, plain path component.
    #[display("invalid destination filename: {_0}")]
    InvalidName(#[error(not(source))] String),
    /// The destination folder could not be created.
    #[display("could not create destination folder: {_0}")]
    Directory(#[error(not(source))] String),
    /// Copying the source bytes failed.
    #[display("could not copy file: {_0}")]
    Copy(#[error(not(source))] String),
    /// Every disambiguated name that was tried is already taken.
    #[display("no free filename after {_0} attempts")]
    Conflict(#[error(not(source))] usize),
}

impl ErrorKind {
    #[track_caller]
    pub(crate) fn directory(err: StorageError) -> Error {
        let reason = (*err).to_string();
        err.raise(ErrorKind::Directory(reason))
    }

    #[track_caller]
    pub(crate) fn copy(err: StorageError) -> Error {
        let reason = (*err).to_string();
        err.raise(ErrorKind::Copy(reason))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Directory(_) | Self::Copy(_))
    }
}
