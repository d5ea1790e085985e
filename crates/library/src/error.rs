//! Library Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Per-file commit failures are *not* errors at this
//! level: they are recorded as a
//! [`CommitOutcome::Failed`](crate::CommitOutcome::Failed) against the file
//! and the batch carries on. Only whole-batch problems end up here.

use crate::validate::ValidationReport;
use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// There is nothing to commit.
    #[display("no files to process")]
    EmptyBatch,
    /// Too many records have validation issues; nothing was written.
    #[display("too many files have issues ({} of {}); fix them before processing", _0.with_issues(), _0.total())]
    Refused(#[error(not(source))] ValidationReport),
    /// Loading or saving persisted session state failed.
    #[display("could not access saved session state")]
    Store,
    /// The operation queue worker has shut down.
    #[display("operation queue is closed")]
    QueueClosed,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store)
    }
}
