//! Storage Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. The kinds are deliberately coarse: the commit pipeline
//! records their display text against the file that failed and moves on, so
//! the message has to make sense to an operator on its own.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File or directory does not exist
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// File already exists (for operations that never overwrite)
    #[display("file already exists: {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Path contains invalid characters or escapes root
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Translate an I/O error into the most specific kind available.
    pub fn from_io(err: IoError, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.into()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.into()),
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.into()),
            _ => Self::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind as IoKind;

    #[test]
    fn test_from_io_maps_known_kinds() {
        let kind = ErrorKind::from_io(IoError::from(IoKind::NotFound), "a.jpg");
        assert!(matches!(kind, ErrorKind::NotFound(ref p) if p == &PathBuf::from("a.jpg")));
        let kind = ErrorKind::from_io(IoError::from(IoKind::PermissionDenied), "a.jpg");
        assert!(matches!(kind, ErrorKind::PermissionDenied(_)));
        let kind = ErrorKind::from_io(IoError::from(IoKind::AlreadyExists), "a.jpg");
        assert!(matches!(kind, ErrorKind::AlreadyExists(_)));
        let kind = ErrorKind::from_io(IoError::other("disk on fire"), "a.jpg");
        assert!(matches!(kind, ErrorKind::Io(_)));
        assert!(kind.is_retryable());
        assert!(!ErrorKind::AlreadyExists(PathBuf::from("a.jpg")).is_retryable());
    }

    #[test]
    fn test_display_includes_path() {
        let kind = ErrorKind::PermissionDenied(PathBuf::from("Product Images"));
        assert_eq!(kind.to_string(), "permission denied: Product Images");
    }
}
