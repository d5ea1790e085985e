//! Extraction Error Types
//!
//! Parsing a filename never fails: unrecognised fields are simply absent.
//! The only fallible operations in this crate convert user-supplied strings
//! (configuration values, CLI arguments, persisted rows) back into the
//! enumerations in [`models`](crate::models).

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The value does not name one of the two known companies.
    #[display("unknown company: {_0}")]
    UnknownCompany(#[error(not(source))] String),
    /// The value does not name one of the six image types.
    #[display("unknown image type: {_0}")]
    UnknownImageType(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Retrying the same string will always produce the same answer.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::UnknownCompany("ACME".to_string()).to_string(), "unknown company: ACME");
        assert_eq!(ErrorKind::UnknownImageType("macro".to_string()).to_string(), "unknown image type: macro");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(!ErrorKind::UnknownCompany(String::new()).is_retryable());
        assert!(!ErrorKind::UnknownImageType(String::new()).is_retryable());
    }
}
