//! Command-line Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A command-line error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for command-line operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open the session database")]
    Database,
    /// No `--dest`, nothing configured and no recent destination.
    #[display("no destination given; pass --dest or set one in the configuration")]
    NoDestination,
    #[display("destination {} cannot be used", _0.display())]
    Destination(#[error(not(source))] PathBuf),
    /// The batch was refused or could not be persisted.
    #[display("processing stopped")]
    Session,
    #[display("could not write {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
}
