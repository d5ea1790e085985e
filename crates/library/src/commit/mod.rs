//! Committing a batch to the destination tree.
//!
//! Each record's source file is copied (never moved) to
//! `<destination>/<image type folder>/<canonical name>`. Nothing is ever
//! overwritten: when the canonical name is already taken, the copy gets a
//! timestamped name next to it and is reported as
//! [`CommittedRenamed`](crate::CommitOutcome::CommittedRenamed).
//!
//! Records are processed sequentially and in order. A record that cannot be
//! committed gets a [`Failed`](crate::CommitOutcome::Failed) or
//! [`SkippedNoName`](crate::CommitOutcome::SkippedNoName) outcome and the
//! batch carries on; there is no way to cancel a run part-way.
//!
//! The primary entry point is [`commit`], which streams [`CommitEvent`]s so
//! the caller can report progress as it goes.

mod conflict;
pub mod error;
mod file;
mod progress;
mod stream;

pub use self::file::commit_record;
pub use self::progress::{Progress, Summary};
pub use self::stream::{CommitEvent, commit};
