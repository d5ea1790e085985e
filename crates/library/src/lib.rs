//! Everything that happens to a batch of vendor photographs between import and
//! the destination folder.
//!
//! A [`Session`] holds one [`Record`] per imported file. Each record starts
//! from whatever [`movr_extract::parse`] recognised in the original filename,
//! takes the operator's [`Edit`]s, and always carries the canonical filename
//! generated from its current fields. Before committing, the batch is gated by
//! [`validate`]; committing then copies each file into its image type's
//! folder on a [`movr_storage::StorageBackend`], never overwriting anything
//! that is already there, and reports progress as a stream of
//! [`CommitEvent`]s.

pub mod audit;
mod canonical;
pub mod commit;
pub mod error;
pub mod queue;
pub mod recent;
mod record;
pub mod session;
pub mod store;
pub mod thumbnail;
pub mod validate;

pub use crate::canonical::{NameParts, canonical_name};
pub use crate::commit::{CommitEvent, Progress, Summary};
pub use crate::record::{CommitOutcome, Edit, RawAsset, Record, RecordId};
pub use crate::session::{ImportSummary, RestoreSummary, Session, SessionStats};
