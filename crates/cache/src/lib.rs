//! SQLite persistence for movr sessions.
//!
//! The source files are the system of record; this database only remembers
//! what the operator has typed so far, so an interrupted session can be picked
//! up again. If the database is deleted, every record simply falls back to
//! whatever can be parsed from its filename.
//!
//! # Architecture
//! Three independent tables:
//! - **Session records**: the editable fields of each imported file, keyed by
//!   source path. Every field is optional.
//! - **Audit log**: append-only `(action, subject, result)` entries.
//! - **Recent paths**: the last few destination roots used for a commit.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::models::{AuditEntry, StoredRecord};
pub use crate::repo::Repository;
