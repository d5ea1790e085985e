//! Append-only audit trail of everything done to a batch.
//!
//! The session and the commit stream write to an [`AuditLog`] they are handed;
//! whoever owns the log decides whether it is persisted (see
//! [`movr_cache::Repository::append_audit`]) or just printed.

use derive_more::Display;
use movr_cache::AuditEntry;
use std::sync::{Mutex, PoisonError};

const REPORT_TITLE: &str = "movr processing log";

/// What happened. The display text is what ends up in the audit trail.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    #[display("File Imported")]
    Import,
    #[display("Filename Parsed")]
    Parse,
    #[display("Filename Generated")]
    Generate,
    #[display("File Edited")]
    Edit,
    #[display("Files Removed")]
    Remove,
    #[display("Session Cleared")]
    Clear,
    #[display("Verification Changed")]
    Verify,
    #[display("Image Type Applied")]
    ImageType,
    #[display("Auto-Fill Applied")]
    AutoFill,
    #[display("Files Duplicated")]
    Duplicate,
    #[display("Session Restored")]
    Restore,
    #[display("Processing Refused")]
    Refused,
    #[display("File Processed")]
    Committed,
    #[display("File Processed (Renamed)")]
    CommittedRenamed,
    #[display("File Skipped")]
    Skipped,
    #[display("File Processing Error")]
    Failed,
    #[display("Processing Complete")]
    Complete,
}

/// Subject used for entries that concern the whole batch.
pub const BATCH_SUBJECT: &str = "Batch Operation";

pub trait AuditLog: Send + Sync {
    /// Append an entry. Entries are never modified or removed.
    fn append(&self, entry: AuditEntry);

    /// A copy of every entry, oldest first.
    fn entries(&self) -> Vec<AuditEntry>;

    fn record(&self, action: Action, subject: &str, result: &str) {
        self.append(AuditEntry::new(action.to_string(), subject, result));
    }
}

/// In-process audit log.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}
impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every entry recorded so far, e.g. to persist them.
    pub fn take(&self) -> Vec<AuditEntry> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl AuditLog for MemoryAuditLog {
    fn append(&self, entry: AuditEntry) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }

    fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Flat text report of `entries`, one block per entry.
pub fn report(entries: &[AuditEntry]) -> String {
    let mut report = format!("{REPORT_TITLE}\n{}\n\n", "-".repeat(REPORT_TITLE.len()));
    for entry in entries {
        report.push_str(&format!("{entry}\n\n"));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_log_is_append_only() {
        let log = MemoryAuditLog::new();
        log.record(Action::Import, "a.jpg", "imported");
        log.record(Action::Committed, "a.jpg", "copied to Headshots/IMG.jpg");
        let actions: Vec<_> = log.entries().into_iter().map(|e| e.action).collect();
        assert_eq!(actions, vec!["File Imported", "File Processed"]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_take_drains() {
        let log = MemoryAuditLog::new();
        log.record(Action::Clear, BATCH_SUBJECT, "removed 3 files");
        assert_eq!(log.take().len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_report() {
        let log = MemoryAuditLog::new();
        log.record(Action::Failed, "b.jpg", "error: disk full");
        let report = report(&log.entries());
        assert!(report.starts_with("movr processing log\n-------------------\n\n"));
        assert!(report.contains("] File Processing Error: b.jpg\nResult: error: disk full\n\n"));
    }
}
