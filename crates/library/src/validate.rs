//! Pre-commit validation.
//!
//! Every record is checked on its own, then the batch as a whole is gated: if
//! too large a share of it has problems the commit is refused outright, on
//! the assumption that the operator has not finished reviewing it yet.

use crate::error::{ErrorKind, Result};
use crate::record::{Record, RecordId};
use derive_more::Display;
use std::fmt::{Display as FmtDisplay, Formatter, Result as FmtResult};
use tracing::{instrument, warn};

/// A problem that would stop a record from committing cleanly.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Issue {
    #[display("missing description")]
    MissingDescription,
    #[display("missing request ID")]
    MissingRequestId,
    #[display("cannot generate valid filename")]
    InvalidFilename,
}

/// All issues for a single record, independent of each other.
pub fn issues(record: &Record) -> Vec<Issue> {
    let mut issues = Vec::new();
    if record.description().is_empty() {
        issues.push(Issue::MissingDescription);
    }
    if record.request_id().is_empty() {
        issues.push(Issue::MissingRequestId);
    }
    if record.canonical_name().is_none() {
        issues.push(Issue::InvalidFilename);
    }
    issues
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIssues {
    pub id: RecordId,
    pub filename: String,
    pub issues: Vec<Issue>,
}

/// Issues across a whole batch. Records without issues are not listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    total: usize,
    entries: Vec<RecordIssues>,
}
impl ValidationReport {
    pub fn new(records: &[Record]) -> Self {
        let entries = records
            .iter()
            .filter_map(|record| {
                let issues = issues(record);
                (!issues.is_empty()).then(|| RecordIssues {
                    id: record.id(),
                    filename: record.asset().filename().to_string(),
                    issues,
                })
            })
            .collect();
        Self { total: records.len(), entries }
    }

    /// Number of records checked.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of records with at least one issue.
    pub fn with_issues(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[RecordIssues] {
        &self.entries
    }

    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the records with issues are more than `threshold` of the batch.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.with_issues() as f64 > threshold * self.total as f64
    }
}
impl FmtDisplay for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for entry in &self.entries {
            let issues: Vec<String> = entry.issues.iter().map(ToString::to_string).collect();
            writeln!(f, "{}: {}", entry.filename, issues.join(", "))?;
        }
        Ok(())
    }
}

/// Check `records` against `threshold` before anything is written.
///
/// # Errors
/// - [`ErrorKind::EmptyBatch`] when there are no records.
/// - [`ErrorKind::Refused`] carrying the full report when more than
///   `threshold` of the records have issues.
#[instrument(level = "debug", skip(records), fields(total = records.len()))]
pub fn gate(records: &[Record], threshold: f64) -> Result<ValidationReport> {
    if records.is_empty() {
        exn::bail!(ErrorKind::EmptyBatch);
    }
    let report = ValidationReport::new(records);
    if report.exceeds(threshold) {
        warn!(with_issues = report.with_issues(), total = report.total(), "batch refused");
        exn::bail!(ErrorKind::Refused(report));
    }
    Ok(report)
}
