use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use time::UtcDateTime;
use time::format_description::well_known::Rfc3339;

/// One line of the audit trail: what happened, to which file, and how it
/// turned out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub timestamp: UtcDateTime,
    pub action: String,
    pub subject: String,
    pub result: String,
}
impl AuditEntry {
    pub fn new(action: impl Into<String>, subject: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            timestamp: UtcDateTime::now(),
            action: action.into(),
            subject: subject.into(),
            result: result.into(),
        }
    }
}
impl Display for AuditEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let timestamp = self.timestamp.format(&Rfc3339).map_err(|_| std::fmt::Error)?;
        write!(f, "[{timestamp}] {}: {}\nResult: {}", self.action, self.subject, self.result)
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AuditRow {
    pub(crate) recorded_at: i64,
    pub(crate) action: String,
    pub(crate) subject: String,
    pub(crate) result: String,
}
impl From<&AuditEntry> for AuditRow {
    fn from(entry: &AuditEntry) -> Self {
        Self {
            recorded_at: entry.timestamp.unix_timestamp(),
            action: entry.action.clone(),
            subject: entry.subject.clone(),
            result: entry.result.clone(),
        }
    }
}
impl TryFrom<AuditRow> for AuditEntry {
    type Error = Error;
    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(Self {
            timestamp: UtcDateTime::from_unix_timestamp(row.recorded_at)
                .or_raise(|| ErrorKind::InvalidData("audit timestamp"))?,
            action: row.action,
            subject: row.subject,
            result: row.result,
        })
    }
}
