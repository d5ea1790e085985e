//! Repository for session state, the audit trail and recent destinations.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{AuditEntry, AuditRow, RecordRow, StoredRecord};
use exn::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use time::UtcDateTime;
use tracing::instrument;

/// Repository over the cache database.
///
/// A `dry_run` repository reads normally but silently skips every write, so
/// a dry-run commit leaves the persisted session exactly as it found it.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: sqlx::SqlitePool,
    dry_run: bool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), dry_run: false }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: sqlx::SqlitePool, dry_run: bool) -> Self {
        Self { pool, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn sqlx_hates_paths(path: impl AsRef<Path>) -> Result<String> {
        Ok(path.as_ref().to_str().ok_or_raise(|| ErrorKind::InvalidData("path"))?.to_string())
    }

    // =========================================================================
    // Session records
    // =========================================================================

    /// Replace the stored session with `records`, in order, in a single
    /// transaction.
    #[instrument(skip_all, fields(records = records.len()))]
    pub async fn save_session(&self, records: &[StoredRecord]) -> Result<()> {
        let rows = records.iter().map(RecordRow::try_from).collect::<Result<Vec<_>>>()?;
        if self.dry_run {
            return Ok(());
        }
        let saved_at = UtcDateTime::now().unix_timestamp();
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../queries/clear_session.sql"))
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        for (position, row) in rows.into_iter().enumerate() {
            let position = i64::try_from(position).or_raise(|| ErrorKind::InvalidData("position"))?;
            sqlx::query(include_str!("../queries/insert_session_record.sql"))
                .bind(row.path)
                .bind(position)
                .bind(row.description)
                .bind(row.request_id)
                .bind(row.company)
                .bind(row.sequence)
                .bind(row.retouched)
                .bind(row.image_type)
                .bind(row.verified)
                .bind(saved_at)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// The stored session, in the order it was saved.
    pub async fn load_session(&self) -> Result<Vec<StoredRecord>> {
        let rows: Vec<RecordRow> = sqlx::query_as(include_str!("../queries/list_session_records.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(StoredRecord::try_from).collect()
    }

    /// Forget the stored session. Returns the number of records removed.
    pub async fn clear_session(&self) -> Result<u64> {
        if self.dry_run {
            return Ok(0);
        }
        let result = sqlx::query(include_str!("../queries/clear_session.sql"))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Audit log
    // =========================================================================

    /// Append entries to the audit trail. Existing entries are never touched.
    #[instrument(skip_all, fields(entries = entries.len()))]
    pub async fn append_audit(&self, entries: &[AuditEntry]) -> Result<()> {
        if self.dry_run || entries.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        for row in entries.iter().map(AuditRow::from) {
            sqlx::query(include_str!("../queries/insert_audit_entry.sql"))
                .bind(row.recorded_at)
                .bind(row.action)
                .bind(row.subject)
                .bind(row.result)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// Every audit entry, oldest first.
    pub async fn audit_entries(&self) -> Result<Vec<AuditEntry>> {
        let rows: Vec<AuditRow> = sqlx::query_as(include_str!("../queries/list_audit_entries.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(AuditEntry::try_from).collect()
    }

    // =========================================================================
    // Recent destinations
    // =========================================================================

    /// Recent destination roots, most recent first.
    pub async fn load_recent_paths(&self) -> Result<Vec<PathBuf>> {
        let paths: Vec<String> = sqlx::query_scalar(include_str!("../queries/list_recent_paths.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(paths.into_iter().map(PathBuf::from).collect())
    }

    /// Replace the stored recent destinations.
    pub async fn save_recent_paths(&self, paths: &[PathBuf]) -> Result<()> {
        let paths = paths.iter().map(Self::sqlx_hates_paths).collect::<Result<Vec<_>>>()?;
        if self.dry_run {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../queries/clear_recent_paths.sql"))
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        for (position, path) in paths.into_iter().enumerate() {
            let position = i64::try_from(position).or_raise(|| ErrorKind::InvalidData("position"))?;
            sqlx::query(include_str!("../queries/insert_recent_path.sql"))
                .bind(path)
                .bind(position)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}
