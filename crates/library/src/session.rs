//! The working batch: imported files, the operator's edits, and everything
//! that can be done to them before and during a commit.

use crate::audit::{Action, AuditLog, BATCH_SUBJECT};
use crate::commit::{CommitEvent, commit};
use crate::error::Result;
use crate::record::{Edit, RawAsset, Record, RecordId};
use crate::store::SessionStore;
use crate::validate::{ValidationReport, gate};
use futures::Stream;
use movr_cache::StoredRecord;
use movr_extract::models::{Company, ImageType};
use movr_storage::BackendHandle;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Extensions (lower-case) accepted by [`Session::import`].
pub const SUPPORTED_EXTENSIONS: [&str; 27] = [
    "jpg", "jpeg", "png", "gif", "tif", "tiff", "bmp", "heic", "ai", "svg", "eps", "r3d", "cr2", "rtn", "pct", "arw",
    "dpx", "psb", "thm", "ps", "psd", "avif", "tga", "webp", "dng", "nef", "crw",
];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Already in the batch (same absolute path).
    pub duplicates: usize,
    /// Extension not in [`SUPPORTED_EXTENSIONS`], or no usable filename.
    pub unsupported: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub restored: usize,
    /// Stored records whose source file no longer exists; they are dropped.
    pub missing: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub total: usize,
    pub verified: usize,
    pub by_image_type: BTreeMap<ImageType, usize>,
    pub by_company: BTreeMap<Company, usize>,
}

/// An ordered batch of [`Record`]s and the audit log its operations write to.
pub struct Session {
    records: Vec<Record>,
    next_id: u64,
    batch_type: ImageType,
    audit: Arc<dyn AuditLog>,
}
impl Session {
    /// An empty session whose imports default to `batch_type`.
    pub fn new(batch_type: ImageType, audit: Arc<dyn AuditLog>) -> Self {
        Self { records: Vec::new(), next_id: 0, batch_type, audit }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn batch_type(&self) -> ImageType {
        self.batch_type
    }

    /// Image type given to files imported from now on.
    pub fn set_batch_type(&mut self, batch_type: ImageType) {
        self.batch_type = batch_type;
    }

    fn next_id(&mut self) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        id
    }

    fn sort(&mut self) {
        self.records.sort_by(|a, b| a.asset().filename().cmp(b.asset().filename()));
    }

    /// Log the parse and the first generated name for a new record.
    fn log_new(&self, record: &Record) {
        let subject = record.asset().filename();
        self.audit.record(Action::Parse, subject, &record.parsed().to_string());
        self.audit.record(Action::Generate, subject, &name_result(record));
    }

    /// Add every supported file in `paths` that is not already in the batch,
    /// then re-sort the batch by original filename.
    #[instrument(skip_all)]
    pub fn import<I, P>(&mut self, paths: I) -> ImportSummary
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut summary = ImportSummary::default();
        for path in paths {
            let path = path.as_ref();
            let asset = match std::path::absolute(path) {
                Ok(absolute) if is_supported(&absolute) => RawAsset::new(absolute),
                Ok(_) => None,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "could not resolve path");
                    None
                },
            };
            let Some(asset) = asset else {
                debug!(path = %path.display(), "unsupported file");
                summary.unsupported += 1;
                continue;
            };
            if self.records.iter().any(|record| record.asset().path() == asset.path()) {
                summary.duplicates += 1;
                continue;
            }
            let id = self.next_id();
            let record = Record::new(id, asset, self.batch_type);
            debug!(record = %id, parsed = %record.parsed(), "imported");
            self.log_new(&record);
            self.records.push(record);
            summary.imported += 1;
        }
        self.sort();
        info!(imported = summary.imported, duplicates = summary.duplicates, unsupported = summary.unsupported, "import");
        if summary.imported > 0 {
            self.audit.record(
                Action::Import,
                BATCH_SUBJECT,
                &format!(
                    "imported {} files, skipped {} duplicates and {} unsupported files",
                    summary.imported, summary.duplicates, summary.unsupported
                ),
            );
        }
        summary
    }

    /// Returns how many records were removed.
    pub fn remove(&mut self, ids: &[RecordId]) -> usize {
        let before = self.records.len();
        self.records.retain(|record| !ids.contains(&record.id()));
        let removed = before - self.records.len();
        if removed > 0 {
            self.audit.record(Action::Remove, BATCH_SUBJECT, &format!("removed {removed} files from current batch"));
        }
        removed
    }

    /// Remove every record. Returns how many there were.
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        self.audit.record(Action::Clear, BATCH_SUBJECT, &format!("removed all {removed} files from current session"));
        removed
    }

    /// Apply `edits` to one record. Returns `false` if nothing changed or
    /// there is no such record.
    pub fn edit(&mut self, id: RecordId, edits: impl IntoIterator<Item = Edit>) -> bool {
        let Some(record) = self.records.iter_mut().find(|record| record.id() == id) else {
            warn!(record = %id, "edit for unknown record");
            return false;
        };
        let changes = apply_logged(record, edits, self.audit.as_ref());
        if !changes.is_empty() {
            self.audit.record(Action::Edit, record.asset().filename(), &changes.join(", "));
        }
        !changes.is_empty()
    }

    /// Give every record the same image type. Returns how many changed.
    pub fn set_image_type_all(&mut self, image_type: ImageType) -> usize {
        let mut changed = 0;
        for record in &mut self.records {
            if !apply_logged(record, [Edit::ImageType(image_type)], self.audit.as_ref()).is_empty() {
                changed += 1;
            }
        }
        self.audit.record(
            Action::ImageType,
            BATCH_SUBJECT,
            &format!("set {image_type} on {changed} of {} files", self.records.len()),
        );
        changed
    }

    pub fn verify(&mut self, id: RecordId, verified: bool) -> bool {
        let Some(record) = self.records.iter_mut().find(|record| record.id() == id) else {
            return false;
        };
        let changed = record.apply(Edit::Verified(verified));
        let result = if verified { "marked as verified" } else { "verification removed" };
        self.audit.record(Action::Verify, record.asset().filename(), result);
        changed
    }

    /// Whether there is at least one record and all of them are verified.
    pub fn all_verified(&self) -> bool {
        !self.records.is_empty() && self.records.iter().all(Record::verified)
    }

    /// Unverify everything if everything is verified, otherwise verify
    /// everything. Returns the new state.
    pub fn toggle_verify_all(&mut self) -> bool {
        let verified = !self.all_verified();
        for record in &mut self.records {
            record.apply(Edit::Verified(verified));
        }
        let state = if verified { "verified" } else { "unverified" };
        self.audit.record(Action::Verify, BATCH_SUBJECT, &format!("{} files {state}", self.records.len()));
        verified
    }

    /// Fill in what can be recovered for records missing a description or a
    /// request ID. Returns how many records were updated.
    ///
    /// Only empty fields are filled, from what the parser found in the
    /// original filename. The company follows an explicit request ID in the
    /// filename or, failing that, a request-ID prefix seen on the complete
    /// records of the batch that also appears in the filename.
    #[instrument(skip_all)]
    pub fn auto_fill_missing(&mut self) -> usize {
        let mut learned: Vec<(Company, &'static str)> = Vec::new();
        for record in self.records.iter().filter(|r| !r.description().is_empty() && !r.request_id().is_empty()) {
            let prefix = Company::ALL
                .iter()
                .map(Company::request_prefix)
                .find(|prefix| record.request_id().starts_with(prefix));
            if let Some(prefix) = prefix
                && !learned.iter().any(|(company, _)| *company == record.company())
            {
                learned.push((record.company(), prefix));
            }
        }

        let mut filled = 0;
        for record in &mut self.records {
            if !record.description().is_empty() && !record.request_id().is_empty() {
                continue;
            }
            let parsed = record.parsed().clone();
            let mut edits = Vec::new();
            if record.description().is_empty()
                && let Some(description) = parsed.description
            {
                edits.push(Edit::Description(description));
            }
            if record.request_id().is_empty()
                && let Some(request_id) = parsed.request_id.clone()
            {
                edits.push(Edit::RequestId(request_id));
            }
            let filename = record.asset().filename().to_lowercase();
            let company = match (parsed.request_id, parsed.company) {
                (Some(_), company) => company,
                (None, _) => learned
                    .iter()
                    .find(|(_, prefix)| filename.contains(&prefix.to_lowercase()))
                    .map(|(company, _)| *company),
            };
            edits.extend(company.map(Edit::Company));
            if !apply_logged(record, edits, self.audit.as_ref()).is_empty() {
                filled += 1;
            }
        }
        self.audit.record(
            Action::AutoFill,
            BATCH_SUBJECT,
            &format!("applied smart patterns to {filled} of {} files", self.records.len()),
        );
        filled
    }

    /// Append a copy of each record in `ids`. Returns how many were copied.
    pub fn duplicate(&mut self, ids: &[RecordId]) -> usize {
        let originals: Vec<Record> = self.records.iter().filter(|r| ids.contains(&r.id())).cloned().collect();
        for original in &originals {
            let id = self.next_id();
            let copy = original.duplicate(id);
            self.audit.record(Action::Generate, copy.asset().filename(), &name_result(&copy));
            self.records.push(copy);
        }
        if !originals.is_empty() {
            self.audit.record(Action::Duplicate, BATCH_SUBJECT, &format!("created {} duplicate files", originals.len()));
        }
        originals.len()
    }

    pub fn stats(&self) -> SessionStats {
        let mut stats = SessionStats { total: self.records.len(), ..SessionStats::default() };
        for record in &self.records {
            if record.verified() {
                stats.verified += 1;
            }
            *stats.by_image_type.entry(record.image_type()).or_default() += 1;
            *stats.by_company.entry(record.company()).or_default() += 1;
        }
        stats
    }

    pub fn validation_report(&self) -> ValidationReport {
        ValidationReport::new(&self.records)
    }

    /// Gate the batch before a commit. See [`gate`].
    pub fn validate(&self, threshold: f64) -> Result<ValidationReport> {
        gate(&self.records, threshold).inspect_err(|err| {
            self.audit.record(Action::Refused, BATCH_SUBJECT, &(**err).to_string());
        })
    }

    /// Commit every record into `backend`. See [`commit`](crate::commit()).
    pub fn commit<'a>(&'a mut self, backend: &'a BackendHandle) -> impl Stream<Item = CommitEvent> + 'a {
        commit(&mut self.records, backend, self.audit.as_ref())
    }

    /// The editable fields of every record, ready to persist.
    pub fn snapshot(&self) -> Vec<StoredRecord> {
        self.records
            .iter()
            .map(|record| StoredRecord {
                path: record.asset().path().to_path_buf(),
                description: Some(record.description().to_string()),
                request_id: Some(record.request_id().to_string()),
                company: Some(record.company()),
                sequence: Some(record.sequence().to_string()),
                retouched: Some(record.retouched()),
                image_type: Some(record.image_type()),
                verified: Some(record.verified()),
            })
            .collect()
    }

    pub async fn save(&self, store: &dyn SessionStore) -> Result<()> {
        store.save(&self.snapshot()).await
    }

    /// Bring back a previously saved session.
    ///
    /// Stored fields win; anything not stored is derived from the filename
    /// as on import. Stored records are taken in order: the n-th one for a
    /// source path updates the n-th record in the batch with that path, and
    /// is added as a new record if there is none, so duplicated records come
    /// back as separate records. Stored records whose source file is gone
    /// are dropped.
    #[instrument(skip_all)]
    pub async fn restore(&mut self, store: &dyn SessionStore) -> Result<RestoreSummary> {
        let stored = store.load().await?;
        let mut summary = RestoreSummary::default();
        let mut seen: HashMap<PathBuf, usize> = HashMap::new();
        for saved in stored {
            if !tokio::fs::try_exists(&saved.path).await.unwrap_or(false) {
                debug!(path = %saved.path.display(), "source file is gone");
                summary.missing += 1;
                continue;
            }
            let nth = seen.entry(saved.path.clone()).or_default();
            let existing = self
                .records
                .iter()
                .enumerate()
                .filter(|(_, record)| record.asset().path() == saved.path)
                .nth(*nth)
                .map(|(index, _)| index);
            *nth += 1;
            let index = match existing {
                Some(index) => index,
                None => {
                    let Some(asset) = RawAsset::new(&saved.path) else {
                        summary.missing += 1;
                        continue;
                    };
                    let id = self.next_id();
                    let record = Record::new(id, asset, saved.image_type.unwrap_or(self.batch_type));
                    self.log_new(&record);
                    self.records.push(record);
                    self.records.len() - 1
                },
            };
            apply_logged(&mut self.records[index], stored_edits(saved), self.audit.as_ref());
            summary.restored += 1;
        }
        self.sort();
        if summary.restored > 0 || summary.missing > 0 {
            self.audit.record(
                Action::Restore,
                BATCH_SUBJECT,
                &format!(
                    "loaded {} files from previous session, {} no longer exist",
                    summary.restored, summary.missing
                ),
            );
        }
        Ok(summary)
    }
}

fn stored_edits(saved: StoredRecord) -> Vec<Edit> {
    let mut edits = Vec::new();
    edits.extend(saved.description.map(Edit::Description));
    edits.extend(saved.request_id.map(Edit::RequestId));
    edits.extend(saved.company.map(Edit::Company));
    edits.extend(saved.sequence.map(Edit::Sequence));
    edits.extend(saved.retouched.map(Edit::Retouched));
    edits.extend(saved.image_type.map(Edit::ImageType));
    edits.extend(saved.verified.map(Edit::Verified));
    edits
}

fn name_result(record: &Record) -> String {
    match record.canonical_name() {
        Some(name) => name.to_string(),
        None => "cannot generate valid filename".to_string(),
    }
}

/// Apply `edits`, logging the new canonical name if it changed. Returns a
/// description of each edit that changed something.
fn apply_logged(record: &mut Record, edits: impl IntoIterator<Item = Edit>, audit: &dyn AuditLog) -> Vec<String> {
    let before = record.canonical_name().map(str::to_string);
    let mut changes = Vec::new();
    for edit in edits {
        let description = edit.to_string();
        if record.apply(edit) {
            changes.push(description);
        }
    }
    if record.canonical_name() != before.as_deref() {
        audit.record(Action::Generate, record.asset().filename(), &name_result(record));
    }
    changes
}
