use crate::canonical::{NameParts, canonical_name};
use derive_more::Display;
use movr_extract::models::{Company, ImageType, ParsedMetadata};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Identifies a record within a [`Session`](crate::Session). Never reused.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("#{_0}")]
pub struct RecordId(pub(crate) u64);
impl RecordId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// An imported source file. Never modified once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAsset {
    path: PathBuf,
    filename: String,
    extension: String,
}
impl RawAsset {
    /// Returns `None` if `path` has no UTF-8 file name.
    pub fn new(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let filename = path.file_name()?.to_str()?.to_string();
        let extension =
            path.extension().and_then(|ext| ext.to_str()).map(|ext| ext.to_ascii_lowercase()).unwrap_or_default();
        Some(Self { path, filename, extension })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Lower-cased extension without the dot; empty if there is none.
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// A single change to a record's editable fields.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Edit {
    #[display("description={_0}")]
    Description(String),
    #[display("request_id={_0}")]
    RequestId(String),
    #[display("company={_0}")]
    Company(Company),
    #[display("sequence={_0}")]
    Sequence(String),
    #[display("retouched={_0}")]
    Retouched(bool),
    #[display("image_type={_0}")]
    ImageType(ImageType),
    #[display("verified={_0}")]
    Verified(bool),
}

/// How committing a record turned out. Absent while the record is pending.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No canonical name could be generated, so nothing was copied.
    #[display("skipped: missing required information")]
    SkippedNoName,
    /// Copied under its canonical name.
    #[display("copied to {}", _0.display())]
    Committed(PathBuf),
    /// The canonical name was taken; copied under a disambiguated name.
    #[display("copied to {} (original name existed)", _0.display())]
    CommittedRenamed(PathBuf),
    #[display("error: {_0}")]
    Failed(String),
}
impl CommitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Committed(_) | Self::CommittedRenamed(_))
    }

    /// Where the file was copied to, relative to the destination root.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Committed(path) | Self::CommittedRenamed(path) => Some(path),
            Self::SkippedNoName | Self::Failed(_) => None,
        }
    }
}

/// One imported file and everything the operator has decided about it.
///
/// The canonical name is derived, never set: every change goes through
/// [`apply`](Self::apply), which regenerates it, so it always agrees with the
/// fields it was built from. Outside this crate records are edited through
/// [`Session::edit`](crate::Session::edit), which also writes the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    asset: RawAsset,
    parsed: ParsedMetadata,
    description: String,
    request_id: String,
    company: Company,
    sequence: String,
    retouched: bool,
    image_type: ImageType,
    verified: bool,
    canonical_name: Option<String>,
    outcome: Option<CommitOutcome>,
}
impl Record {
    /// Parse the asset's filename and initialise the editable fields from it.
    pub fn new(id: RecordId, asset: RawAsset, image_type: ImageType) -> Self {
        let parsed = movr_extract::parse(asset.filename());
        let mut record = Self {
            id,
            description: parsed.description.clone().unwrap_or_default(),
            request_id: parsed.request_id.clone().unwrap_or_default(),
            company: parsed.company.unwrap_or_default(),
            sequence: parsed.sequence.clone().unwrap_or_default(),
            retouched: false,
            image_type,
            verified: false,
            canonical_name: None,
            outcome: None,
            asset,
            parsed,
        };
        record.regenerate();
        record
    }

    /// A fresh record for the same source file, carrying over the naming
    /// fields. The description gains a `_copy` suffix so the two do not
    /// collide on commit.
    pub(crate) fn duplicate(&self, id: RecordId) -> Self {
        let mut copy = Self::new(id, self.asset.clone(), self.image_type);
        copy.description =
            if self.description.is_empty() { String::new() } else { format!("{}_copy", self.description) };
        copy.request_id = self.request_id.clone();
        copy.company = self.company;
        copy.sequence = self.sequence.clone();
        copy.regenerate();
        copy
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn asset(&self) -> &RawAsset {
        &self.asset
    }

    /// What the parser made of the original filename.
    pub fn parsed(&self) -> &ParsedMetadata {
        &self.parsed
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn company(&self) -> Company {
        self.company
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn retouched(&self) -> bool {
        self.retouched
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    pub fn canonical_name(&self) -> Option<&str> {
        self.canonical_name.as_deref()
    }

    /// `None` while pending.
    pub fn outcome(&self) -> Option<&CommitOutcome> {
        self.outcome.as_ref()
    }

    /// Apply an edit and regenerate the canonical name. Returns whether
    /// anything actually changed. Leaves no audit entry.
    pub(crate) fn apply(&mut self, edit: Edit) -> bool {
        let changed = match edit {
            Edit::Description(value) => replace(&mut self.description, value),
            Edit::RequestId(value) => replace(&mut self.request_id, value),
            Edit::Company(value) => replace(&mut self.company, value),
            Edit::Sequence(value) => replace(&mut self.sequence, value),
            Edit::Retouched(value) => replace(&mut self.retouched, value),
            Edit::ImageType(value) => replace(&mut self.image_type, value),
            Edit::Verified(value) => replace(&mut self.verified, value),
        };
        if changed {
            self.regenerate();
        }
        changed
    }

    fn name_parts(&self) -> NameParts<'_> {
        NameParts {
            description: &self.description,
            request_id: &self.request_id,
            company: self.company,
            sequence: &self.sequence,
            retouched: self.retouched,
            image_type: self.image_type,
            extension: self.asset.extension(),
        }
    }

    fn regenerate(&mut self) {
        self.canonical_name = canonical_name(&self.name_parts());
        trace!(record = %self.id, name = ?self.canonical_name, "regenerated canonical name");
    }

    pub(crate) fn set_outcome(&mut self, outcome: CommitOutcome) {
        self.outcome = Some(outcome);
    }

    pub(crate) fn reset_outcome(&mut self) {
        self.outcome = None;
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
