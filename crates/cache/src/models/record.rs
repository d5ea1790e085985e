use crate::error::{Error, ErrorKind};
use exn::{OptionExt, ResultExt};
use movr_extract::models::{Company, ImageType};
use std::path::PathBuf;

/// The operator-editable fields of one record, as persisted.
///
/// Every field is optional: `None` means "not stored", and the field is
/// re-derived from the filename when the session is restored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    /// Absolute source path. Not unique: a duplicated record shares its
    /// source with the original.
    pub path: PathBuf,
    pub description: Option<String>,
    pub request_id: Option<String>,
    pub company: Option<Company>,
    pub sequence: Option<String>,
    pub retouched: Option<bool>,
    pub image_type: Option<ImageType>,
    pub verified: Option<bool>,
}
impl StoredRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RecordRow {
    pub(crate) path: String,
    pub(crate) description: Option<String>,
    pub(crate) request_id: Option<String>,
    pub(crate) company: Option<String>,
    pub(crate) sequence: Option<String>,
    pub(crate) retouched: Option<bool>,
    pub(crate) image_type: Option<String>,
    pub(crate) verified: Option<bool>,
}
impl TryFrom<&StoredRecord> for RecordRow {
    type Error = Error;
    fn try_from(record: &StoredRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            path: record.path.to_str().ok_or_raise(|| ErrorKind::InvalidData("path"))?.to_string(),
            description: record.description.clone(),
            request_id: record.request_id.clone(),
            company: record.company.map(|c| c.code().to_string()),
            sequence: record.sequence.clone(),
            retouched: record.retouched,
            image_type: record.image_type.map(|t| t.slug().to_string()),
            verified: record.verified,
        })
    }
}
impl TryFrom<RecordRow> for StoredRecord {
    type Error = Error;
    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        Ok(Self {
            path: PathBuf::from(row.path),
            description: row.description,
            request_id: row.request_id,
            company: row
                .company
                .map(|c| c.parse::<Company>())
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("company"))?,
            sequence: row.sequence,
            retouched: row.retouched,
            image_type: row
                .image_type
                .map(|t| t.parse::<ImageType>())
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("image type"))?,
            verified: row.verified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_to_row() {
        let record = StoredRecord {
            company: Some(Company::Hsn),
            image_type: Some(ImageType::PdLifestyleLite),
            verified: Some(true),
            ..StoredRecord::new("/shoots/raw.jpg")
        };
        let row = RecordRow::try_from(&record).unwrap();
        assert_eq!(row.path, "/shoots/raw.jpg");
        assert_eq!(row.company.as_deref(), Some("HSN"));
        assert_eq!(row.image_type.as_deref(), Some("pd-lifestyle-lite"));
        assert_eq!(row.description, None);
    }

    #[test]
    fn test_row_to_model() {
        let row = RecordRow {
            path: "/shoots/raw.jpg".to_string(),
            description: Some("K123456".to_string()),
            request_id: None,
            company: Some("QVC".to_string()),
            sequence: None,
            retouched: Some(false),
            image_type: Some("food-shoot".to_string()),
            verified: None,
        };
        let record = StoredRecord::try_from(row).unwrap();
        assert_eq!(record.company, Some(Company::Qvc));
        assert_eq!(record.image_type, Some(ImageType::FoodShoot));
        assert_eq!(record.retouched, Some(false));
    }

    #[test]
    fn test_row_with_unknown_company() {
        let row = RecordRow {
            path: "/a.jpg".to_string(),
            description: None,
            request_id: None,
            company: Some("ACME".to_string()),
            sequence: None,
            retouched: None,
            image_type: None,
            verified: None,
        };
        let err = StoredRecord::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("company")));
    }
}
