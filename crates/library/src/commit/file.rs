use crate::commit::conflict::copy_disambiguated;
use crate::commit::error::{ErrorKind as CommitErrorKind, Result as CommitResult};
use crate::record::{CommitOutcome, Record};
use exn::ResultExt;
use movr_extract::models::ImageType;
use movr_storage::error::ErrorKind as StorageErrorKind;
use movr_storage::{BackendHandle, validate_file_name};
use std::path::{Path, PathBuf};
use time::UtcDateTime;
use tracing::instrument;

/// Copies a single record's source file into the destination tree.
///
/// The file lands in the image type's folder under its canonical name:
///
/// - **[`CommitOutcome::SkippedNoName`]**: there is no canonical name; nothing
///   is touched.
/// - **[`CommitOutcome::Committed`]**: copied under the canonical name.
/// - **[`CommitOutcome::CommittedRenamed`]**: the canonical name was already
///   taken, so the copy gets a timestamp suffix instead. Whatever was there
///   is left alone.
/// - **[`CommitOutcome::Failed`]**: anything else went wrong; the reason is
///   the error text.
///
/// The source file is only ever read.
#[instrument(level = "debug", skip_all, fields(record = %record.id(), source = %record.asset().path().display()))]
pub async fn commit_record(backend: &BackendHandle, record: &Record) -> CommitOutcome {
    let Some(name) = record.canonical_name() else {
        return CommitOutcome::SkippedNoName;
    };
    match commit_record_inner(backend, record.asset().path(), record.image_type(), name).await {
        Ok(outcome) => outcome,
        Err(err) => CommitOutcome::Failed((*err).to_string()),
    }
}

pub(crate) async fn commit_record_inner(
    backend: &BackendHandle,
    source: &Path,
    image_type: ImageType,
    name: &str,
) -> CommitResult<CommitOutcome> {
    validate_file_name(name).or_raise(|| CommitErrorKind::InvalidName(name.to_string()))?;
    let directory = PathBuf::from(image_type.default_destination());
    backend.create_dir_all(&directory).await.map_err(CommitErrorKind::directory)?;

    let path = directory.join(name);
    match backend.copy_new(source, &path).await {
        Ok(_) => Ok(CommitOutcome::Committed(path)),
        // Never overwrite. The occupant may be an earlier run's output or
        // another file in this batch with the same canonical name.
        Err(err) if matches!(&*err, StorageErrorKind::AlreadyExists(_)) => {
            let timestamp = UtcDateTime::now().unix_timestamp();
            let renamed = copy_disambiguated(backend, source, &directory, name, timestamp).await?;
            Ok(CommitOutcome::CommittedRenamed(renamed))
        },
        Err(err) => Err(CommitErrorKind::copy(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Edit, RawAsset, RecordId};
    use movr_storage::backend::MockBackend;
    use std::sync::Arc;

    fn source(dir: &Path, filename: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(filename);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn record(path: &Path, image_type: ImageType) -> Record {
        Record::new(RecordId(1), RawAsset::new(path).unwrap(), image_type)
    }

    #[tokio::test]
    async fn test_committed_under_canonical_name() {
        let dir = tempfile::tempdir().unwrap();
        let raw = source(dir.path(), "MO123456_K123456_005.jpg", b"pixels");
        let mock = Arc::new(MockBackend::default());
        let backend: BackendHandle = mock.clone();

        let outcome = commit_record(&backend, &record(&raw, ImageType::Lifestyle)).await;
        let expected = PathBuf::from("Lifestyle Images/IMG_QVC_PH_LS_MO123456_K123456_005.jpg");
        assert_eq!(outcome, CommitOutcome::Committed(expected.clone()));
        assert_eq!(mock.contents(&expected).await.unwrap(), b"pixels");
        assert!(raw.exists());
    }

    #[tokio::test]
    async fn test_skipped_without_name() {
        let dir = tempfile::tempdir().unwrap();
        let raw = source(dir.path(), "DSC_0001.jpg", b"pixels");
        let mock = Arc::new(MockBackend::default());
        let backend: BackendHandle = mock.clone();

        let outcome = commit_record(&backend, &record(&raw, ImageType::Product)).await;
        assert_eq!(outcome, CommitOutcome::SkippedNoName);
        assert!(mock.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_existing_file_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let raw = source(dir.path(), "MO123456_K123456 a.jpg", b"new");
        let mock = Arc::new(MockBackend::with_files([("Headshots/IMG_QVC_PH_HS_MO123456_K123456.jpg", b"old")]));
        let backend: BackendHandle = mock.clone();

        let outcome = commit_record(&backend, &record(&raw, ImageType::Headshot)).await;
        let CommitOutcome::CommittedRenamed(path) = outcome else {
            panic!("expected a renamed commit");
        };
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("IMG_QVC_PH_HS_MO123456_K123456_"));
        assert!(name.ends_with(".jpg"));
        assert_eq!(mock.contents("Headshots/IMG_QVC_PH_HS_MO123456_K123456.jpg").await.unwrap(), b"old");
        assert_eq!(mock.contents(&path).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_unwritable_folder_fails_with_reason() {
        let dir = tempfile::tempdir().unwrap();
        let raw = source(dir.path(), "MO123456_K123456 a.jpg", b"pixels");
        let backend: BackendHandle = Arc::new(MockBackend::default().deny("Product Images"));

        let outcome = commit_record(&backend, &record(&raw, ImageType::Product)).await;
        assert_eq!(
            outcome,
            CommitOutcome::Failed("could not create destination folder: permission denied: Product Images".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("MO123456_K123456 a.jpg");
        let backend: BackendHandle = Arc::new(MockBackend::default());

        let outcome = commit_record(&backend, &record(&raw, ImageType::Product)).await;
        let CommitOutcome::Failed(reason) = outcome else {
            panic!("expected a failure");
        };
        assert!(reason.starts_with("could not copy file: file not found"));
    }

    #[tokio::test]
    async fn test_name_with_separator_fails() {
        let dir = tempfile::tempdir().unwrap();
        let raw = source(dir.path(), "MO123456_K123456 a.jpg", b"pixels");
        let mut record = record(&raw, ImageType::Product);
        record.apply(Edit::Description("K1/23456".to_string()));
        let mock = Arc::new(MockBackend::default());
        let backend: BackendHandle = mock.clone();

        let outcome = commit_record(&backend, &record).await;
        let CommitOutcome::Failed(reason) = outcome else {
            panic!("expected a failure");
        };
        assert!(reason.starts_with("invalid destination filename"));
        assert!(mock.paths().await.is_empty());
    }
}
