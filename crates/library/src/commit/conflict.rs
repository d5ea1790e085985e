use crate::commit::error::{ErrorKind as CommitErrorKind, Result as CommitResult};
use movr_storage::BackendHandle;
use movr_storage::error::ErrorKind as StorageErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Disambiguated names tried before giving up with
/// [`CommitErrorKind::Conflict`].
pub(crate) const MAX_RENAME_ATTEMPTS: usize = 100;

/// Alternative names for a taken `name`, in the order they are tried:
/// `<stem>_<timestamp>.<ext>`, then `<stem>_<timestamp>_2.<ext>`,
/// `<stem>_<timestamp>_3.<ext>` and so on.
pub(crate) fn candidates(name: &str, timestamp: i64) -> impl Iterator<Item = String> + '_ {
    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (name, None),
    };
    (1..=MAX_RENAME_ATTEMPTS).map(move |attempt| {
        let suffix = if attempt == 1 { timestamp.to_string() } else { format!("{timestamp}_{attempt}") };
        match extension {
            Some(extension) => format!("{stem}_{suffix}.{extension}"),
            None => format!("{stem}_{suffix}"),
        }
    })
}

/// Copies `source` into `directory` under the first free alternative to
/// `name`. Existing files are never touched.
pub(crate) async fn copy_disambiguated(
    backend: &BackendHandle,
    source: &Path,
    directory: &Path,
    name: &str,
    timestamp: i64,
) -> CommitResult<PathBuf> {
    for candidate in candidates(name, timestamp) {
        let path = directory.join(&candidate);
        match backend.copy_new(source, &path).await {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes, "copied under disambiguated name");
                return Ok(path);
            },
            Err(err) if matches!(&*err, StorageErrorKind::AlreadyExists(_)) => continue,
            Err(err) => return Err(CommitErrorKind::copy(err)),
        }
    }
    exn::bail!(CommitErrorKind::Conflict(MAX_RENAME_ATTEMPTS))
}
