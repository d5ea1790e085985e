//! Path validation.
//!
//! Destination paths are always relative to the backend root. Folder names
//! and canonical filenames come from lookup tables and operator-edited
//! fields, so they are checked here before anything touches the disk.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path and ensures it never escapes the storage root.
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use movr_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("Lifestyle Images/IMG_QVC_PH_LS_MO1_K123456.jpg").is_ok());
/// assert!(validate_path("Product Photographer > Master Images – Lifestyle").is_ok());
/// assert!(validate_path("a/../b.jpg").is_ok()); // (never leaves the root)
/// // Invalid paths
/// assert!(validate_path("../outside.jpg").is_err());
/// assert!(validate_path("a/../../b").is_err());
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("Headshots/./extra/../IMG.jpg/").unwrap(),
///     Path::new("Headshots/IMG.jpg")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but
                // truncate in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

/// Checks that `name` is a bare file name: exactly one normal path component,
/// with no separators, `.`/`..`, or null bytes.
pub fn validate_file_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(s)), None) if s == name && !name.contains('\0') => Ok(name),
        _ => exn::bail!(ErrorKind::InvalidPath(PathBuf::from(name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate(Path::new("Headshots/IMG.jpg")).unwrap(), Path::new("Headshots/IMG.jpg"));
        assert_eq!(validate(Path::new("simple.jpg")).unwrap(), Path::new("simple.jpg"));
    }

    #[test]
    fn test_path_normalization() {
        assert_eq!(validate(Path::new("a//b//c")).unwrap(), Path::new("a/b/c"));
        assert_eq!(validate(Path::new("a/./b/./c")).unwrap(), Path::new("a/b/c"));
        assert_eq!(validate(Path::new("a/b/..")).unwrap(), Path::new("a"));
        assert_eq!(validate(Path::new("Headshots///")).unwrap(), Path::new("Headshots"));
    }

    #[test]
    fn test_traversal_attempts() {
        assert!(validate(Path::new("../etc/passwd")).is_err());
        assert!(validate(Path::new("a/../../b")).is_err());
        assert!(validate(Path::new("..")).is_err());
    }

    #[test]
    fn test_empty_and_null() {
        assert!(validate(Path::new("")).is_err());
        assert!(validate(Path::new("./")).is_err());
        assert!(validate(Path::new("//")).is_err());
        assert!(validate(Path::new("a\0b")).is_err());
    }

    #[rstest]
    #[case("IMG_QVC_PH_LS_MO1_K123456.jpg", true)]
    #[case("IMG with spaces.JPG", true)]
    #[case("a/b.jpg", false)]
    #[case("../b.jpg", false)]
    #[case("..", false)]
    #[case(".", false)]
    #[case("", false)]
    #[case("/abs.jpg", false)]
    #[case("nul\0.jpg", false)]
    fn test_validate_file_name(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(validate_file_name(name).is_ok(), valid);
    }
}
