use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::TransferError;
use crate::validation::normalize_relative_path;

/// Writes `data` to `relative` below `root` and returns the absolute path.
///
/// - Creates the root and intermediate directories as needed.
/// - Rejects paths that resolve outside the root, lexically or through an
///   existing symlink anywhere along the way (including the target itself).
/// - Nothing is written when validation fails.
pub fn write_file_safe(
    root: &Path,
    relative: &str,
    data: &[u8],
) -> Result<PathBuf, TransferError> {
    let relative = normalize_relative_path(relative)?;

    std::fs::create_dir_all(root)?;
    let root = std::fs::canonicalize(root)?;
    ensure_contained(&root, &relative)?;

    let target = root.join(&relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&target, data)?;

    tracing::debug!(path = %target.display(), bytes = data.len(), "file written");
    Ok(target)
}

/// Walks the existing prefix of `root/relative` and checks that every entry
/// resolves inside `root`. `root` must already be canonical.
fn ensure_contained(root: &Path, relative: &Path) -> Result<(), TransferError> {
    let mut current = root.to_path_buf();
    for component in relative.components() {
        current.push(component);
        match std::fs::symlink_metadata(&current) {
            Ok(_) => {
                let resolved = std::fs::canonicalize(&current).map_err(|e| {
                    TransferError::InvalidPath(format!(
                        "cannot resolve {}: {e}",
                        current.display()
                    ))
                })?;
                if !resolved.starts_with(root) {
                    return Err(TransferError::InvalidPath(format!(
                        "{} resolves outside the destination root",
                        relative.display()
                    )));
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_into_nested_directories() {
        let dir = TempDir::new().unwrap();
        let saved = write_file_safe(dir.path(), "sub/dir/file.txt", b"data").unwrap();

        assert!(saved.is_absolute());
        assert!(saved.ends_with("sub/dir/file.txt"));
        let content = std::fs::read(dir.path().join("sub/dir/file.txt")).unwrap();
        assert_eq!(&content, b"data");
    }

    #[test]
    fn creates_missing_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("not/yet/there");
        write_file_safe(&root, "a.bin", b"x").unwrap();
        assert_eq!(std::fs::read(root.join("a.bin")).unwrap(), b"x");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        write_file_safe(dir.path(), "a.txt", b"old contents").unwrap();
        write_file_safe(dir.path(), "a.txt", b"new").unwrap();
        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"new");
    }

    #[test]
    fn parent_traversal_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        let result = write_file_safe(&root, "../../etc/passwd", b"evil");
        assert!(matches!(result, Err(TransferError::InvalidPath(_))));
        assert!(!dir.path().join("etc").exists());
    }

    #[test]
    fn sibling_escape_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        let result = write_file_safe(&root, "sub/../../sibling.txt", b"evil");
        assert!(matches!(result, Err(TransferError::InvalidPath(_))));
        assert!(!dir.path().join("sibling.txt").exists());
    }

    #[test]
    fn absolute_path_rejected() {
        let dir = TempDir::new().unwrap();
        let outside = dir.path().join("outside.txt");
        let result = write_file_safe(
            &dir.path().join("root"),
            outside.to_str().unwrap(),
            b"evil",
        );
        assert!(matches!(result, Err(TransferError::InvalidPath(_))));
        assert!(!outside.exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_escape_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        let outside = dir.path().join("outside");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        let result = write_file_safe(&root, "link/evil.txt", b"evil");
        assert!(matches!(result, Err(TransferError::InvalidPath(_))));
        assert!(!outside.join("evil.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_target_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir_all(&root).unwrap();
        let outside = dir.path().join("missing.txt");
        std::os::unix::fs::symlink(&outside, root.join("out.txt")).unwrap();

        let result = write_file_safe(&root, "out.txt", b"evil");
        assert!(matches!(result, Err(TransferError::InvalidPath(_))));
        assert!(!outside.exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_inside_root_allowed() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir_all(root.join("real")).unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();

        write_file_safe(&root, "alias/f.txt", b"ok").unwrap();
        assert_eq!(std::fs::read(root.join("real/f.txt")).unwrap(), b"ok");
    }
}
