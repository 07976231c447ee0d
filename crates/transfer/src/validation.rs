use std::path::{Component, Path, PathBuf};

use crate::TransferError;

/// Resolves a sender-supplied destination path into a clean relative path.
///
/// `.` components are dropped and `..` is applied lexically. Rejects:
/// - Empty paths, or paths that resolve to the root itself
/// - Absolute paths (Unix `/` or Windows `C:\`)
/// - `..` that climbs above the root
/// - Windows prefix components (`C:`, `\\server`)
///
/// Symlinks are not looked at here; see [`write_file_safe`](crate::write_file_safe).
pub fn normalize_relative_path(file_path: &str) -> Result<PathBuf, TransferError> {
    if file_path.is_empty() {
        return Err(TransferError::InvalidPath("empty path".into()));
    }

    let path = Path::new(file_path);

    if path.is_absolute() {
        return Err(TransferError::InvalidPath(format!(
            "absolute path not allowed: {file_path}"
        )));
    }

    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if !resolved.pop() {
                    return Err(TransferError::InvalidPath(format!(
                        "path escapes the destination root: {file_path}"
                    )));
                }
            }
            Component::Prefix(_) => {
                return Err(TransferError::InvalidPath(format!(
                    "path prefix not allowed: {file_path}"
                )));
            }
            Component::RootDir => {
                return Err(TransferError::InvalidPath(format!(
                    "absolute path not allowed: {file_path}"
                )));
            }
            Component::CurDir => {}
            Component::Normal(part) => resolved.push(part),
        }
    }

    if resolved.as_os_str().is_empty() {
        return Err(TransferError::InvalidPath(format!(
            "path resolves to the destination root: {file_path}"
        )));
    }

    Ok(resolved)
}
