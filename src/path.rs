//! Path utilities for target files

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static WINDOWS_DRIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]:[\\/]").expect("valid drive regex"));

static WINDOWS_UNC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\\/]{2}[^\\/]+[\\/][^\\/]+").expect("valid UNC regex"));

/// Whether `path` is a fully qualified POSIX path.
pub fn is_absolute_posix(path: &str) -> bool {
    path.starts_with('/')
}

/// Whether `path` is a fully qualified Windows path (`C:\...`, `C:/...`, or
/// `\\server\share`).
pub fn is_absolute_windows(path: &str) -> bool {
    WINDOWS_DRIVE.is_match(path) || WINDOWS_UNC.is_match(path)
}

/// Whether `path` is fully qualified in either POSIX or Windows style.
///
/// The check is lexical and does not depend on the host platform.
///
/// # Examples
///
/// ```
/// use datafile::path::is_absolute_path;
///
/// assert!(is_absolute_path("/etc/motd"));
/// assert!(is_absolute_path(r"C:\ProgramData\app.ini"));
/// assert!(!is_absolute_path("etc/motd"));
/// ```
pub fn is_absolute_path(path: &str) -> bool {
    is_absolute_posix(path) || is_absolute_windows(path)
}

/// Sibling path used to stage new content before it replaces `path`.
pub fn staging_path(path: &Path) -> PathBuf {
    sibling_with_suffix(path, ".datafile-staging", true)
}

/// Sibling path holding a backup of `path`.
pub fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    sibling_with_suffix(path, suffix, false)
}

fn sibling_with_suffix(path: &Path, suffix: &str, hidden: bool) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = if hidden {
        format!(".{}{}", file_name, suffix)
    } else {
        format!("{}{}", file_name, suffix)
    };
    path.with_file_name(name)
}
