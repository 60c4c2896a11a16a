//! File output
//!
//! Computing content is only half the job; this module hands the result to
//! something that owns real files. [`FileWriter`] is that seam:
//!
//! - [`MemoryFS`] keeps files in memory. It backs dry runs and tests.
//! - [`DiskWriter`] writes to the host filesystem, replacing files atomically
//!   and honoring the file options declared on the target.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::path::{backup_path, staging_path};

/// Backup behavior when an existing file is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backup {
    Disabled,
    /// Copy the previous content to `<path><suffix>`.
    Suffix(String),
}

impl Default for Backup {
    fn default() -> Self {
        Backup::Suffix(".bak".to_string())
    }
}

/// SELinux context fields passed through from the target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelinuxContext {
    pub ignore_defaults: Option<bool>,
    pub selrange: Option<String>,
    pub selrole: Option<String>,
    pub seltype: Option<String>,
    pub seluser: Option<String>,
}

impl SelinuxContext {
    pub fn is_empty(&self) -> bool {
        self.ignore_defaults.is_none()
            && self.selrange.is_none()
            && self.selrole.is_none()
            && self.seltype.is_none()
            && self.seluser.is_none()
    }
}

/// File metadata and write policy declared on a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOptions {
    pub owner: Option<String>,
    pub group: Option<String>,
    pub mode: Option<u32>,
    /// Replace an existing file. When false an existing file is left alone.
    pub replace: bool,
    pub backup: Backup,
    pub validate_cmd: Option<String>,
    pub show_diff: bool,
    pub selinux: SelinuxContext,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            owner: None,
            group: None,
            mode: None,
            replace: true,
            backup: Backup::default(),
            validate_cmd: None,
            show_diff: false,
            selinux: SelinuxContext::default(),
        }
    }
}

/// Whether the file should exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEnsure {
    File,
    Absent,
}

/// Everything a writer needs to bring one file into its desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub path: PathBuf,
    pub ensure: FileEnsure,
    pub options: FileOptions,
    /// Desired content. `None` leaves the content of an existing file alone.
    pub content: Option<Vec<u8>>,
}

/// What a writer did with a [`FileSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Created,
    Updated,
    Unchanged,
    /// The file exists and `replace` is false.
    Kept,
    Removed,
    AlreadyAbsent,
}

impl FileOutcome {
    pub fn changed(self) -> bool {
        matches!(
            self,
            FileOutcome::Created | FileOutcome::Updated | FileOutcome::Removed
        )
    }
}

/// Destination for computed target files.
pub trait FileWriter {
    fn apply(&mut self, spec: &FileSpec) -> Result<FileOutcome>;
}

/// Represents a file with content and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
    /// File permissions
    pub permissions: u32,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            permissions: 0o644,
        }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str) -> Self {
        Self::new(content.as_bytes().to_vec())
    }

    /// Content as UTF-8 text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

/// In-memory filesystem
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    files: BTreeMap<PathBuf, File>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the files that currently exist on disk at `paths`.
    ///
    /// Missing paths are skipped, so applying specs to the snapshot reports
    /// the same outcomes a [`DiskWriter`] would.
    pub fn from_disk<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut memory = Self::new();
        for path in paths {
            let path = path.as_ref();
            if !path.is_file() {
                continue;
            }
            let content = fs::read(path).map_err(|e| Error::Filesystem {
                message: format!("Failed to read '{}': {}", path.display(), e),
            })?;
            let mut file = File::new(content);
            file.permissions = disk_mode(path)?.unwrap_or(file.permissions);
            memory.add_file(path, file);
        }
        Ok(memory)
    }

    /// Add or update a file
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, file: File) {
        self.files.insert(path.as_ref().to_path_buf(), file);
    }

    /// Add a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) {
        self.add_file(path, File::from_string(content));
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        self.files.get(path.as_ref())
    }

    /// Remove a file
    pub fn remove_file<P: AsRef<Path>>(&mut self, path: P) -> Option<File> {
        self.files.remove(path.as_ref())
    }

    /// Check if a file exists
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.contains_key(path.as_ref())
    }

    /// List all files in path order
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over all files as (path, file) pairs
    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &File)> {
        self.files.iter()
    }
}

impl FileWriter for MemoryFS {
    fn apply(&mut self, spec: &FileSpec) -> Result<FileOutcome> {
        if spec.ensure == FileEnsure::Absent {
            return Ok(match self.remove_file(&spec.path) {
                Some(_) => FileOutcome::Removed,
                None => FileOutcome::AlreadyAbsent,
            });
        }

        let permissions = spec.options.mode.unwrap_or(0o644);
        let outcome = match (self.files.get_mut(&spec.path), &spec.content) {
            (Some(_), _) if !spec.options.replace => FileOutcome::Kept,
            (Some(file), Some(content)) if &file.content == content => {
                file.permissions = permissions;
                FileOutcome::Unchanged
            }
            (Some(file), Some(content)) => {
                file.content = content.clone();
                file.permissions = permissions;
                FileOutcome::Updated
            }
            (Some(file), None) => {
                file.permissions = permissions;
                FileOutcome::Unchanged
            }
            (None, content) => {
                let mut file = File::new(content.clone().unwrap_or_default());
                file.permissions = permissions;
                self.add_file(&spec.path, file);
                FileOutcome::Created
            }
        };
        Ok(outcome)
    }
}

/// Writes target files to the host filesystem.
///
/// New content is written to a hidden staging file next to the target, run
/// through `validate_cmd` if one is set, and then renamed over the target.
/// `owner`, `group`, and SELinux fields are not applied.
#[derive(Debug, Clone, Default)]
pub struct DiskWriter;

impl DiskWriter {
    pub fn new() -> Self {
        Self
    }

    fn remove(&self, path: &Path) -> Result<FileOutcome> {
        if !path.exists() {
            return Ok(FileOutcome::AlreadyAbsent);
        }
        fs::remove_file(path).map_err(|e| Error::Filesystem {
            message: format!("Failed to remove file '{}': {}", path.display(), e),
        })?;
        info!("Removed {}", path.display());
        Ok(FileOutcome::Removed)
    }

    fn replace_content(&self, spec: &FileSpec, content: &[u8], existed: bool) -> Result<()> {
        let path = &spec.path;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", parent.display(), e),
            })?;
        }

        let staged = staging_path(path);
        fs::write(&staged, content).map_err(|e| Error::Filesystem {
            message: format!("Failed to write file '{}': {}", staged.display(), e),
        })?;

        let result = self.commit_staged(spec, &staged, existed);
        if result.is_err() {
            let _ = fs::remove_file(&staged);
        }
        result
    }

    fn commit_staged(&self, spec: &FileSpec, staged: &Path, existed: bool) -> Result<()> {
        let path = &spec.path;
        if let Some(command) = &spec.options.validate_cmd {
            run_validate_cmd(command, path, staged)?;
        }

        if existed {
            if let Backup::Suffix(suffix) = &spec.options.backup {
                let backup = backup_path(path, suffix);
                fs::copy(path, &backup).map_err(|e| Error::Filesystem {
                    message: format!("Failed to back up '{}': {}", path.display(), e),
                })?;
                debug!("Backed up {} to {}", path.display(), backup.display());
            }
        }

        fs::rename(staged, path).map_err(|e| Error::Filesystem {
            message: format!("Failed to replace '{}': {}", path.display(), e),
        })
    }
}

impl FileWriter for DiskWriter {
    fn apply(&mut self, spec: &FileSpec) -> Result<FileOutcome> {
        if spec.ensure == FileEnsure::Absent {
            return self.remove(&spec.path);
        }

        let path = &spec.path;
        let existed = path.exists();
        if existed && !spec.options.replace {
            debug!("{} exists and replace is false, leaving it", path.display());
            return Ok(FileOutcome::Kept);
        }

        let current = if existed { Some(fs::read(path)?) } else { None };
        let desired = match (&spec.content, &current) {
            (Some(content), _) => Some(content.as_slice()),
            (None, None) => Some(&[][..]),
            (None, Some(_)) => None,
        };

        let outcome = match desired {
            Some(content) if current.as_deref() != Some(content) => {
                if spec.options.show_diff {
                    log_diff(path, current.as_deref().unwrap_or_default(), content);
                }
                self.replace_content(spec, content, existed)?;
                if existed {
                    info!("Updated {}", path.display());
                    FileOutcome::Updated
                } else {
                    info!("Created {}", path.display());
                    FileOutcome::Created
                }
            }
            _ => FileOutcome::Unchanged,
        };

        if let Some(mode) = spec.options.mode {
            set_mode(path, mode)?;
        }
        if spec.options.owner.is_some()
            || spec.options.group.is_some()
            || !spec.options.selinux.is_empty()
        {
            warn!(
                "{}: owner, group and SELinux settings are not applied by the disk writer",
                path.display()
            );
        }

        Ok(outcome)
    }
}

fn run_validate_cmd(command: &str, path: &Path, staged: &Path) -> Result<()> {
    let expanded = command.replace('%', &staged.to_string_lossy());
    debug!("Validating {} with: {}", path.display(), expanded);

    #[cfg(windows)]
    let output = Command::new("cmd").args(["/C", &expanded]).output()?;
    #[cfg(not(windows))]
    let output = Command::new("sh").args(["-c", &expanded]).output()?;

    if output.status.success() {
        Ok(())
    } else {
        Err(Error::ValidateCommand {
            path: path.display().to_string(),
            command: expanded,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::Filesystem {
        message: format!("Failed to set permissions on '{}': {}", path.display(), e),
    })
}

#[cfg(unix)]
fn disk_mode(path: &Path) -> Result<Option<u32>> {
    use std::os::unix::fs::PermissionsExt;
    Ok(Some(fs::metadata(path)?.permissions().mode() & 0o7777))
}

#[cfg(not(unix))]
fn disk_mode(_path: &Path) -> Result<Option<u32>> {
    Ok(None)
}

#[cfg(not(unix))]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    debug!("{}: mode {:o} is not applied on this platform", path.display(), mode);
    Ok(())
}

fn log_diff(path: &Path, old: &[u8], new: &[u8]) {
    let old = String::from_utf8_lossy(old);
    let new = String::from_utf8_lossy(new);
    info!("--- {}", path.display());
    info!("+++ {}", path.display());
    for line in diff_lines(&old, &new) {
        info!("{}", line);
    }
}

/// Line diff in order, from a longest-common-subsequence table. Unchanged
/// lines are prefixed with a space.
fn diff_lines(old: &str, new: &str) -> Vec<String> {
    let old: Vec<&str> = old.lines().collect();
    let new: Vec<&str> = new.lines().collect();

    let mut lcs = vec![vec![0usize; new.len() + 1]; old.len() + 1];
    for i in (0..old.len()).rev() {
        for j in (0..new.len()).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut lines = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            lines.push(format!(" {}", old[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            lines.push(format!("-{}", old[i]));
            i += 1;
        } else {
            lines.push(format!("+{}", new[j]));
            j += 1;
        }
    }
    lines.extend(old[i..].iter().map(|line| format!("-{}", line)));
    lines.extend(new[j..].iter().map(|line| format!("+{}", line)));
    lines
}
