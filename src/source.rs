//! Source providers
//!
//! Fragments that declare `source` instead of inline `content` get their bytes
//! from a [`SourceProvider`]. The provider only answers two questions: does an
//! identifier exist, and what are its bytes.
//!
//! - [`LocalSource`] reads plain paths (relative ones against a base
//!   directory) and `file://` URLs.
//! - [`MemorySource`] serves a fixed map and is used in tests and dry runs.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use url::Url;

use crate::error::{Error, Result};

/// Resolves source identifiers to bytes.
pub trait SourceProvider {
    /// Whether the identifier names retrievable content.
    fn exists(&self, source: &str) -> Result<bool>;

    /// The content behind an identifier.
    fn fetch(&self, source: &str) -> Result<Vec<u8>>;
}

/// Reads sources from the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalSource {
    base_dir: PathBuf,
}

impl LocalSource {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Map an identifier to a local path. `None` means the identifier is not
    /// a URL this provider serves.
    fn locate(&self, source: &str) -> Result<Option<PathBuf>> {
        if source.contains("://") {
            let url = match Url::parse(source) {
                Ok(url) => url,
                Err(e) => {
                    debug!("Skipping unparsable source URL '{}': {}", source, e);
                    return Ok(None);
                }
            };
            if url.scheme() != "file" {
                debug!("Unsupported source scheme '{}' in {}", url.scheme(), source);
                return Ok(None);
            }
            return url.to_file_path().map(Some).map_err(|_| Error::Filesystem {
                message: format!("Not a local file URL: {}", source),
            });
        }

        let path = Path::new(source);
        if path.is_absolute() {
            Ok(Some(path.to_path_buf()))
        } else {
            Ok(Some(self.base_dir.join(path)))
        }
    }
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::new(".")
    }
}

impl SourceProvider for LocalSource {
    fn exists(&self, source: &str) -> Result<bool> {
        Ok(self.locate(source)?.is_some_and(|path| path.is_file()))
    }

    fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        let path = self.locate(source)?.ok_or_else(|| Error::Filesystem {
            message: format!("Unsupported source: {}", source),
        })?;
        fs::read(&path).map_err(|e| Error::Filesystem {
            message: format!("Failed to read source '{}': {}", path.display(), e),
        })
    }
}

/// Serves sources from memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style.
    pub fn with(mut self, source: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(source, content);
        self
    }

    pub fn insert(&mut self, source: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.entries.insert(source.into(), content.into());
    }
}

impl SourceProvider for MemorySource {
    fn exists(&self, source: &str) -> Result<bool> {
        Ok(self.entries.contains_key(source))
    }

    fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        self.entries.get(source).cloned().ok_or_else(|| Error::Filesystem {
            message: format!("Source not found: {}", source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_relative_and_absolute_paths() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "alpha").unwrap();
        let source = LocalSource::new(temp.path());

        assert!(source.exists("a.txt").unwrap());
        assert_eq!(source.fetch("a.txt").unwrap(), b"alpha");

        let absolute = temp.path().join("a.txt");
        assert!(source.exists(&absolute.to_string_lossy()).unwrap());
        assert!(!source.exists("missing.txt").unwrap());
    }

    #[test]
    fn test_local_directories_do_not_exist_as_sources() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("dir")).unwrap();
        assert!(!LocalSource::new(temp.path()).exists("dir").unwrap());
    }

    #[test]
    fn test_local_file_url() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("b.txt");
        fs::write(&path, "beta").unwrap();
        let url = Url::from_file_path(&path).unwrap().to_string();

        let source = LocalSource::default();
        assert!(source.exists(&url).unwrap());
        assert_eq!(source.fetch(&url).unwrap(), b"beta");
    }

    #[test]
    fn test_local_other_schemes_are_absent() {
        let source = LocalSource::default();
        assert!(!source.exists("puppet:///modules/app/defaults.yaml").unwrap());
        assert!(source.fetch("https://example.com/x").is_err());
    }

    #[test]
    fn test_local_unparsable_url_is_absent() {
        let source = LocalSource::default();
        assert!(!source.exists("http://[broken/x.yaml").unwrap());
        assert!(source.fetch("http://[broken/x.yaml").is_err());
    }

    #[test]
    fn test_local_fetch_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = LocalSource::new(temp.path()).fetch("nope").unwrap_err();
        assert!(err.to_string().contains("Failed to read source"));
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with("one", "1").with("two", b"2".to_vec());
        assert!(source.exists("one").unwrap());
        assert!(!source.exists("three").unwrap());
        assert_eq!(source.fetch("two").unwrap(), b"2");
        assert!(source.fetch("three").is_err());
    }
}
