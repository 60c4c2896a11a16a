//! # Manifest Schema and Parsing
//!
//! This module defines the declaration surface of `datafile`: the YAML manifest
//! that lists target files and the fragments feeding them.
//!
//! ## Key Components
//!
//! - **`Manifest`**: The whole file, with a `targets` and a `fragments` list.
//! - **`DataFileDecl`**: One target file as written in the manifest.
//! - **`FragmentDecl`**: One fragment as written in the manifest.
//!
//! Declarations are raw: every field is optional or loosely typed so that
//! missing or malformed values surface as validation errors naming the
//! resource, instead of generic deserialization errors. [`Manifest::into_catalog`]
//! validates every declaration and assembles the catalog.
//!
//! ## Example
//!
//! ```yaml
//! targets:
//!   - path: /etc/app/config.yaml
//!     tag: app
//!     format: yaml
//!
//! fragments:
//!   - name: defaults
//!     target: /etc/app/config.yaml
//!     tag: app
//!     order: 1
//!     content: |
//!       log_level: info
//!   - name: site
//!     target: /etc/app/config.yaml
//!     tag: app
//!     source: [site.yaml, site.default.yaml]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::fragment::Fragment;
use crate::merge::Format;
use crate::ordering::OrderMode;
use crate::target::{DataFile, Ensure};

/// Default manifest file name.
pub const DEFAULT_MANIFEST: &str = "datafile.yaml";

/// One source identifier or a list of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceList {
    One(String),
    Many(Vec<String>),
}

impl SourceList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            SourceList::One(source) => vec![source],
            SourceList::Many(sources) => sources,
        }
    }
}

/// A fragment as declared in the manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FragmentDecl {
    /// Unique fragment name.
    pub name: String,
    /// Path or title of the target file.
    #[serde(default)]
    pub target: Option<String>,
    /// Tag shared with the target.
    #[serde(default)]
    pub tag: Option<String>,
    /// Ranking key, a string or an integer. Defaults to `10`.
    #[serde(default)]
    pub order: Option<serde_yaml::Value>,
    /// Inline content.
    #[serde(default)]
    pub content: Option<String>,
    /// Source identifier(s) to fetch the content from.
    #[serde(default)]
    pub source: Option<SourceList>,
}

/// A target file as declared in the manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataFileDecl {
    /// Absolute output path. Defaults to `title`.
    #[serde(default)]
    pub path: Option<String>,
    /// Alternative identifier fragments may use as their `target`.
    #[serde(default)]
    pub title: Option<String>,
    /// Tag selecting the member fragments.
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub ensure: Option<Ensure>,
    #[serde(default)]
    pub order: Option<OrderMode>,
    #[serde(default)]
    pub format: Option<Format>,
    /// Let earlier fragments win key collisions instead of failing.
    #[serde(default)]
    pub force: Option<bool>,
    /// Give every fragment a trailing newline.
    #[serde(default)]
    pub ensure_newline: Option<bool>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    /// Octal mode, as a string (`"0644"`) or an integer (`644`).
    #[serde(default)]
    pub mode: Option<serde_yaml::Value>,
    /// Backup suffix, or `false` to disable backups.
    #[serde(default)]
    pub backup: Option<serde_yaml::Value>,
    #[serde(default)]
    pub replace: Option<bool>,
    /// Command run against the staged file; `%` is replaced with its path.
    #[serde(default)]
    pub validate_cmd: Option<String>,
    #[serde(default)]
    pub show_diff: Option<bool>,
    #[serde(default)]
    pub selinux_ignore_defaults: Option<bool>,
    #[serde(default)]
    pub selrange: Option<String>,
    #[serde(default)]
    pub selrole: Option<String>,
    #[serde(default)]
    pub seltype: Option<String>,
    #[serde(default)]
    pub seluser: Option<String>,
}

/// The complete manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub targets: Vec<DataFileDecl>,
    #[serde(default)]
    pub fragments: Vec<FragmentDecl>,
}

impl Manifest {
    /// Validate every declaration and assemble a catalog.
    ///
    /// # Errors
    ///
    /// Returns the first `Error::Validation` encountered, including duplicate
    /// fragment names and duplicate target paths.
    pub fn into_catalog(self) -> Result<Catalog> {
        let targets = self
            .targets
            .into_iter()
            .map(DataFile::from_decl)
            .collect::<Result<Vec<_>>>()?;
        let fragments = self
            .fragments
            .into_iter()
            .map(Fragment::from_decl)
            .collect::<Result<Vec<_>>>()?;
        Catalog::new(targets, fragments)
    }
}

/// Parse a manifest from a YAML string.
///
/// An empty document is an empty manifest.
///
/// # Examples
///
/// ```
/// use datafile::config;
///
/// let manifest = config::parse("targets: []\nfragments: []\n").unwrap();
/// assert!(manifest.targets.is_empty());
/// ```
pub fn parse(yaml_content: &str) -> Result<Manifest> {
    if yaml_content.trim().is_empty() {
        return Ok(Manifest::default());
    }

    serde_yaml::from_str::<Option<Manifest>>(yaml_content)
        .map(Option::unwrap_or_default)
        .map_err(|err| {
            let message = err.to_string();
            let hint = if message.contains("unknown field") {
                Some(
                    "Targets accept path, title, tag, ensure, order, format, force, \
                     ensure_newline and file options; fragments accept name, target, \
                     tag, order, content and source"
                        .to_string(),
                )
            } else {
                None
            };
            Error::ConfigParse { message, hint }
        })
}

/// Read and parse a manifest file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

/// Read a manifest file and build its catalog.
///
/// Returns the catalog together with the manifest's directory, which is the
/// base for relative `source` paths.
pub fn load<P: AsRef<Path>>(path: P) -> Result<(Catalog, PathBuf)> {
    let path = path.as_ref();
    let catalog = from_file(path)?.into_catalog()?;
    let base_dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((catalog, base_dir))
}
