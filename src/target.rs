//! # Aggregate Targets
//!
//! A [`DataFile`] owns the merge configuration of one output file: the tag
//! that selects its fragments, how they are ordered, which format they merge
//! into, and the file options handed to the writer.
//!
//! ## Evaluation
//!
//! Content is computed by a fixed pipeline:
//!
//! 1. **Collect** every fragment carrying the target's tag.
//! 2. **Resolve** each fragment to bytes.
//! 3. **Order** the resolved fragments by sort key.
//! 4. **Merge** the ordered contents under the target's format.
//!
//! The result is memoized in an [`EvalState`] for the rest of the evaluation
//! cycle. [`DataFile::begin_cycle`] clears it so the next cycle recomputes.
//! Targets with `ensure: absent` never run the pipeline.

use std::path::PathBuf;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::collect;
use crate::config::DataFileDecl;
use crate::error::{Error, Result};
use crate::filesystem::{Backup, FileEnsure, FileOptions, FileSpec, SelinuxContext};
use crate::fragment::Fragment;
use crate::merge::{merge, Format};
use crate::ordering::{order_by, OrderMode};
use crate::path::is_absolute_path;
use crate::resolve::ResolvedFragment;
use crate::source::SourceProvider;

/// Whether the target file should exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

/// Memoized content of a target within one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EvalState {
    #[default]
    Uncomputed,
    Computing,
    Computed(Vec<u8>),
}

/// A validated target file declaration.
#[derive(Debug, Clone)]
pub struct DataFile {
    path: String,
    title: Option<String>,
    tag: String,
    ensure: Ensure,
    order_mode: OrderMode,
    format: Format,
    force: bool,
    ensure_newline: bool,
    options: FileOptions,
    state: EvalState,
}

impl DataFile {
    /// Validate a raw declaration.
    ///
    /// `path` defaults to `title`. Either way it must be fully qualified in
    /// POSIX or Windows style.
    ///
    /// # Errors
    ///
    /// `Error::Validation` naming the target for a missing or relative path, a
    /// missing tag, or a malformed `mode` or `backup`.
    pub fn from_decl(decl: DataFileDecl) -> Result<Self> {
        let name = decl
            .title
            .clone()
            .or_else(|| decl.path.clone())
            .unwrap_or_default();
        let resource = format!("DataFile[{}]", name);

        let path = decl
            .path
            .or_else(|| decl.title.clone())
            .ok_or_else(|| Error::validation(&resource, "Path not set"))?;
        if !is_absolute_path(&path) {
            return Err(Error::validation(
                &resource,
                format!("File paths must be fully qualified, not '{}'", path),
            ));
        }
        let tag = decl
            .tag
            .ok_or_else(|| Error::validation(&resource, "Tag not set"))?;

        let mode = match &decl.mode {
            Some(value) => Some(parse_mode(value).map_err(|m| Error::validation(&resource, m))?),
            None => None,
        };
        let backup = match &decl.backup {
            Some(value) => parse_backup(value).map_err(|m| Error::validation(&resource, m))?,
            None => Backup::default(),
        };

        let options = FileOptions {
            owner: decl.owner,
            group: decl.group,
            mode,
            replace: decl.replace.unwrap_or(true),
            backup,
            validate_cmd: decl.validate_cmd,
            show_diff: decl.show_diff.unwrap_or(false),
            selinux: SelinuxContext {
                ignore_defaults: decl.selinux_ignore_defaults,
                selrange: decl.selrange,
                selrole: decl.selrole,
                seltype: decl.seltype,
                seluser: decl.seluser,
            },
        };

        Ok(Self {
            path,
            title: decl.title,
            tag,
            ensure: decl.ensure.unwrap_or_default(),
            order_mode: decl.order.unwrap_or_default(),
            format: decl.format.unwrap_or_default(),
            force: decl.force.unwrap_or(false),
            ensure_newline: decl.ensure_newline.unwrap_or(false),
            options,
            state: EvalState::Uncomputed,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn ensure(&self) -> Ensure {
        self.ensure
    }

    pub fn order_mode(&self) -> OrderMode {
        self.order_mode
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn ensure_newline(&self) -> bool {
        self.ensure_newline
    }

    pub fn options(&self) -> &FileOptions {
        &self.options
    }

    pub fn state(&self) -> &EvalState {
        &self.state
    }

    /// Whether `reference` names this target by path or title.
    pub fn identifies(&self, reference: &str) -> bool {
        self.path == reference || self.title.as_deref() == Some(reference)
    }

    /// Start a new evaluation cycle, dropping memoized content.
    pub fn begin_cycle(&mut self) {
        self.state = EvalState::Uncomputed;
    }

    /// The target's content for the current cycle.
    ///
    /// The pipeline runs on the first call; later calls in the same cycle
    /// return the memoized bytes. A failed computation leaves the target
    /// uncomputed.
    ///
    /// # Errors
    ///
    /// Resolution, format and merge errors from the pipeline, or
    /// `Error::EvaluationCycle` if the content is requested while it is being
    /// computed.
    pub fn content(&mut self, fragments: &[Fragment], sources: &dyn SourceProvider) -> Result<&[u8]> {
        match self.state {
            EvalState::Computed(_) => {}
            EvalState::Computing => {
                return Err(Error::EvaluationCycle {
                    target: self.path.clone(),
                })
            }
            EvalState::Uncomputed => {
                self.state = EvalState::Computing;
                match self.compute(fragments, sources) {
                    Ok(content) => self.state = EvalState::Computed(content),
                    Err(err) => {
                        self.state = EvalState::Uncomputed;
                        return Err(err);
                    }
                }
            }
        }

        match &self.state {
            EvalState::Computed(content) => Ok(content.as_slice()),
            _ => Err(Error::EvaluationCycle {
                target: self.path.clone(),
            }),
        }
    }

    fn compute(&self, fragments: &[Fragment], sources: &dyn SourceProvider) -> Result<Vec<u8>> {
        let members = collect(fragments, &self.tag);
        debug!(
            "Collected {} fragment(s) with tag '{}' for {}",
            members.len(),
            self.tag,
            self.path
        );

        let resolved = members
            .into_iter()
            .map(|fragment| ResolvedFragment::resolve(fragment, sources, self.ensure_newline))
            .collect::<Result<Vec<_>>>()?;

        let ordered = order_by(resolved, self.order_mode, |resolved| resolved.fragment);
        for (key, _) in &ordered {
            debug!("{}: merging {}", self.path, key);
        }

        merge(
            ordered
                .iter()
                .map(|(_, resolved)| (resolved.fragment.name(), resolved.content.as_slice())),
            self.format,
            self.force,
        )
    }

    /// Build the `FileSpec` handed to the file writer.
    ///
    /// `content` is only carried when it is non-empty.
    pub fn file_spec(&self, content: Option<&[u8]>) -> FileSpec {
        let ensure = match self.ensure {
            Ensure::Present => FileEnsure::File,
            Ensure::Absent => FileEnsure::Absent,
        };
        FileSpec {
            path: PathBuf::from(&self.path),
            ensure,
            options: self.options.clone(),
            content: content.filter(|c| !c.is_empty()).map(<[u8]>::to_vec),
        }
    }

    /// Compute content (when present) and produce the writer spec.
    pub fn evaluate(&mut self, fragments: &[Fragment], sources: &dyn SourceProvider) -> Result<FileSpec> {
        if self.ensure == Ensure::Absent {
            debug!("{} is absent, skipping content", self.path);
            return Ok(self.file_spec(None));
        }
        let content = self.content(fragments, sources)?.to_vec();
        Ok(self.file_spec(Some(&content)))
    }
}

/// Parse an octal mode given as `"0644"` or `644`.
fn parse_mode(value: &serde_yaml::Value) -> std::result::Result<u32, String> {
    let digits = match value {
        serde_yaml::Value::String(s) => s.trim().to_string(),
        serde_yaml::Value::Number(n) if n.is_u64() => n.to_string(),
        _ => return Err("Mode must be an octal string or integer".to_string()),
    };
    match u32::from_str_radix(&digits, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(mode),
        _ => Err(format!("Invalid file mode '{}'", digits)),
    }
}

/// `false` disables backups, `true` keeps the default suffix, and a string is
/// used as the suffix.
fn parse_backup(value: &serde_yaml::Value) -> std::result::Result<Backup, String> {
    match value {
        serde_yaml::Value::Null | serde_yaml::Value::Bool(true) => Ok(Backup::default()),
        serde_yaml::Value::Bool(false) => Ok(Backup::Disabled),
        serde_yaml::Value::String(s) if s.is_empty() => Err("Backup suffix is empty".to_string()),
        serde_yaml::Value::String(s) if s.starts_with('.') => Ok(Backup::Suffix(s.clone())),
        serde_yaml::Value::String(s) => Ok(Backup::Suffix(format!(".{}", s))),
        _ => Err("Backup must be a suffix string or false".to_string()),
    }
}
