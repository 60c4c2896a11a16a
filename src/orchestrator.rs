//! # Evaluation Cycle
//!
//! Drives one evaluation over a whole [`Catalog`]: every target starts a fresh
//! cycle, computes its content once, and hands the resulting [`FileSpec`] to a
//! [`FileWriter`].
//!
//! Targets are independent. A target that fails is recorded in the
//! [`Report`] and the cycle moves on, so one broken fragment does not keep
//! unrelated files from being written.
//!
//! [`FileSpec`]: crate::filesystem::FileSpec

use std::path::PathBuf;

use log::{debug, error};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::filesystem::{FileOutcome, FileWriter};
use crate::source::SourceProvider;

/// Outcome of one evaluation cycle.
#[derive(Debug, Default)]
pub struct Report {
    /// Targets handed to the writer, with what the writer did.
    pub applied: Vec<(PathBuf, FileOutcome)>,
    /// Targets that failed, keyed by path.
    pub failed: Vec<(String, Error)>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of files the writer actually changed.
    pub fn changed(&self) -> usize {
        self.applied.iter().filter(|(_, outcome)| outcome.changed()).count()
    }

    /// Turn any failure into `Error::TargetsFailed`.
    pub fn into_result(self) -> Result<Vec<(PathBuf, FileOutcome)>> {
        if self.failed.is_empty() {
            return Ok(self.applied);
        }
        let targets = self
            .failed
            .iter()
            .map(|(path, err)| format!("{} ({})", path, err))
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::TargetsFailed {
            count: self.failed.len(),
            targets,
        })
    }
}

/// Evaluate every target and apply the results.
pub fn execute(
    catalog: &mut Catalog,
    sources: &dyn SourceProvider,
    writer: &mut dyn FileWriter,
) -> Report {
    let mut report = Report::default();
    let (targets, fragments) = catalog.split_mut();

    for target in targets.iter_mut() {
        target.begin_cycle();
        let result = target
            .evaluate(fragments, sources)
            .and_then(|spec| writer.apply(&spec).map(|outcome| (spec.path, outcome)));

        match result {
            Ok((path, outcome)) => {
                debug!("{}: {:?}", path.display(), outcome);
                report.applied.push((path, outcome));
            }
            Err(err) => {
                error!("{}: {}", target.path(), err);
                report.failed.push((target.path().to_string(), err));
            }
        }
    }

    report
}

/// Compute one target's content without writing it.
///
/// # Errors
///
/// `Error::TargetNotFound` if no target has `reference` as its path or title,
/// otherwise any error from the target's pipeline.
pub fn render(catalog: &mut Catalog, reference: &str, sources: &dyn SourceProvider) -> Result<Vec<u8>> {
    let (targets, fragments) = catalog.split_mut();
    let target = targets
        .iter_mut()
        .find(|t| t.identifies(reference))
        .ok_or_else(|| Error::TargetNotFound {
            target: reference.to_string(),
        })?;
    target.begin_cycle();
    Ok(target.content(fragments, sources)?.to_vec())
}
