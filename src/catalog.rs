//! # Catalog
//!
//! The read-only collection of every declared target and fragment for one
//! evaluation. Targets are looked up by path or title; fragments are selected
//! by tag with [`collect`].
//!
//! Building a catalog checks that fragment names and target paths are unique.
//! A fragment whose `target` names no known target is not an error: it is
//! reported with a warning and simply never collected unless its tag matches.

use std::collections::HashSet;

use log::warn;

use crate::error::{Error, Result};
use crate::fragment::Fragment;
use crate::target::DataFile;

/// All declared targets and fragments.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    targets: Vec<DataFile>,
    fragments: Vec<Fragment>,
}

impl Catalog {
    /// Assemble a catalog.
    ///
    /// # Errors
    ///
    /// `Error::Validation` for a duplicate fragment name or target path.
    pub fn new(targets: Vec<DataFile>, fragments: Vec<Fragment>) -> Result<Self> {
        let mut paths = HashSet::new();
        for target in &targets {
            if !paths.insert(target.path()) {
                return Err(Error::validation(
                    format!("DataFile[{}]", target.path()),
                    "Duplicate target path",
                ));
            }
        }

        let mut names = HashSet::new();
        for fragment in &fragments {
            if !names.insert(fragment.name()) {
                return Err(Error::validation(
                    format!("Fragment[{}]", fragment.name()),
                    "Duplicate fragment name",
                ));
            }
        }

        let catalog = Self { targets, fragments };
        for fragment in catalog.dangling_fragments() {
            warn!(
                "Target DataFile with path of {} not found in the catalog",
                fragment.target()
            );
        }
        Ok(catalog)
    }

    pub fn targets(&self) -> &[DataFile] {
        &self.targets
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Find a target by path or title.
    pub fn target(&self, reference: &str) -> Option<&DataFile> {
        self.targets.iter().find(|t| t.identifies(reference))
    }

    pub fn target_mut(&mut self, reference: &str) -> Option<&mut DataFile> {
        self.targets.iter_mut().find(|t| t.identifies(reference))
    }

    /// Fragments whose `target` matches no declared target.
    pub fn dangling_fragments(&self) -> Vec<&Fragment> {
        self.fragments
            .iter()
            .filter(|f| self.target(f.target()).is_none())
            .collect()
    }

    /// Mutable targets alongside the shared fragment set.
    pub fn split_mut(&mut self) -> (&mut [DataFile], &[Fragment]) {
        (&mut self.targets, &self.fragments)
    }
}

/// Every fragment carrying `tag`, in declaration order.
pub fn collect<'a>(fragments: &'a [Fragment], tag: &str) -> Vec<&'a Fragment> {
    fragments.iter().filter(|f| f.tag() == tag).collect()
}
