//! Fragment content resolution

use log::debug;

use crate::error::{Error, Result};
use crate::fragment::{Fragment, FragmentBody};
use crate::source::SourceProvider;

/// A fragment paired with its resolved bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFragment<'a> {
    pub fragment: &'a Fragment,
    pub content: Vec<u8>,
}

impl<'a> ResolvedFragment<'a> {
    pub fn resolve(
        fragment: &'a Fragment,
        sources: &dyn SourceProvider,
        ensure_newline: bool,
    ) -> Result<Self> {
        Ok(Self {
            fragment,
            content: resolve(fragment, sources, ensure_newline)?,
        })
    }
}

/// Produce a fragment's bytes.
///
/// Inline content is used as is. Source candidates are tried in declaration
/// order and the first one that exists wins. With `ensure_newline`, the result
/// ends with exactly one added `\n` if it did not already end with one.
///
/// # Errors
///
/// `Error::Resolution` listing every candidate when none exists.
pub fn resolve(
    fragment: &Fragment,
    sources: &dyn SourceProvider,
    ensure_newline: bool,
) -> Result<Vec<u8>> {
    let mut content = match fragment.body() {
        FragmentBody::Content(content) => content.clone(),
        FragmentBody::Source(candidates) => fetch_first(fragment, candidates, sources)?,
    };
    if ensure_newline {
        ensure_trailing_newline(&mut content);
    }
    Ok(content)
}

fn fetch_first(
    fragment: &Fragment,
    candidates: &[String],
    sources: &dyn SourceProvider,
) -> Result<Vec<u8>> {
    for candidate in candidates {
        if sources.exists(candidate)? {
            debug!("Fragment '{}' resolved from {}", fragment.name(), candidate);
            return sources.fetch(candidate);
        }
    }
    Err(Error::Resolution {
        fragment: fragment.name().to_string(),
        sources: candidates.join(", "),
    })
}

/// Append `\n` unless the content already ends with one.
pub fn ensure_trailing_newline(content: &mut Vec<u8>) {
    if content.last() != Some(&b'\n') {
        content.push(b'\n');
    }
}
