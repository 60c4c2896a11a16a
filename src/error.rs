//! # Error Handling
//!
//! This module defines the centralized error type for `datafile`. It uses the
//! `thiserror` library to build a single `Error` enum covering every failure
//! mode of declaration loading, content evaluation, and file output.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Evaluation-time variants carry the identity of
//!   the offending fragment, key, or target so a failed cycle can be traced
//!   back to a declaration.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! The variants fall into a few groups:
//!
//! - Construction-time: `Validation`, `ConfigParse`.
//! - Evaluation-time: `Resolution`, `Format`, `MergeConflict`,
//!   `EvaluationCycle`, `TargetNotFound`.
//! - Output: `Filesystem`, `ValidateCommand`.
//! - Cycle summary: `TargetsFailed`.
//! - Wrapped library errors: `Io`, `Yaml`, `Json`, `UrlParse`.

use thiserror::Error;

/// Main error type for datafile operations
#[derive(Error, Debug)]
pub enum Error {
    /// A target or fragment declaration is invalid.
    ///
    /// Raised while turning a raw declaration into a `DataFile` or `Fragment`,
    /// or while assembling declarations into a catalog.
    #[error("Validation error for {resource}: {message}")]
    Validation { resource: String, message: String },

    /// The manifest could not be parsed.
    #[error("Manifest parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the manifest
        hint: Option<String>,
    },

    /// None of a fragment's source candidates could be retrieved.
    #[error("Could not retrieve source(s) {sources} for fragment '{fragment}'")]
    Resolution { fragment: String, sources: String },

    /// A fragment's content does not parse under the target's structured format.
    #[error("Format error in fragment '{fragment}' ({format}): {message}")]
    Format {
        fragment: String,
        format: String,
        message: String,
    },

    /// Two fragments disagree on the value of a key and `force` is not set.
    #[error("Duplicate key '{key}' found with values '{existing}' and '{incoming}'. Use 'force' attribute to merge keys.")]
    MergeConflict {
        key: String,
        existing: String,
        incoming: String,
    },

    /// A target's content was requested while it was already being computed.
    #[error("Evaluation cycle error: content of '{target}' requested while it is being computed")]
    EvaluationCycle { target: String },

    /// A lookup named a target that is not in the catalog.
    #[error("Target not found in catalog: {target}")]
    TargetNotFound { target: String },

    /// An error occurred while writing or removing an output file.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// The target's `validate_cmd` rejected the staged content.
    #[error("Validation command failed for {path}: {command} - {stderr}")]
    ValidateCommand {
        path: String,
        command: String,
        stderr: String,
    },

    /// One or more targets failed during an evaluation cycle.
    #[error("{count} target(s) failed: {targets}")]
    TargetsFailed { count: usize, targets: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a `Validation` error.
    pub fn validation(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            resource: resource.into(),
            message: message.into(),
        }
    }
}
