//! # Output Configuration
//!
//! Terminal presentation for the `datafile` CLI: whether to use colour and
//! emoji, and how to label what happened to each target file.
//!
//! Colour follows `--color=never|always|auto`. In `auto` mode it is turned
//! off by `NO_COLOR` (any value), `CLICOLOR=0`, or `TERM=dumb`, and turned on
//! for non-TTY output by `CLICOLOR_FORCE=1`.
//!
//! ```
//! use datafile::filesystem::FileOutcome;
//! use datafile::output::{outcome_label, OutputConfig};
//!
//! let out = OutputConfig::from_env_and_flag("never");
//! assert_eq!(outcome_label(&out, FileOutcome::Created), "[NEW]");
//! ```

use std::env;

use console::style;

use crate::filesystem::FileOutcome;

/// Whether colour and emoji are enabled.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve the `--color` flag (`always`, `never`, `auto`) against the
    /// environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => detect_color_support(),
        };
        Self { use_color }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

fn detect_color_support() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
        return true;
    }
    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }
    console::Term::stdout().features().colors_supported()
}

/// `emoji_str` when colour is on, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Short label for a writer outcome, styled when colour is on.
pub fn outcome_label(config: &OutputConfig, outcome: FileOutcome) -> String {
    let (text, changed) = match outcome {
        FileOutcome::Created => ("[NEW]", true),
        FileOutcome::Updated => ("[UPD]", true),
        FileOutcome::Removed => ("[DEL]", true),
        FileOutcome::Unchanged => ("[OK]", false),
        FileOutcome::Kept => ("[KEEP]", false),
        FileOutcome::AlreadyAbsent => ("[GONE]", false),
    };
    if !config.use_color {
        return text.to_string();
    }
    if changed {
        style(text).green().bold().force_styling(true).to_string()
    } else {
        style(text).dim().force_styling(true).to_string()
    }
}
