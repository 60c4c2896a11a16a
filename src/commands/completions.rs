//! # Completions Command Implementation
//!
//! Writes a shell completion script for `datafile` to stdout using
//! `clap_complete`.
//!
//! ```bash
//! datafile completions bash > ~/.local/share/bash-completion/completions/datafile
//! datafile completions zsh > ~/.zfunc/_datafile
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "datafile", &mut io::stdout());
    Ok(())
}
