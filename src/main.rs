//! # datafile CLI
//!
//! Binary entry point. Parses arguments with `clap` and dispatches to the
//! command implementations, which are thin wrappers around the `datafile`
//! library.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
