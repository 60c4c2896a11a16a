//! Render command implementation
//!
//! Prints the computed content of a single target to stdout, byte for byte,
//! without writing anything.

use anyhow::{Context, Result};
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;

use datafile::config::{self, DEFAULT_MANIFEST};
use datafile::orchestrator;
use datafile::source::LocalSource;

/// Arguments for the render command
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Path to the manifest file
    #[arg(short, long, value_name = "PATH", env = "DATAFILE_MANIFEST", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Path or title of the target to render
    #[arg(value_name = "TARGET")]
    pub target: String,
}

/// Execute the render command
pub fn execute(args: RenderArgs) -> Result<()> {
    let (mut catalog, base_dir) = config::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest {}", args.manifest.display()))?;
    let sources = LocalSource::new(base_dir);

    let content = orchestrator::render(&mut catalog, &args.target, &sources)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&content)?;
    stdout.flush()?;
    Ok(())
}
