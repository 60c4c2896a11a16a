//! # Validate Command Implementation
//!
//! Loads a manifest and checks every declaration without evaluating any
//! target. Reports a per-target summary and fragments whose `target` matches
//! nothing. With `--check-sources`, also confirms that every sourced fragment
//! has at least one existing candidate.
//!
//! This command never writes files.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use datafile::catalog::collect;
use datafile::config::{self, DEFAULT_MANIFEST};
use datafile::fragment::FragmentBody;
use datafile::output::{emoji, OutputConfig};
use datafile::source::{LocalSource, SourceProvider};

/// Validate a manifest file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the manifest file
    #[arg(short, long, value_name = "PATH", env = "DATAFILE_MANIFEST", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Also check that sourced fragments can be resolved
    #[arg(long)]
    pub check_sources: bool,

    /// Fail on warnings
    #[arg(long)]
    pub strict: bool,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    println!(
        "{} Validating manifest: {}",
        emoji(&out, "🔍", "[SCAN]"),
        args.manifest.display()
    );

    let (catalog, base_dir) = match config::load(&args.manifest) {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("{} Manifest is invalid: {}", emoji(&out, "❌", "[ERR]"), e);
            return Err(anyhow::anyhow!("Manifest validation failed: {}", e));
        }
    };

    let mut has_warnings = false;
    let mut has_errors = false;

    println!("\n{} Summary:", emoji(&out, "📊", "[INFO]"));
    println!("   Targets: {}", catalog.targets().len());
    println!("   Fragments: {}", catalog.fragments().len());
    for target in catalog.targets() {
        println!(
            "   {} (tag '{}', {}, {} fragment(s))",
            target.path(),
            target.tag(),
            target.format(),
            collect(catalog.fragments(), target.tag()).len()
        );
    }

    for fragment in catalog.dangling_fragments() {
        println!(
            "{} Fragment '{}' targets '{}', which is not declared",
            emoji(&out, "⚠️", "[WARN]"),
            fragment.name(),
            fragment.target()
        );
        has_warnings = true;
    }

    if args.check_sources {
        println!("\n{} Checking sources...", emoji(&out, "📂", "[SRC]"));
        let sources = LocalSource::new(base_dir);
        for fragment in catalog.fragments() {
            let FragmentBody::Source(candidates) = fragment.body() else {
                continue;
            };
            let mut found = None;
            for candidate in candidates {
                if sources.exists(candidate)? {
                    found = Some(candidate);
                    break;
                }
            }
            match found {
                Some(candidate) => println!(
                    "{} {} -> {}",
                    emoji(&out, "✅", "[OK]"),
                    fragment.name(),
                    candidate
                ),
                None => {
                    println!(
                        "{} {}: none of {} exist",
                        emoji(&out, "❌", "[ERR]"),
                        fragment.name(),
                        candidates.join(", ")
                    );
                    has_errors = true;
                }
            }
        }
    }

    if has_errors {
        println!("\n{} Manifest has errors", emoji(&out, "❌", "[ERR]"));
        return Err(anyhow::anyhow!("Manifest validation failed"));
    }
    if has_warnings && args.strict {
        println!(
            "\n{} Manifest has warnings (strict mode enabled)",
            emoji(&out, "❌", "[ERR]")
        );
        return Err(anyhow::anyhow!("Manifest validation failed in strict mode"));
    }
    if has_warnings {
        println!("\n{} Manifest is valid but has warnings", emoji(&out, "⚠️", "[WARN]"));
    } else {
        println!("\n{} Manifest is valid", emoji(&out, "✅", "[OK]"));
    }
    Ok(())
}
