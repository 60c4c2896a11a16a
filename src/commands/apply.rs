//! Apply command implementation
//!
//! Loads the manifest, evaluates every target, and writes the results. With
//! `--dry-run` the results go to an in-memory snapshot of the target files and
//! are only listed.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use datafile::config::{self, DEFAULT_MANIFEST};
use datafile::filesystem::{DiskWriter, FileWriter, MemoryFS};
use datafile::orchestrator;
use datafile::output::{emoji, outcome_label, OutputConfig};
use datafile::source::LocalSource;

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to the manifest file
    #[arg(short, long, value_name = "PATH", env = "DATAFILE_MANIFEST", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Show what would be written without touching any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the apply command
pub fn execute(args: ApplyArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    if !args.manifest.exists() {
        anyhow::bail!("Manifest not found: {}", args.manifest.display());
    }

    let (mut catalog, base_dir) = config::load(&args.manifest)?;
    let sources = LocalSource::new(base_dir);

    if !args.quiet && args.dry_run {
        println!("{} DRY RUN - no files will be changed", emoji(&out, "🔎", "[DRY]"));
    }

    let mut memory;
    let mut disk;
    let writer: &mut dyn FileWriter = if args.dry_run {
        memory = MemoryFS::from_disk(catalog.targets().iter().map(|t| PathBuf::from(t.path())))?;
        &mut memory
    } else {
        disk = DiskWriter::new();
        &mut disk
    };

    let report = orchestrator::execute(&mut catalog, &sources, writer);

    if !args.quiet {
        for (path, outcome) in &report.applied {
            println!("{} {}", outcome_label(&out, *outcome), path.display());
        }
        for (path, err) in &report.failed {
            println!("{} {}: {}", emoji(&out, "❌", "[ERR]"), path, err);
        }
    }

    let changed = report.changed();
    let total = report.applied.len() + report.failed.len();
    report.into_result()?;

    if !args.quiet {
        let verb = if args.dry_run { "would change" } else { "changed" };
        println!(
            "{} {} target(s) evaluated, {} {}",
            emoji(&out, "✅", "[OK]"),
            total,
            changed,
            verb
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(manifest: PathBuf, dry_run: bool) -> ApplyArgs {
        ApplyArgs {
            manifest,
            dry_run,
            quiet: true,
        }
    }

    #[test]
    fn test_execute_missing_manifest() {
        let err = execute(args(PathBuf::from("/nonexistent/datafile.yaml"), false), "never")
            .unwrap_err();
        assert!(err.to_string().contains("Manifest not found"));
    }

    #[test]
    fn test_execute_writes_target() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.txt");
        let manifest = temp.path().join(DEFAULT_MANIFEST);
        fs::write(temp.path().join("tail.txt"), "tail\n").unwrap();
        fs::write(
            &manifest,
            format!(
                "targets:\n  - path: {out}\n    tag: t\nfragments:\n  - {{ name: head, target: {out}, tag: t, order: 1, content: \"head\\n\" }}\n  - {{ name: tail, target: {out}, tag: t, order: 2, source: tail.txt }}\n",
                out = output.display()
            ),
        )
        .unwrap();

        execute(args(manifest, false), "never").unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "head\ntail\n");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.txt");
        let manifest = temp.path().join(DEFAULT_MANIFEST);
        fs::write(
            &manifest,
            format!(
                "targets:\n  - path: {out}\n    tag: t\nfragments:\n  - {{ name: a, target: {out}, tag: t, content: a }}\n",
                out = output.display()
            ),
        )
        .unwrap();

        execute(args(manifest, true), "never").unwrap();
        assert!(!output.exists());
    }
}
