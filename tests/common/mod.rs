//! Shared test utilities for E2E tests.
//!
//! Add `mod common;` to a test file and `use common::prelude::*;`.
//!
//! Target paths in a manifest must be absolute, so manifests passed to
//! [`TestFixture::with_manifest`] may use `{root}` as a placeholder for the
//! fixture directory.

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::TestFixture;
}

/// Manifest snippets used across tests.
#[allow(dead_code)]
pub mod manifests {
    /// Three plain fragments ordered 1, 2 and 10, rendered into two targets
    /// that differ only in order mode.
    pub const ORDERING: &str = r#"
targets:
  - path: "{root}/numeric.txt"
    tag: x
  - path: "{root}/alpha.txt"
    tag: x
    order: alpha
fragments:
  - { name: one, target: "{root}/numeric.txt", tag: x, order: "1", content: a }
  - { name: two, target: "{root}/numeric.txt", tag: x, order: "2", content: b }
  - { name: ten, target: "{root}/numeric.txt", tag: x, order: "10", content: c }
"#;

    /// YAML fragments deep-merged into one file, one from a source file.
    pub const YAML_MERGE: &str = r#"
targets:
  - path: "{root}/out/config.yaml"
    tag: cfg
    format: yaml
fragments:
  - name: base
    target: "{root}/out/config.yaml"
    tag: cfg
    order: 1
    content: |
      server:
        port: 80
        hosts: [a]
  - name: site
    target: "{root}/out/config.yaml"
    tag: cfg
    order: 2
    source: [missing.yaml, site.yaml]
"#;

    /// Conflicting JSON fragments without force.
    pub const JSON_CONFLICT: &str = r#"
targets:
  - path: "{root}/conflict.json"
    tag: j
    format: json
fragments:
  - { name: first, target: "{root}/conflict.json", tag: j, order: 1, content: '{"a":1}' }
  - { name: second, target: "{root}/conflict.json", tag: j, order: 2, content: '{"a":2}' }
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "targets: [unclosed";
}

/// A temporary directory holding a manifest and source files.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `datafile.yaml`, replacing `{root}` with the fixture directory.
    pub fn with_manifest(self, content: &str) -> Self {
        let root = self.path().display().to_string();
        self.temp_dir
            .child("datafile.yaml")
            .write_str(&content.replace("{root}", &root))
            .expect("Failed to write manifest");
        self
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.temp_dir.path().join("datafile.yaml")
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Read a file from the fixture directory.
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// A command running in the fixture directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("datafile");
        cmd.current_dir(self.path()).env_remove("DATAFILE_MANIFEST");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
