//! End-to-end tests for the `validate` command.

mod common;
use common::prelude::*;

#[test]
fn test_validate_reports_summary() {
    let fixture = TestFixture::new().with_manifest(manifests::ORDERING);

    fixture
        .command()
        .args(["--color", "never", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Targets: 2"))
        .stdout(predicate::str::contains("Fragments: 3"))
        .stdout(predicate::str::contains("[OK] Manifest is valid"));
}

#[test]
fn test_validate_rejects_relative_path() {
    let fixture = TestFixture::new().with_manifest(
        r#"
targets:
  - path: relative/file.txt
    tag: t
"#,
    );

    fixture
        .command()
        .args(["--color", "never", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "File paths must be fully qualified, not 'relative/file.txt'",
        ));
}

#[test]
fn test_validate_rejects_bad_order() {
    let fixture = TestFixture::new().with_manifest(
        r#"
targets:
  - path: "{root}/out.txt"
    tag: t
fragments:
  - { name: bad, target: "{root}/out.txt", tag: t, order: "1___x", content: x }
"#,
    );

    fixture
        .command()
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Fragment[bad]"));
}

#[test]
fn test_validate_rejects_content_and_source() {
    let fixture = TestFixture::new().with_manifest(
        r#"
targets:
  - path: "{root}/out.txt"
    tag: t
fragments:
  - { name: both, target: "{root}/out.txt", tag: t, content: x, source: x.txt }
"#,
    );

    fixture
        .command()
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Can't use 'source' and 'content' at the same time",
        ));
}

#[test]
fn test_validate_dangling_fragment_warning_and_strict() {
    let manifest = r#"
targets:
  - path: "{root}/out.txt"
    tag: t
fragments:
  - { name: lost, target: "{root}/elsewhere.txt", tag: t, content: x }
"#;
    let fixture = TestFixture::new().with_manifest(manifest);

    fixture
        .command()
        .args(["--color", "never", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[WARN] Fragment 'lost'"));

    fixture
        .command()
        .args(["validate", "--strict"])
        .assert()
        .failure();
}

#[test]
fn test_validate_check_sources() {
    let fixture = TestFixture::new()
        .with_manifest(manifests::YAML_MERGE)
        .with_file("site.yaml", "a: 1\n");

    fixture
        .command()
        .args(["--color", "never", "validate", "--check-sources"])
        .assert()
        .success()
        .stdout(predicate::str::contains("site -> site.yaml"));
}

#[test]
fn test_validate_unknown_field_has_hint() {
    let fixture = TestFixture::new().with_manifest("target:\n  - path: /x\n");

    fixture
        .command()
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("hint:"));
}
