//! CLI smoke tests.

mod fixtures;

use assert_cmd::Command;
use fixtures::{class_with_field_of, ClassFileBuilder};
use predicates::prelude::*;

fn sample_jar(dir: &std::path::Path) -> std::path::PathBuf {
    let a = class_with_field_of("pkg/A", "pkg/B");
    let b = class_with_field_of("pkg/B", "pkg/A");
    let c = ClassFileBuilder::new("pkg/Unused").build();
    fixtures::write_jar(
        dir,
        "cli.jar",
        &[
            ("pkg/A.class", a),
            ("pkg/B.class", b),
            ("pkg/Unused.class", c),
        ],
    )
}

#[test]
fn help_shows_usage() {
    Command::cargo_bin("jardeps")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("archive"))
        .stdout(predicate::str::contains("--package"));
}

#[test]
fn missing_archive_fails() {
    Command::cargo_bin("jardeps")
        .unwrap()
        .args(["/no/such/archive.jar", "--quiet"])
        .assert()
        .failure();
}

#[test]
fn terminal_report_names_mutual_pair_and_unused_class() {
    let dir = tempfile::tempdir().unwrap();
    let jar = sample_jar(dir.path());

    Command::cargo_bin("jardeps")
        .unwrap()
        .arg(jar)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("pkg.A <-> pkg.B"))
        .stdout(predicate::str::contains("pkg.Unused"));
}

#[test]
fn json_report_is_parseable_and_complete() {
    let dir = tempfile::tempdir().unwrap();
    let jar = sample_jar(dir.path());
    let out = dir.path().join("report.json");

    Command::cargo_bin("jardeps")
        .unwrap()
        .arg(&jar)
        .args(["--format", "json", "--quiet"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let text = std::fs::read_to_string(&out).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["summary"]["parsed_units"], 3);
    assert_eq!(json["summary"]["mutual_pairs"], 1);
    assert_eq!(json["mutual"][0]["a"], "pkg.A");
    assert_eq!(json["dependencies"]["pkg.A"][0], "pkg.B");
    assert!(json["unused"]
        .as_array()
        .unwrap()
        .contains(&serde_json::Value::String("pkg.Unused".to_string())));
}

#[test]
fn sequential_flag_produces_the_same_verdicts() {
    let dir = tempfile::tempdir().unwrap();
    let jar = sample_jar(dir.path());

    Command::cargo_bin("jardeps")
        .unwrap()
        .arg(jar)
        .args(["--sequential", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pkg.A <-> pkg.B"));
}
