use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn lispy_eval_snippet() {
    let mut cmd = Command::cargo_bin("lispy").expect("binary exists");
    cmd.arg("eval").arg("+ 1 2 3");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("6"));
}

#[test]
fn lispy_eval_uses_the_prelude() {
    let mut cmd = Command::cargo_bin("lispy").expect("binary exists");
    cmd.arg("eval").arg("len {1 2 3 4}");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("4"));
}

#[test]
fn lispy_no_prelude_flag() {
    let mut cmd = Command::cargo_bin("lispy").expect("binary exists");
    cmd.arg("--no-prelude").arg("eval").arg("len {1 2 3 4}");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Error: Unbound symbol 'len'"));
}

#[test]
fn lispy_run_scripts_in_order() {
    let dir = tempdir().expect("create temp dir");
    let first = dir.path().join("first.lspy");
    let second = dir.path().join("second.lspy");
    fs::write(&first, "(print \"hello\")\n(def {x} 2)\n").expect("write first script");
    fs::write(&second, "; uses x from the first file\n(print (* x 21))\n")
        .expect("write second script");

    let mut cmd = Command::cargo_bin("lispy").expect("binary exists");
    cmd.arg("run").arg(&first).arg(&second);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"hello\"\n42\n"));
}

#[test]
fn lispy_run_reports_missing_files() {
    let dir = tempdir().expect("create temp dir");
    let missing = dir.path().join("missing.lspy");
    let present = dir.path().join("present.lspy");
    fs::write(&present, "(print \"still runs\")\n").expect("write script");

    let mut cmd = Command::cargo_bin("lispy").expect("binary exists");
    cmd.arg("run").arg(&missing).arg(&present);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Error: Could not load Library"))
        .stdout(predicate::str::contains("\"still runs\""));
}

#[test]
fn lispy_run_reports_expression_errors() {
    let dir = tempdir().expect("create temp dir");
    let script = dir.path().join("errors.lspy");
    fs::write(&script, "(head {})\n(print \"after\")\n").expect("write script");

    let mut cmd = Command::cargo_bin("lispy").expect("binary exists");
    cmd.arg("run").arg(&script);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Error: Function 'head' passed {} for argument 0.\n\"after\"",
        ));
}
