use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn atomize() -> Command {
    Command::cargo_bin("atomize").unwrap()
}

const POINTER_SOURCE: &str = "int *p;\nint x;\n\nvoid connect(void) {\n    p = &x;\n}\n";

#[test]
fn upgrade_by_name_rewrites_the_pointer_and_its_target() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.c");
    let output = dir.path().join("out.c");
    fs::write(&input, POINTER_SOURCE).unwrap();

    atomize()
        .arg("upgrade")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--name", "x"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Initially upgrading x"));

    let rewritten = fs::read_to_string(&output).unwrap();
    assert_eq!(
        rewritten,
        "int _Atomic *p;\nint _Atomic x;\n\nvoid connect(void) {\n    p = &x;\n}\n"
    );
}

#[test]
fn a_missing_seed_name_fails_without_writing_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.c");
    let output = dir.path().join("out.c");
    fs::write(&input, POINTER_SOURCE).unwrap();

    atomize()
        .arg("upgrade")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--name", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no declaration named"));

    assert!(!output.exists());
}

#[test]
fn a_braced_scalar_initializer_is_a_fatal_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.c");
    let output = dir.path().join("out.c");
    fs::write(&input, "int x = { 1 };\n").unwrap();

    atomize()
        .arg("upgrade")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--name", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported initializer list"));

    assert!(!output.exists());
}

#[test]
fn a_syntax_error_stops_the_run_before_any_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.c");
    let output = dir.path().join("out.c");
    fs::write(&input, "int x = ;\n").unwrap();

    atomize()
        .arg("upgrade")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--name", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("syntax error"));

    assert!(!output.exists());
}

#[test]
fn the_output_flag_is_required() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.c");
    fs::write(&input, POINTER_SOURCE).unwrap();

    atomize().arg("upgrade").arg(&input).assert().failure();
}

#[test]
fn the_same_seed_value_produces_byte_identical_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.c");
    fs::write(&input, POINTER_SOURCE).unwrap();

    let mut outputs = Vec::new();
    for run in 0..2 {
        let output = dir.path().join(format!("out{run}.c"));
        atomize()
            .arg("upgrade")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .args(["--seed", "7"])
            .assert()
            .success();
        outputs.push(fs::read(&output).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn a_report_summarizes_the_run_as_json() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.c");
    let output = dir.path().join("out.c");
    let report = dir.path().join("report.json");
    fs::write(&input, POINTER_SOURCE).unwrap();

    atomize()
        .arg("upgrade")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--name", "x"])
        .arg("--report")
        .arg(&report)
        .assert()
        .success();

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(summary["seed_declaration"], "x");
    assert_eq!(summary["upgrades"].as_array().unwrap().len(), 2);
}

#[test]
fn analyze_dumps_declarations_and_edges() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.c");
    fs::write(&input, POINTER_SOURCE).unwrap();

    atomize()
        .arg("analyze")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("p ~ &x"))
        .stdout(predicate::str::contains("3 declaration(s)"));
}
