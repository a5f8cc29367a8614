use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn source(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("input.sas");
    fs::write(&path, text).unwrap();
    path
}

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("sas-syntax").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn block_reports_kind_name_and_extent() {
    let dir = TempDir::new().unwrap();
    let path = source(&dir, "proc print; run;\n");

    cli()
        .arg("block")
        .arg(&path)
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("proc\tprint\t0..16"));
}

#[test]
fn block_json_output() {
    let dir = TempDir::new().unwrap();
    let path = source(&dir, "data a;\n  x = 1;\nrun;\n");

    let output = cli()
        .args(["--json", "block"])
        .arg(&path)
        .arg("2:3")
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["kind"], "data");
    assert_eq!(value["start"], 0);
    assert_eq!(value["end"], 21);
}

#[test]
fn submit_falls_back_to_line() {
    let dir = TempDir::new().unwrap();
    let path = source(&dir, "proc ; run;");

    cli()
        .args(["block", "--submit"])
        .arg(&path)
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("line\t0..11"));
}

#[test]
fn next_and_previous_blocks() {
    let dir = TempDir::new().unwrap();
    let path = source(&dir, "data a; run;\nproc means; run;\n");

    cli()
        .args(["block", "--next"])
        .arg(&path)
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("proc\tmeans\t13.."));

    cli()
        .args(["block", "--previous"])
        .arg(&path)
        .arg("0")
        .assert()
        .success()
        .stdout("none\n");
}

#[test]
fn indent_follows_nesting() {
    let dir = TempDir::new().unwrap();
    let path = source(&dir, "data a;\ndo;\nx = 1;\nend;\nrun;\n");

    cli()
        .arg("indent")
        .arg(&path)
        .arg("3:1")
        .assert()
        .success()
        .stdout("8\n");
}

#[test]
fn config_file_sets_indent_width() {
    let dir = TempDir::new().unwrap();
    let path = source(&dir, "data a;\nx = 1;\nrun;\n");
    let config = dir.path().join("prefs.toml");
    fs::write(&config, "[indentation]\nbasic_offset = 2\n").unwrap();

    cli()
        .arg("--config")
        .arg(&config)
        .arg("indent")
        .arg(&path)
        .arg("2:1")
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn reindent_apply_prints_new_text() {
    let dir = TempDir::new().unwrap();
    let path = source(&dir, "proc sort data = a;\nby x;\n   run;\n");

    cli()
        .args(["reindent", "--apply"])
        .arg(&path)
        .assert()
        .success()
        .stdout("proc sort data = a;\n    by x;\nrun;\n");

    cli()
        .arg("reindent")
        .arg(&path)
        .assert()
        .success()
        .stdout("2\t0 -> 4\n3\t3 -> 0\n");
}

#[test]
fn resolved_tokens_merge_data_assignment() {
    let dir = TempDir::new().unwrap();
    let path = source(&dir, "proc sort data = a; /* note */ run;");

    cli()
        .args(["tokens", "--resolved"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("assignment-target"))
        .stdout(predicate::str::contains("note").not());

    cli()
        .arg("tokens")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("comment"));
}

#[test]
fn highlight_lists_faces() {
    let dir = TempDir::new().unwrap();
    let path = source(&dir, "data a; * note; x = 'y'; run;");

    cli()
        .arg("highlight")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("block-keyword"))
        .stdout(predicate::str::contains("8..14\tcomment"))
        .stdout(predicate::str::contains("string"));
}

#[test]
fn statement_around_offset() {
    let dir = TempDir::new().unwrap();
    let path = source(&dir, "data a; x = 1; run;");

    cli()
        .arg("statement")
        .arg(&path)
        .arg("9")
        .assert()
        .success()
        .stdout("8..14\tx = 1;\n");
}

#[test]
fn rejects_bad_positions() {
    let dir = TempDir::new().unwrap();
    let path = source(&dir, "run;");

    cli()
        .arg("indent")
        .arg(&path)
        .arg("x:1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid position"));

    cli()
        .arg("block")
        .arg(&path)
        .arg("40")
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the buffer"));
}

#[test]
fn missing_file_fails() {
    cli()
        .args(["highlight", "does-not-exist.sas"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
