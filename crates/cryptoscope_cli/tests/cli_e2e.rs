//! End-to-end tests for global CLI behaviour (help, version, etc.).

use assert_cmd::Command;
use predicates::prelude::*;

fn cryptoscope() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cryptoscope"))
}

#[test]
fn help_shows_usage() {
    cryptoscope()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("finds the cryptography a Go codebase uses"));
}

#[test]
fn help_lists_commands() {
    cryptoscope()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("rules"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn version_flag() {
    cryptoscope()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cryptoscope"))
        .stdout(predicate::str::is_match(r"\d+\.\d+\.\d+").unwrap());
}

#[test]
fn no_args_shows_help() {
    cryptoscope().assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn invalid_command_fails() {
    cryptoscope().arg("invalid-command").assert().failure();
}

#[test]
fn scan_alias_works() {
    let dir = tempfile::TempDir::new().unwrap();

    cryptoscope().args(["s", "."]).current_dir(dir.path()).assert().success();
}

#[test]
fn invalid_format_fails() {
    cryptoscope()
        .args(["scan", ".", "--format", "sarif"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sarif"));
}
