//! End-to-end tests for the `cryptoscope scan` command.

#![expect(clippy::expect_used, reason = "tests use expect for clearer failure messages")]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const AES_GCM: &str = r#"package main

import (
    "crypto/aes"
    "crypto/cipher"
)

func seal() {
    key := make([]byte, 32)
    block, _ := aes.NewCipher(key)
    cipher.NewGCM(block)
}
"#;

const RAND: &str = r#"package main

import "crypto/rand"

func nonce() []byte {
    b := make([]byte, 12)
    rand.Read(b)
    return b
}
"#;

const PLAIN: &str = "package main\n\nimport \"fmt\"\n\nfunc main() {\n    fmt.Println(\"hello\")\n}\n";

fn cryptoscope() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cryptoscope"))
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, content).expect("write fixture");
    }
    dir
}

fn scan_json(dir: &TempDir, extra: &[&str]) -> serde_json::Value {
    let output = cryptoscope()
        .args(["scan", ".", "--format", "json", "--exit-zero"])
        .args(extra)
        .current_dir(dir.path())
        .output()
        .expect("run cryptoscope");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn messages(json: &serde_json::Value) -> Vec<String> {
    json.as_array()
        .expect("findings array")
        .iter()
        .map(|f| f["message"].as_str().expect("message").to_string())
        .collect()
}

#[test]
fn exit_zero_when_no_cryptography() {
    let dir = project(&[("main.go", PLAIN)]);

    cryptoscope()
        .args(["scan", "."])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no cryptography found"));
}

#[test]
fn exit_one_when_cryptography_found() {
    let dir = project(&[("main.go", AES_GCM)]);

    cryptoscope().args(["scan", "."]).current_dir(dir.path()).assert().code(1);
}

#[test]
fn exit_zero_flag_overrides_findings() {
    let dir = project(&[("main.go", AES_GCM)]);

    cryptoscope()
        .args(["scan", ".", "--exit-zero"])
        .current_dir(dir.path())
        .assert()
        .success();
}

#[test]
fn exit_zero_for_empty_directory() {
    let dir = TempDir::new().expect("create temp dir");

    cryptoscope()
        .args(["scan", "."])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no Go files to scan"));
}

#[test]
fn scan_nonexistent_path_succeeds_with_zero_files() {
    cryptoscope()
        .args(["scan", "/nonexistent/path/that/does/not/exist"])
        .assert()
        .success();
}

#[test]
fn text_output_shows_finding_and_asset_tree() {
    let dir = project(&[("main.go", AES_GCM)]);

    cryptoscope()
        .args(["scan", "main.go"])
        .current_dir(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("(BlockCipher) AES · aes/new-cipher"))
        .stdout(predicate::str::contains("main.go:10:17"))
        .stdout(predicate::str::contains("├─ (KeyLength) 256"))
        .stdout(predicate::str::contains("└─ (Mode) GCM"))
        .stdout(predicate::str::contains("1 finding"));
}

#[test]
fn json_output_has_flat_fields_and_asset_tree() {
    let dir = project(&[("main.go", AES_GCM)]);

    let json = scan_json(&dir, &[]);
    let finding = &json[0];

    assert_eq!(json.as_array().map(Vec::len), Some(1));
    assert!(finding["path"].as_str().expect("path").ends_with("main.go"));
    assert_eq!(finding["line"], 10);
    assert_eq!(finding["column"], 17);
    assert_eq!(finding["rule_id"], "aes/new-cipher");
    assert_eq!(finding["bundle"], "aes");
    assert_eq!(finding["kind"], "block-cipher");
    assert_eq!(finding["value"], "AES");
    assert_eq!(finding["message"], "(BlockCipher) AES");
    assert_eq!(finding["asset"]["children"][0]["value"], "256");
    assert_eq!(finding["asset"]["children"][1]["kind"], "mode");
}

#[test]
fn findings_are_ordered_by_path() {
    let dir = project(&[("b.go", AES_GCM), ("a.go", RAND)]);

    let json = scan_json(&dir, &[]);

    assert_eq!(messages(&json), ["(PRNG) CSPRNG", "(BlockCipher) AES"]);
}

#[test]
fn finding_ids_are_stable_between_runs() {
    let dir = project(&[("main.go", AES_GCM)]);

    let first = scan_json(&dir, &[]);
    let second = scan_json(&dir, &[]);

    assert_eq!(first[0]["id"], second[0]["id"]);
}

#[test]
fn json_output_for_no_files_is_empty_array() {
    let dir = TempDir::new().expect("create temp dir");

    let json = scan_json(&dir, &[]);

    assert_eq!(json, serde_json::json!([]));
}

#[test]
fn output_flag_writes_file() {
    let dir = project(&[("main.go", AES_GCM)]);

    cryptoscope()
        .args(["scan", "main.go", "--format", "json", "--output", "report.json"])
        .current_dir(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());

    let report = fs::read_to_string(dir.path().join("report.json")).expect("report written");
    assert!(report.contains("\"rule_id\": \"aes/new-cipher\""));
}

#[test]
fn text_output_file_has_no_colour_codes() {
    let dir = project(&[("main.go", AES_GCM)]);

    cryptoscope()
        .args(["scan", "main.go", "--output", "report.txt", "--exit-zero"])
        .current_dir(dir.path())
        .assert()
        .success();

    let report = fs::read_to_string(dir.path().join("report.txt")).expect("report written");
    assert!(report.contains("(BlockCipher) AES"));
    assert!(!report.contains('\u{1b}'));
}

#[test]
fn non_go_files_are_ignored() {
    let dir = project(&[("notes.txt", AES_GCM), ("main.py", "aes.NewCipher(key)")]);

    cryptoscope().args(["scan", "."]).current_dir(dir.path()).assert().success();
}

#[test]
fn exclude_flag_skips_matching_paths() {
    let dir = project(&[("vendor/lib/aes.go", AES_GCM), ("main.go", PLAIN)]);

    cryptoscope()
        .args(["scan", ".", "--exclude", "vendor/**"])
        .current_dir(dir.path())
        .assert()
        .success();
}

#[test]
fn config_exclude_paths() {
    let dir = project(&[
        ("vendor/lib/aes.go", AES_GCM),
        (".cryptoscope.toml", "exclude_paths = [\"vendor/**\"]\n"),
    ]);

    cryptoscope().args(["scan", "."]).current_dir(dir.path()).assert().success();
}

#[test]
fn skip_tests_flag_ignores_test_files() {
    let dir = project(&[("crypto_test.go", AES_GCM)]);

    cryptoscope().args(["scan", "."]).current_dir(dir.path()).assert().code(1);

    cryptoscope()
        .args(["scan", ".", "--skip-tests"])
        .current_dir(dir.path())
        .assert()
        .success();
}

#[test]
fn config_can_exclude_test_files() {
    let dir = project(&[("crypto_test.go", AES_GCM), (".cryptoscope.toml", "include_tests = false\n")]);

    cryptoscope().args(["scan", "."]).current_dir(dir.path()).assert().success();
}

#[test]
fn config_disabled_bundle_is_silenced() {
    let dir = project(&[("main.go", RAND), (".cryptoscope.toml", "disabled_bundles = [\"rand\"]\n")]);

    cryptoscope().args(["scan", "."]).current_dir(dir.path()).assert().success();
}

#[test]
fn explicit_config_path_is_used() {
    let dir = project(&[("main.go", RAND), ("settings/crypto.toml", "disabled_rules = [\"rand/read\"]\n")]);

    cryptoscope()
        .args(["scan", "main.go", "--config", "settings/crypto.toml"])
        .current_dir(dir.path())
        .assert()
        .success();
}

#[test]
fn custom_rule_from_config_is_reported() {
    let config = r#"
[[custom_rules]]
id = "custom/blake2b"
targets = ["golang.org/x/crypto/blake2b"]
methods = ["New256"]
value = "BLAKE2b-256"
context = "digest"
"#;
    let source = "package main\n\nimport \"golang.org/x/crypto/blake2b\"\n\nfunc h() {\n    blake2b.New256(nil)\n}\n";
    let dir = project(&[("main.go", source), (".cryptoscope.toml", config)]);

    let json = scan_json(&dir, &[]);

    assert_eq!(messages(&json), ["(MessageDigest) BLAKE2b-256"]);
    assert_eq!(json[0]["bundle"], "custom");
}

#[test]
fn file_size_limit_skips_large_files() {
    let dir = project(&[("main.go", AES_GCM)]);

    cryptoscope()
        .args(["scan", ".", "--max-file-size", "16"])
        .current_dir(dir.path())
        .assert()
        .success();
}

#[test]
fn unreadable_file_is_reported_and_scan_continues() {
    let dir = project(&[("main.go", AES_GCM)]);
    fs::write(dir.path().join("broken.go"), b"package main\n\xff\xfe\n").expect("write fixture");

    cryptoscope()
        .args(["scan", "."])
        .current_dir(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("broken.go"))
        .stdout(predicate::str::contains("(BlockCipher) AES"))
        .stdout(predicate::str::contains("1 file could not be read or parsed"));
}

#[test]
fn malformed_config_exits_with_error() {
    let dir = project(&[("main.go", PLAIN), (".cryptoscope.toml", "max_file_size = \"big\"\n")]);

    cryptoscope()
        .args(["scan", "."])
        .current_dir(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("loading config"));
}

#[test]
fn invalid_custom_rule_exits_with_error() {
    let config = r#"
[[custom_rules]]
id = "custom/empty"
methods = ["Do"]
context = "key"
"#;
    let dir = project(&[("main.go", PLAIN), (".cryptoscope.toml", config)]);

    cryptoscope()
        .args(["scan", "."])
        .current_dir(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("custom/empty"));
}

#[test]
fn invalid_exclude_pattern_exits_with_error() {
    let dir = project(&[("main.go", PLAIN)]);

    cryptoscope()
        .args(["scan", ".", "--exclude", "vendor/["])
        .current_dir(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid exclude pattern"));
}

#[test]
fn verbose_flag_prints_context() {
    let dir = project(&[("main.go", PLAIN)]);

    cryptoscope()
        .args(["scan", ".", "-vv", "--exclude", "gen/**"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("rules · 1 files"))
        .stdout(predicate::str::contains("exclude gen/**"));
}
