//! End-to-end tests for the `cryptoscope init` command.

use std::fs;

use assert_cmd::Command;
use insta::assert_snapshot;
use predicates::prelude::*;
use tempfile::TempDir;

fn cryptoscope() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cryptoscope"))
}

#[test]
fn creates_config_file() {
    let dir = TempDir::new().unwrap();

    cryptoscope().arg("init").current_dir(dir.path()).assert().success();

    let content = fs::read_to_string(dir.path().join(".cryptoscope.toml")).unwrap();
    assert!(content.contains("exclude_paths"));
    assert!(content.contains("# [[custom_rules]]"));
}

#[test]
fn default_config_content_snapshot() {
    let dir = TempDir::new().unwrap();

    cryptoscope().arg("init").current_dir(dir.path()).assert().success();

    let config = fs::read_to_string(dir.path().join(".cryptoscope.toml")).unwrap();
    assert_snapshot!(config, @r#"
# cryptoscope configuration

# Glob patterns excluded from scanning.
exclude_paths = [
  "vendor/**",
  "**/testdata/**",
]

# Rule IDs matched no longer, e.g. "rand/read". See `cryptoscope rules`.
disabled_rules = []

# Bundles whose rules are dropped, e.g. "hash".
disabled_bundles = []

# Files larger than this many bytes are skipped.
max_file_size = 1048576

# Whether _test.go files are scanned.
include_tests = true

# Custom rules share the builtin schema and may chain into builtin rules.
#
# [[custom_rules]]
# id = "custom/chacha20poly1305"
# targets = ["golang.org/x/crypto/chacha20poly1305"]
# methods = ["New", "NewX"]
# value = "ChaCha20-Poly1305"
# context = "cipher"
#
# [[custom_rules.parameters]]
# type = "[]byte"
# detect = "key-size:bytes"
"#);
}

#[test]
fn refuses_to_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".cryptoscope.toml");
    fs::write(&path, "include_tests = false\n").unwrap();

    cryptoscope()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(&path).unwrap(), "include_tests = false\n");
}

#[test]
fn force_overwrites_existing_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".cryptoscope.toml");
    fs::write(&path, "include_tests = false\n").unwrap();

    cryptoscope()
        .args(["init", "--force"])
        .current_dir(dir.path())
        .assert()
        .success();

    assert!(fs::read_to_string(&path).unwrap().contains("include_tests = true"));
}

#[test]
fn output_flag_writes_custom_path() {
    let dir = TempDir::new().unwrap();

    cryptoscope()
        .args(["init", "--output", "crypto.toml"])
        .current_dir(dir.path())
        .assert()
        .success();

    assert!(dir.path().join("crypto.toml").exists());
    assert!(!dir.path().join(".cryptoscope.toml").exists());
}

#[test]
fn init_then_scan_clean() {
    let dir = TempDir::new().unwrap();

    cryptoscope().arg("init").current_dir(dir.path()).assert().success();

    fs::write(dir.path().join("main.go"), "package main\n\nfunc main() {}\n").unwrap();

    cryptoscope().args(["scan", "."]).current_dir(dir.path()).assert().success();
}

#[test]
fn generated_config_excludes_vendor() {
    let dir = TempDir::new().unwrap();

    cryptoscope().arg("init").current_dir(dir.path()).assert().success();

    fs::create_dir(dir.path().join("vendor")).unwrap();
    fs::write(
        dir.path().join("vendor/aes.go"),
        "package vendor\n\nimport \"crypto/aes\"\n\nfunc f(k []byte) {\n    aes.NewCipher(k)\n}\n",
    )
    .unwrap();

    cryptoscope().args(["scan", "."]).current_dir(dir.path()).assert().success();
}
