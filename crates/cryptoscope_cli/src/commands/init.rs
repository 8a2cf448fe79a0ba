//! Init command - creates `.cryptoscope.toml` configuration file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context as _;
use console::style;
use cryptoscope_core::fs_util::atomic_write;

use crate::CONFIG_FILENAME;
use crate::ui::{colors, format_duration, indicators, print_command_header, print_hint, print_info};

/// Default maximum file size in bytes (1 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Executes the `cryptoscope init` command, writing a commented default
/// configuration unless one exists and `force` is unset.
pub fn run(force: bool, output_path: Option<PathBuf>) -> super::Result {
    print_command_header("init");

    let output_path = output_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

    if output_path.exists() && !force {
        print_existing(&output_path);
        return Ok(());
    }

    let start = Instant::now();
    atomic_write(&output_path, &build_config())
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    print_result(&output_path, start.elapsed());
    Ok(())
}

fn print_existing(path: &Path) {
    println!(
        "{} {} already exists",
        colors::warning().apply_to(indicators::WARNING),
        style(path.display()).bold()
    );
    println!();
    print_hint("cryptoscope init --force", "overwrite it with the defaults");
    println!();
}

fn print_result(path: &Path, elapsed: std::time::Duration) {
    println!(
        "{} {} {}",
        colors::success().apply_to(indicators::ADDED),
        style(path.display()).bold(),
        colors::muted().apply_to(format!("({})", format_duration(elapsed)))
    );
    println!();
    print_info("Run `cryptoscope scan .` to scan your project");
}

/// Generates the commented default `.cryptoscope.toml` content.
#[must_use]
pub fn build_config() -> String {
    format!(
        r#"# cryptoscope configuration

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
max_file_size = {DEFAULT_MAX_FILE_SIZE}

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
"#
    )
}
