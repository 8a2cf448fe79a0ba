//! Scan context - configuration and rule loading.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use cryptoscope_core::prelude::*;

use crate::scanning::build_scanner;
use crate::ui::colors;
use crate::{CONFIG_FILENAME, ScanArgs};

/// Loaded scanner and configuration for a scan run.
#[derive(Debug)]
pub struct ScanContext {
    /// The compiled scanner.
    pub scanner: Scanner,
    /// Parsed configuration from `.cryptoscope.toml`.
    pub config: Config,
}

impl ScanContext {
    /// Loads configuration and builds the scanner from CLI arguments.
    pub fn load(args: &ScanArgs) -> anyhow::Result<Self> {
        let config_path = config_path(args);
        let config = Config::load(config_path).context("loading config")?;
        let scanner = build_scanner(&config)?;

        Ok(Self { scanner, config })
    }

    /// Returns the size limit, preferring the command line.
    pub fn max_file_size(&self, args: &ScanArgs) -> Option<u64> {
        args.max_file_size.or(self.config.max_file_size)
    }

    /// Returns whether `_test.go` files take part in the scan.
    pub const fn include_tests(&self, args: &ScanArgs) -> bool {
        self.config.include_tests && !args.skip_tests
    }
}

/// Returns the configuration path named on the command line, or the default.
pub fn config_path(args: &ScanArgs) -> &Path {
    args.config.as_deref().unwrap_or(Path::new(CONFIG_FILENAME))
}

/// Data collected for verbose output display.
#[derive(Debug)]
pub struct VerboseInfo {
    /// Path to the configuration file.
    pub config_path: PathBuf,
    /// Number of entry rules.
    pub rule_count: usize,
    /// Number of custom rules from configuration.
    pub custom_count: usize,
    /// Number of files to scan.
    pub file_count: usize,
    /// Active exclude glob patterns.
    pub excludes: Vec<String>,
    /// Paths being scanned.
    pub paths: Vec<PathBuf>,
    /// Maximum file size limit in bytes.
    pub max_file_size: Option<u64>,
    /// Whether `_test.go` files are scanned.
    pub include_tests: bool,
}

/// Prints verbose scan context to the terminal.
pub fn print_verbose_context(info: &VerboseInfo, level: u8) {
    let mut context_line = format!(
        "{} · {} rules · {} files",
        info.config_path.display(),
        info.rule_count,
        info.file_count
    );
    if info.custom_count > 0 {
        context_line.push_str(&format!(" · {} custom", info.custom_count));
    }

    println!("{}", colors::muted().apply_to(&context_line));

    if level >= 2 {
        print_verbose_details(info);
    }

    println!();
}

fn print_verbose_details(info: &VerboseInfo) {
    if !info.excludes.is_empty() {
        println!(
            "  {}",
            colors::muted().apply_to(format!("exclude {}", info.excludes.join(" ")))
        );
    }

    if let Some(max_size) = info.max_file_size {
        println!(
            "  {}",
            colors::muted().apply_to(format!("max {}", format_file_size(max_size)))
        );
    }

    if !info.include_tests {
        println!("  {}", colors::muted().apply_to("tests skipped"));
    }

    let paths: Vec<_> = info.paths.iter().map(|p| p.display().to_string()).collect();
    println!("  {}", colors::muted().apply_to(format!("paths {}", paths.join(" "))));
}

fn format_file_size(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{}MB", bytes / 1_048_576)
    } else if bytes >= 1024 {
        format!("{}KB", bytes / 1024)
    } else {
        format!("{bytes}B")
    }
}
