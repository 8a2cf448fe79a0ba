//! File collection and parallel scanning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cryptoscope_core::prelude::*;
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::{trace, warn};

use crate::ScanArgs;
use crate::files::{FileFilter, collect_files, read_text_file};
use crate::ui::{colors, create_file_progress, indicators};

/// Aggregated results from scanning all files.
#[derive(Debug)]
pub struct ScanResult {
    /// All findings, ordered by path then position.
    pub findings: Vec<Finding>,
    /// File content keyed by path, retained for code frames.
    pub content_cache: ContentCache,
    /// Files that could not be read or parsed, with the reason.
    pub failures: Vec<FileFailure>,
}

/// Maps file paths to their text content for post-scan access.
pub type ContentCache = HashMap<PathBuf, String>;

/// A file skipped because it could not be read or parsed.
#[derive(Debug)]
pub struct FileFailure {
    /// The file that failed.
    pub path: PathBuf,
    /// Why it failed.
    pub reason: String,
}

enum FileOutcome {
    Clean,
    Found(Vec<Finding>, PathBuf, String),
    Failed(FileFailure),
}

/// Collects the Go files to scan from the command line and configuration.
pub fn collect_scan_files(
    args: &ScanArgs,
    config: &Config,
    include_tests: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    let all_excludes: Vec<String> = config
        .exclude_paths
        .iter()
        .chain(args.exclude.iter())
        .cloned()
        .collect();

    let filter = FileFilter {
        respect_gitignore: !args.skip_gitignore,
        include_tests,
    };

    collect_files(&args.paths, &all_excludes, filter)
}

/// Scans all files in parallel using rayon, returning findings and cached content.
#[must_use]
pub fn run_scan(scanner: &Scanner, files: &[PathBuf], max_file_size: Option<u64>, show_progress: bool) -> ScanResult {
    let outcomes: Vec<FileOutcome> = if show_progress {
        let pb = create_file_progress(files.len());
        let outcomes = files
            .par_iter()
            .map(|path| {
                let outcome = scan_file(scanner, path, max_file_size);
                pb.inc(1);
                outcome
            })
            .collect();
        pb.finish_and_clear();
        outcomes
    } else {
        files
            .par_iter()
            .map(|path| scan_file(scanner, path, max_file_size))
            .collect()
    };

    aggregate_results(outcomes)
}

/// Prints a message when no files are available to scan.
pub fn print_no_files() {
    println!("{} no Go files to scan", colors::warning().apply_to(indicators::FINDING));
    println!();
    println!("  Check your .gitignore or exclude patterns.");
    println!();
}

fn scan_file(scanner: &Scanner, path: &Path, max_file_size: Option<u64>) -> FileOutcome {
    let content = match read_text_file(path, max_file_size) {
        Ok(Some(content)) => content,
        Ok(None) => {
            #[cfg(feature = "tracing")]
            trace!(path = %path.display(), "skipping file above size limit");
            return FileOutcome::Clean;
        }
        Err(e) => return failed(path, format!("failed to read: {e}")),
    };

    match scanner.scan_content(&content, path) {
        Ok(findings) if findings.is_empty() => FileOutcome::Clean,
        Ok(findings) => FileOutcome::Found(findings, path.to_path_buf(), content),
        Err(e) => failed(path, format!("failed to parse: {e}")),
    }
}

fn failed(path: &Path, reason: String) -> FileOutcome {
    #[cfg(feature = "tracing")]
    warn!(path = %path.display(), %reason, "skipping file");

    FileOutcome::Failed(FileFailure {
        path: path.to_path_buf(),
        reason,
    })
}

fn aggregate_results(outcomes: Vec<FileOutcome>) -> ScanResult {
    let mut findings = Vec::new();
    let mut content_cache = HashMap::new();
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome {
            FileOutcome::Clean => {}
            FileOutcome::Found(file_findings, path, content) => {
                findings.extend(file_findings);
                content_cache.insert(path, content);
            }
            FileOutcome::Failed(failure) => failures.push(failure),
        }
    }

    findings.sort_by(|a, b| a.path.cmp(&b.path).then(a.span.cmp(&b.span)));

    ScanResult {
        findings,
        content_cache,
        failures,
    }
}
