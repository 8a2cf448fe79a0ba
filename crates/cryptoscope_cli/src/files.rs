//! File collection and reading utilities.
//!
//! Handles walking directories with gitignore support, applying exclude
//! patterns, selecting Go sources, and reading them with size limits.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};

const GO_EXTENSION: &str = "go";
const TEST_SUFFIX: &str = "_test.go";

const CONTEXT_LINES_BEFORE: usize = 1;
const CONTEXT_LINES_AFTER: usize = 1;

/// Which files a walk should yield.
#[derive(Debug, Clone, Copy)]
pub struct FileFilter {
    /// Honour `.gitignore`, global and `.git/info/exclude` rules.
    pub respect_gitignore: bool,
    /// Yield `_test.go` files.
    pub include_tests: bool,
}

/// Walks the given paths, collecting Go source files while honouring
/// exclude globs and gitignore rules. The result is sorted.
///
/// Paths named directly are kept when they are Go sources not matched by an
/// exclude; paths that do not exist contribute nothing.
pub fn collect_files(paths: &[PathBuf], excludes: &[String], filter: FileFilter) -> anyhow::Result<Vec<PathBuf>> {
    let excluded = build_globset(excludes)?;
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_go_source(path, filter.include_tests) && !excluded.is_match(path) {
                files.push(path.clone());
            }
            continue;
        }

        let overrides = build_overrides(path, excludes)?;
        let walker = build_walker(path, overrides, filter.respect_gitignore);

        let (tx, rx) = std::sync::mpsc::channel();
        walker.run(|| {
            let tx = tx.clone();
            Box::new(move |result| {
                if let Ok(entry) = result
                    && is_scannable_file(&entry, filter.include_tests)
                {
                    let _ = tx.send(entry.into_path());
                }
                ignore::WalkState::Continue
            })
        });
        drop(tx);
        files.extend(rx);
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Returns `true` for `.go` files, and for `_test.go` files only when
/// `include_tests` is set.
#[must_use]
pub fn is_go_source(path: &Path, include_tests: bool) -> bool {
    let is_go = path.extension().is_some_and(|ext| ext == GO_EXTENSION);
    let is_test = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(TEST_SUFFIX));
    is_go && (include_tests || !is_test)
}

fn is_scannable_file(entry: &ignore::DirEntry, include_tests: bool) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_file()) && is_go_source(entry.path(), include_tests)
}

/// Reads a file as UTF-8 text.
///
/// Returns `Ok(None)` when the file exceeds `max_size`. Unreadable files and
/// invalid UTF-8 are errors.
pub fn read_text_file(path: &Path, max_size: Option<u64>) -> io::Result<Option<String>> {
    let mut file = std::fs::File::open(path)?;
    let len = file.metadata()?.len();

    if let Some(max) = max_size
        && len > max
    {
        return Ok(None);
    }

    let mut bytes = Vec::with_capacity(usize::try_from(len).unwrap_or_default());
    file.read_to_end(&mut bytes)?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn build_globset(excludes: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in excludes {
        let glob = Glob::new(pattern).with_context(|| format!("invalid exclude pattern '{pattern}'"))?;
        builder.add(glob);
    }
    builder.build().context("failed to compile exclude patterns")
}

fn build_overrides(path: &Path, excludes: &[String]) -> anyhow::Result<Override> {
    let mut builder = OverrideBuilder::new(path);

    for pattern in excludes {
        builder
            .add(&format!("!{pattern}"))
            .with_context(|| format!("invalid exclude pattern '{pattern}'"))?;
    }

    builder.build().context("failed to build exclude overrides")
}

fn build_walker(path: &Path, overrides: Override, respect_gitignore: bool) -> ignore::WalkParallel {
    WalkBuilder::new(path)
        .hidden(false)
        .git_ignore(respect_gitignore)
        .git_global(respect_gitignore)
        .git_exclude(respect_gitignore)
        .overrides(overrides)
        .build_parallel()
}

/// A single line of source code displayed alongside a finding.
#[derive(Debug, Clone)]
pub struct ContextLine {
    /// One-based line number in the original file.
    pub line_number: usize,
    /// The line text.
    pub content: String,
    /// Whether this line holds the finding.
    pub is_finding: bool,
}

/// Extracts the finding line and its neighbours from `content`.
#[must_use]
pub fn get_context_lines(content: &str, finding_line: usize) -> Vec<ContextLine> {
    let lines: Vec<&str> = content.lines().collect();
    let finding_index = finding_line.saturating_sub(1);

    let start = finding_index.saturating_sub(CONTEXT_LINES_BEFORE);
    let end = (finding_index + CONTEXT_LINES_AFTER + 1).min(lines.len());

    (start..end)
        .map(|index| ContextLine {
            line_number: index + 1,
            content: lines.get(index).copied().unwrap_or("").to_string(),
            is_finding: index == finding_index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::{NamedTempFile, TempDir};

    use super::*;

    const ALL: FileFilter = FileFilter {
        respect_gitignore: true,
        include_tests: true,
    };

    #[test]
    fn read_text_file_success() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "package main").unwrap();

        let content = read_text_file(file.path(), None).unwrap();

        assert!(content.unwrap().contains("package main"));
    }

    #[test]
    fn read_text_file_nonexistent_is_an_error() {
        assert!(read_text_file(Path::new("/nonexistent/main.go"), None).is_err());
    }

    #[test]
    fn read_text_file_exceeds_size_limit() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", "x".repeat(1000)).unwrap();

        assert!(read_text_file(file.path(), Some(500)).unwrap().is_none());
    }

    #[test]
    fn read_text_file_exactly_at_limit() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", "x".repeat(100)).unwrap();

        assert!(read_text_file(file.path(), Some(100)).unwrap().is_some());
    }

    #[test]
    fn read_text_file_rejects_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"package main\n\xff\xfe").unwrap();

        let err = read_text_file(file.path(), None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn is_go_source_checks_extension_and_tests() {
        assert!(is_go_source(Path::new("main.go"), false));
        assert!(is_go_source(Path::new("main_test.go"), true));
        assert!(!is_go_source(Path::new("main_test.go"), false));
        assert!(!is_go_source(Path::new("main.rs"), true));
        assert!(!is_go_source(Path::new("go"), true));
    }

    #[test]
    fn collect_files_only_yields_go_sources() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("main.go"), "package main").unwrap();
        std::fs::write(dir.path().join("README.md"), "# readme").unwrap();
        std::fs::write(dir.path().join("go.mod"), "module x").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()], &[], ALL).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("main.go"));
    }

    #[test]
    fn collect_files_skips_tests_when_asked() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("main.go"), "package main").unwrap();
        std::fs::write(dir.path().join("main_test.go"), "package main").unwrap();

        let filter = FileFilter {
            include_tests: false,
            ..ALL
        };
        let files = collect_files(&[dir.path().to_path_buf()], &[], filter).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("main.go"));
    }

    #[test]
    fn collect_files_with_exclude_pattern() {
        let dir = TempDir::new().unwrap();
        let cmd = dir.path().join("cmd");
        let vendor = dir.path().join("vendor");
        std::fs::create_dir(&cmd).unwrap();
        std::fs::create_dir(&vendor).unwrap();
        std::fs::write(cmd.join("main.go"), "package main").unwrap();
        std::fs::write(vendor.join("lib.go"), "package lib").unwrap();

        let excludes = vec!["vendor/**".to_string()];
        let files = collect_files(&[dir.path().to_path_buf()], &excludes, ALL).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("main.go"));
    }

    #[test]
    fn collect_files_rejects_invalid_exclude() {
        let dir = TempDir::new().unwrap();
        let excludes = vec!["vendor/[".to_string()];

        let err = collect_files(&[dir.path().to_path_buf()], &excludes, ALL).unwrap_err();

        assert!(err.to_string().contains("vendor/["));
    }

    #[test]
    fn collect_files_direct_file_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("crypto.go");
        std::fs::write(&file, "package main").unwrap();

        let files = collect_files(std::slice::from_ref(&file), &[], ALL).unwrap();

        assert_eq!(files, [file]);
    }

    #[test]
    fn collect_files_direct_non_go_file_skipped() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "aes.NewCipher").unwrap();

        assert!(collect_files(&[file], &[], ALL).unwrap().is_empty());
    }

    #[test]
    fn collect_files_nested_directories_are_sorted() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("deep.go"), "package b").unwrap();
        std::fs::write(dir.path().join("z.go"), "package main").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()], &[], ALL).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a/b/deep.go"));
        assert!(files[1].ends_with("z.go"));
    }

    #[test]
    fn collect_files_empty_directory() {
        let dir = TempDir::new().unwrap();

        assert!(collect_files(&[dir.path().to_path_buf()], &[], ALL).unwrap().is_empty());
    }

    #[test]
    fn get_context_lines_middle_of_file() {
        let content = "a\nb\nblock, _ := aes.NewCipher(key)\nd\ne";
        let lines = get_context_lines(content, 3);

        let numbers: Vec<_> = lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, [2, 3, 4]);
        assert!(lines[1].is_finding);
        assert_eq!(lines[1].content, "block, _ := aes.NewCipher(key)");
    }

    #[test]
    fn get_context_lines_first_and_last_line() {
        let content = "first\nsecond";
        assert_eq!(get_context_lines(content, 1).len(), 2);
        assert_eq!(get_context_lines(content, 2).len(), 2);
        assert!(get_context_lines(content, 2)[1].is_finding);
    }
}
