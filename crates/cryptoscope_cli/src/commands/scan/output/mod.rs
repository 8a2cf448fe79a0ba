//! Output formatting for scan results.

mod json;
mod text;

use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use cryptoscope_core::prelude::*;

use super::runner::ContentCache;
use crate::{OutputFormat, ScanArgs};

/// Aggregate statistics for a completed scan.
#[derive(Debug)]
pub struct ScanStats {
    /// Number of files scanned.
    pub file_count: usize,
    /// Number of files skipped because they could not be read or parsed.
    pub failed_count: usize,
    /// Wall-clock time for the entire scan.
    pub elapsed: Duration,
}

/// Everything needed to render scan output in any format.
#[derive(Debug)]
pub struct OutputContext<'a> {
    /// Findings to include in the output.
    pub findings: &'a [Finding],
    /// Cached file content for context line display.
    pub content_cache: &'a ContentCache,
    /// Scan statistics for the summary line.
    pub stats: ScanStats,
}

/// Writes scan output to a file or stdout in the requested format.
pub fn write_output(args: &ScanArgs, ctx: &OutputContext) -> anyhow::Result<()> {
    match &args.output {
        Some(path) => write_to_file(path, args.format, ctx),
        None => write_to_stdout(args.format, args.verbose, ctx),
    }
}

fn write_to_file(path: &Path, format: OutputFormat, ctx: &OutputContext) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        OutputFormat::Text => text::write(ctx, &mut writer, true, 0)?,
        OutputFormat::Json => json::write(ctx.findings, &mut writer)?,
    }

    writer
        .flush()
        .with_context(|| format!("failed to write output file: {}", path.display()))
}

fn write_to_stdout(format: OutputFormat, verbose: u8, ctx: &OutputContext) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();

    match format {
        OutputFormat::Text => text::write(ctx, &mut stdout, false, verbose),
        OutputFormat::Json => json::write(ctx.findings, &mut stdout),
    }
}
