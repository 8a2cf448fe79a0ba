//! Scan command - reports cryptography usage in Go source files.

mod context;
mod output;
mod runner;

use std::time::Instant;

use cryptoscope_core::prelude::*;

use self::context::{ScanContext, VerboseInfo, config_path};
use self::output::{OutputContext, ScanStats, write_output};
use self::runner::{FileFailure, collect_scan_files, run_scan};
use crate::scanning::configure_thread_pool;
use crate::ui::{exit, print_command_header, print_warning};
use crate::{OutputFormat, ScanArgs};

/// Executes the `cryptoscope scan` command.
pub fn run(args: &ScanArgs) -> super::Result {
    configure_thread_pool(args.concurrency)?;

    let show_progress = should_show_progress(args);
    let start = Instant::now();

    if show_progress {
        print_command_header("scan");
    }

    let context = ScanContext::load(args)?;
    let include_tests = context.include_tests(args);
    let files = collect_scan_files(args, &context.config, include_tests)?;

    if show_progress && args.verbose > 0 {
        let info = build_verbose_info(args, &context, files.len());
        context::print_verbose_context(&info, args.verbose);
    }

    if files.is_empty() {
        if show_progress {
            runner::print_no_files();
        } else {
            write_empty(args, start)?;
        }
        return Ok(());
    }

    let scan_result = run_scan(&context.scanner, &files, context.max_file_size(args), show_progress);

    if show_progress {
        print_failures(&scan_result.failures);
    }

    let stats = ScanStats {
        file_count: files.len(),
        failed_count: scan_result.failures.len(),
        elapsed: start.elapsed(),
    };

    let ctx = OutputContext {
        findings: &scan_result.findings,
        content_cache: &scan_result.content_cache,
        stats,
    };

    write_output(args, &ctx)?;

    handle_exit_code(args, &scan_result.findings);

    Ok(())
}

const fn should_show_progress(args: &ScanArgs) -> bool {
    args.output.is_none() && matches!(args.format, OutputFormat::Text)
}

/// Machine-readable output is still written when nothing was collected.
fn write_empty(args: &ScanArgs, start: Instant) -> super::Result {
    let content_cache = runner::ContentCache::new();
    let ctx = OutputContext {
        findings: &[],
        content_cache: &content_cache,
        stats: ScanStats {
            file_count: 0,
            failed_count: 0,
            elapsed: start.elapsed(),
        },
    };
    write_output(args, &ctx)
}

fn build_verbose_info(args: &ScanArgs, context: &ScanContext, file_count: usize) -> VerboseInfo {
    VerboseInfo {
        config_path: config_path(args).to_path_buf(),
        rule_count: context.scanner.rules().entry_rules().len(),
        custom_count: context.config.custom_rules.len(),
        file_count,
        excludes: context
            .config
            .exclude_paths
            .iter()
            .chain(args.exclude.iter())
            .cloned()
            .collect(),
        paths: args.paths.clone(),
        max_file_size: context.max_file_size(args),
        include_tests: context.include_tests(args),
    }
}

fn print_failures(failures: &[FileFailure]) {
    for failure in failures {
        print_warning(&format!("{}: {}", failure.path.display(), failure.reason));
    }
    if !failures.is_empty() {
        eprintln!();
    }
}

fn handle_exit_code(args: &ScanArgs, findings: &[Finding]) {
    if args.exit_zero {
        return;
    }

    if !findings.is_empty() {
        std::process::exit(exit::FINDINGS);
    }
}
