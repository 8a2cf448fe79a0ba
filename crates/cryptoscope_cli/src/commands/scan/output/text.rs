//! Text output formatting for scan results.

use std::io::Write;

use console::style;
use cryptoscope_core::prelude::*;

use super::OutputContext;
use crate::commands::scan::runner::ContentCache;
use crate::files::{ContextLine, get_context_lines};
use crate::ui::{
    LINE_NUMBER_WIDTH, build_kind_summary, colors, format_duration, indicators, kind_indicator, kind_style,
    pluralise_word,
};

const TREE_BRANCH: &str = "├─";
const TREE_LAST: &str = "└─";
const TREE_PIPE: &str = "│  ";
const TREE_SPACE: &str = "   ";

/// Renders scan findings as styled, human-readable text to the given writer.
pub fn write(ctx: &OutputContext, writer: &mut dyn Write, strip_colors: bool, verbose: u8) -> anyhow::Result<()> {
    for finding in ctx.findings {
        write_finding(finding, ctx.content_cache, writer, strip_colors)?;
    }

    write_summary(ctx, writer, strip_colors, verbose)
}

fn write_finding(
    finding: &Finding,
    content_cache: &ContentCache,
    writer: &mut dyn Write,
    strip_colors: bool,
) -> anyhow::Result<()> {
    write_finding_header(finding, writer, strip_colors)?;
    write_code_frame(finding, content_cache, writer, strip_colors)?;

    if !finding.asset.children.is_empty() {
        writeln!(writer)?;
        write_asset_children(&finding.asset, "  ", writer, strip_colors)?;
    }

    writeln!(writer)?;
    Ok(())
}

fn write_finding_header(finding: &Finding, writer: &mut dyn Write, strip_colors: bool) -> anyhow::Result<()> {
    write_line(
        writer,
        format_args!(
            "{} {} {} {}",
            kind_indicator(finding.kind()),
            style(finding.message()).bold(),
            colors::muted().apply_to("·"),
            colors::accent().apply_to(&finding.rule_id),
        ),
        strip_colors,
    )?;

    let location = format!("{}:{}:{}", finding.path.display(), finding.line(), finding.column());

    write_line(
        writer,
        format_args!("  {}", colors::secondary().apply_to(&location)),
        strip_colors,
    )?;

    writeln!(writer)?;
    Ok(())
}

fn write_code_frame(
    finding: &Finding,
    content_cache: &ContentCache,
    writer: &mut dyn Write,
    strip_colors: bool,
) -> anyhow::Result<()> {
    let content = content_cache.get(finding.path.as_ref()).map_or("", String::as_str);

    for line in &get_context_lines(content, finding.line() as usize) {
        if line.is_finding {
            write_finding_line(line, finding, content, writer, strip_colors)?;
        } else {
            write_context_line(line, writer, strip_colors)?;
        }
    }

    Ok(())
}

fn write_finding_line(
    line: &ContextLine,
    finding: &Finding,
    content: &str,
    writer: &mut dyn Write,
    strip_colors: bool,
) -> anyhow::Result<()> {
    let line_num = format!("{:>LINE_NUMBER_WIDTH$}", line.line_number);

    write_line(
        writer,
        format_args!(
            "{} {} {}",
            style(&line_num).bold(),
            colors::muted().apply_to("│"),
            line.content
        ),
        strip_colors,
    )?;

    let underline_start = finding.column().saturating_sub(1) as usize;
    let underline_len = underline_width(finding, content);
    let padding = " ".repeat(LINE_NUMBER_WIDTH + 3 + underline_start);

    write_line(
        writer,
        format_args!(
            "{}{}",
            padding,
            kind_style(finding.kind()).apply_to("^".repeat(underline_len))
        ),
        strip_colors,
    )
}

/// Width of the matched expression on its first line, in characters.
fn underline_width(finding: &Finding, content: &str) -> usize {
    content
        .get(finding.span.byte_start..finding.span.byte_end)
        .and_then(|snippet| snippet.lines().next())
        .map_or(1, |first| first.chars().count().max(1))
}

fn write_context_line(line: &ContextLine, writer: &mut dyn Write, strip_colors: bool) -> anyhow::Result<()> {
    let line_num = format!("{:>LINE_NUMBER_WIDTH$}", line.line_number);

    write_line(
        writer,
        format_args!(
            "{} {} {}",
            colors::line_number().apply_to(&line_num),
            colors::muted().apply_to("│"),
            colors::code().apply_to(&line.content)
        ),
        strip_colors,
    )
}

fn write_asset_children(
    asset: &Asset,
    prefix: &str,
    writer: &mut dyn Write,
    strip_colors: bool,
) -> anyhow::Result<()> {
    let last = asset.children.len().saturating_sub(1);

    for (index, child) in asset.children.iter().enumerate() {
        let (branch, continuation) = if index == last {
            (TREE_LAST, TREE_SPACE)
        } else {
            (TREE_BRANCH, TREE_PIPE)
        };

        write_line(
            writer,
            format_args!(
                "{}{} {} {}",
                colors::muted().apply_to(prefix),
                colors::muted().apply_to(branch),
                kind_style(child.kind).apply_to(child.message()),
                colors::muted().apply_to(child.span.to_string()),
            ),
            strip_colors,
        )?;

        write_asset_children(child, &format!("{prefix}{continuation}"), writer, strip_colors)?;
    }

    Ok(())
}

fn write_summary(ctx: &OutputContext, writer: &mut dyn Write, strip_colors: bool, verbose: u8) -> anyhow::Result<()> {
    let file_count = ctx.stats.file_count;
    let files = format!("{file_count} {}", pluralise_word(file_count, "file", "files"));
    let time = format_duration(ctx.stats.elapsed);

    if ctx.findings.is_empty() {
        write_line(
            writer,
            format_args!(
                "{} {} {} {}",
                colors::success().apply_to(indicators::SUCCESS),
                colors::primary().apply_to("no cryptography found"),
                colors::muted().apply_to("·"),
                colors::muted().apply_to(format!("{files} ({time})"))
            ),
            strip_colors,
        )?;
    } else {
        let count = ctx.findings.len();
        let word = pluralise_word(count, "finding", "findings");

        write_line(
            writer,
            format_args!(
                "{} {} {} {} {} {}",
                colors::accent().apply_to(indicators::FINDING),
                colors::primary().apply_to(format!("{count} {word}")),
                colors::muted().apply_to("·"),
                build_kind_summary(ctx.findings),
                colors::muted().apply_to("·"),
                colors::muted().apply_to(format!("{files} ({time})"))
            ),
            strip_colors,
        )?;
    }

    if ctx.stats.failed_count > 0 {
        let failed = ctx.stats.failed_count;
        write_line(
            writer,
            format_args!(
                "{} {}",
                colors::warning().apply_to(indicators::WARNING),
                colors::secondary().apply_to(format!(
                    "{failed} {} could not be read or parsed",
                    pluralise_word(failed, "file", "files")
                ))
            ),
            strip_colors,
        )?;
    }

    if verbose > 0 && !ctx.findings.is_empty() {
        let assets: usize = ctx.findings.iter().map(|f| f.asset.walk().count()).sum();
        writeln!(writer)?;
        write_line(
            writer,
            format_args!(
                "  {}",
                colors::muted().apply_to(format!(
                    "{assets} {} across {} {}",
                    pluralise_word(assets, "asset", "assets"),
                    ctx.content_cache.len(),
                    pluralise_word(ctx.content_cache.len(), "file", "files")
                ))
            ),
            strip_colors,
        )?;
    }

    Ok(())
}

fn write_line(writer: &mut dyn Write, args: std::fmt::Arguments<'_>, strip_colors: bool) -> anyhow::Result<()> {
    if strip_colors {
        let s = args.to_string();
        let stripped = console::strip_ansi_codes(&s);
        writeln!(writer, "{stripped}")?;
    } else {
        writeln!(writer, "{args}")?;
    }
    Ok(())
}
