//! UI helpers for consistent output formatting.

use std::collections::BTreeMap;
use std::time::Duration;

use console::Style;
use cryptoscope_core::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Single-character Unicode glyphs used as status indicators.
pub mod indicators {
    /// Error indicator (✖).
    pub const ERROR: &str = "✖";
    /// Warning indicator (⚠).
    pub const WARNING: &str = "⚠";
    /// Informational indicator (ℹ).
    pub const INFO: &str = "ℹ";
    /// Success indicator (✓).
    pub const SUCCESS: &str = "✓";
    /// Addition indicator (+).
    pub const ADDED: &str = "+";
    /// Finding indicator (●).
    pub const FINDING: &str = "●";
}

/// Semantic colour palette for terminal output.
pub mod colors {
    use console::Style;

    /// Red - errors.
    pub const fn error() -> Style {
        Style::new().red()
    }

    /// Yellow - warnings and skipped files.
    pub const fn warning() -> Style {
        Style::new().yellow()
    }

    /// Cyan - informational messages.
    pub const fn info() -> Style {
        Style::new().cyan()
    }

    /// Green - success messages.
    pub const fn success() -> Style {
        Style::new().green()
    }

    /// White bold - primary/headline text.
    pub const fn primary() -> Style {
        Style::new().white().bold()
    }

    /// Light grey - secondary descriptive text.
    pub const fn secondary() -> Style {
        Style::new().color256(252)
    }

    /// Dark grey - muted/contextual text.
    pub const fn muted() -> Style {
        Style::new().color256(243)
    }

    /// Cyan - accent highlights (rule IDs, commands).
    pub const fn accent() -> Style {
        Style::new().cyan()
    }

    /// White - emphasised inline text.
    pub const fn emphasis() -> Style {
        Style::new().white()
    }

    /// Dark grey - gutter line numbers.
    pub const fn line_number() -> Style {
        Style::new().color256(243)
    }

    /// Light grey - source code lines.
    pub const fn code() -> Style {
        Style::new().color256(252)
    }
}

/// Process exit codes.
pub mod exit {
    /// Cryptography usage was found.
    pub const FINDINGS: i32 = 1;
    /// An unrecoverable error occurred.
    pub const ERROR: i32 = 2;
}

const PRIMITIVE_COLOR: u8 = 141;
const PARAMETER_COLOR: u8 = 75;
const PROTOCOL_COLOR: u8 = 214;

/// Column width reserved for line numbers in code frames.
pub const LINE_NUMBER_WIDTH: usize = 4;

/// Returns the terminal colour style for an asset kind.
///
/// Primitives, their parameters and protocol settings each get one hue.
pub const fn kind_style(kind: AssetKind) -> Style {
    match kind {
        AssetKind::KeyLength | AssetKind::SaltLength | AssetKind::Mode | AssetKind::EllipticCurve => {
            Style::new().color256(PARAMETER_COLOR)
        }
        AssetKind::Tls | AssetKind::CipherSuite => Style::new().color256(PROTOCOL_COLOR),
        _ => Style::new().color256(PRIMITIVE_COLOR).bold(),
    }
}

/// Returns a kind-coloured finding indicator glyph.
#[must_use]
pub fn kind_indicator(kind: AssetKind) -> String {
    kind_style(kind).apply_to(indicators::FINDING).to_string()
}

/// Prints a styled `cryptoscope <command>` header with surrounding blank lines.
pub fn print_command_header(command: &str) {
    println!();
    println!(
        "{} {}",
        colors::accent().bold().apply_to("cryptoscope"),
        colors::muted().apply_to(command)
    );
    println!();
}

/// Prints a command hint line (`command  description`).
pub fn print_hint(command: &str, description: &str) {
    const CMD_WIDTH: usize = 28;

    println!(
        "  {}  {}",
        colors::accent().apply_to(format!("{command:<CMD_WIDTH$}")),
        colors::muted().apply_to(description)
    );
}

/// Prints a red error message to stderr.
pub fn print_error(message: &str) {
    eprintln!(
        "{} {}",
        colors::error().apply_to(indicators::ERROR),
        colors::secondary().apply_to(message)
    );
}

/// Prints a yellow warning message to stderr.
pub fn print_warning(message: &str) {
    eprintln!(
        "{} {}",
        colors::warning().apply_to(indicators::WARNING),
        colors::secondary().apply_to(message)
    );
}

/// Prints a cyan informational message to stdout.
pub fn print_info(message: &str) {
    println!(
        "{} {}",
        colors::info().apply_to(indicators::INFO),
        colors::secondary().apply_to(message)
    );
}

/// Returns `singular` when `count` is 1, otherwise `plural`.
#[must_use]
pub const fn pluralise_word<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

/// Truncates a string to `max_chars`, appending an ellipsis if shortened.
#[must_use]
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}

const PROGRESS_TICK_MS: u64 = 100;

/// Creates a progress bar for file scanning with the given total file count.
#[must_use]
pub fn create_file_progress(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);

    #[expect(
        clippy::expect_used,
        reason = "static template string; failure is a programmer error"
    )]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/243} {percent:>3}% {pos}/{len} files ({elapsed} elapsed)")
            .expect("invalid progress template")
            .progress_chars("━━╸"),
    );

    pb.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
    pb
}

/// Builds a one-line breakdown of top-level asset kinds
/// (e.g. "● 2 BlockCipher · ● 1 MessageDigest"), ordered by kind name.
#[must_use]
pub fn build_kind_summary(findings: &[Finding]) -> String {
    let mut counts: BTreeMap<&'static str, (AssetKind, usize)> = BTreeMap::new();
    for finding in findings {
        let kind = finding.kind();
        counts.entry(kind.name()).or_insert((kind, 0)).1 += 1;
    }

    counts
        .values()
        .map(|&(kind, count)| {
            format!(
                "{} {} {}",
                kind_indicator(kind),
                colors::secondary().apply_to(count),
                colors::muted().apply_to(kind.name())
            )
        })
        .collect::<Vec<_>>()
        .join(" · ")
}

const MICROSECOND_NS: u128 = 1_000;
const MILLISECOND_NS: u128 = 1_000_000;
const SECOND_NS: u128 = 1_000_000_000;

/// Formats a duration as a human-readable string with the most appropriate
/// unit (ns, µs, ms, or s).
#[expect(
    clippy::cast_precision_loss,
    reason = "nanosecond-to-float conversion is display-only; precision loss is acceptable"
)]
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();

    if nanos < MICROSECOND_NS {
        format!("{nanos}ns")
    } else if nanos < MILLISECOND_NS {
        format!("{:.1}µs", nanos as f64 / MICROSECOND_NS as f64)
    } else if nanos < SECOND_NS {
        format!("{:.1}ms", nanos as f64 / MILLISECOND_NS as f64)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}

/// Returns the shared clap colour theme used by all CLI subcommands.
#[must_use]
pub fn clap_styles() -> clap::builder::Styles {
    use clap::builder::styling::{AnsiColor, Effects, Style};

    clap::builder::Styles::styled()
        .header(
            Style::new()
                .fg_color(Some(AnsiColor::Cyan.into()))
                .effects(Effects::BOLD),
        )
        .usage(
            Style::new()
                .fg_color(Some(AnsiColor::Cyan.into()))
                .effects(Effects::BOLD),
        )
        .literal(Style::new().fg_color(Some(AnsiColor::Cyan.into())))
        .placeholder(Style::new().fg_color(Some(AnsiColor::BrightBlack.into())))
        .valid(Style::new().fg_color(Some(AnsiColor::Green.into())))
        .invalid(Style::new().fg_color(Some(AnsiColor::Red.into())))
        .error(
            Style::new()
                .fg_color(Some(AnsiColor::Red.into()))
                .effects(Effects::BOLD),
        )
}
