//! # Commands
//!
//! - `cryptoscope scan` - Report cryptography usage in Go source
//! - `cryptoscope rules` - List detection rules
//! - `cryptoscope init` - Create configuration file
//! - `cryptoscope completions` - Print shell completions

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod commands;
mod files;
mod scanning;
mod ui;

use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use console::style;
pub use cryptoscope_core::CONFIG_FILENAME;

use crate::ui::colors;

const REPO_URL: &str = "https://github.com/spikermint/cryptoscope";

#[derive(Debug, Parser)]
#[command(
    name = "cryptoscope",
    version,
    styles = ui::clap_styles(),
    arg_required_else_help = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan Go source for cryptography usage.
    #[command(visible_alias = "s")]
    Scan(ScanArgs),

    /// List the builtin detection rules.
    #[command(visible_alias = "r")]
    Rules(RulesArgs),

    /// Create a `.cryptoscope.toml` configuration file.
    Init(InitArgs),

    /// Print shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Arguments for the `cryptoscope scan` command.
#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Files or directories to scan.
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to `.cryptoscope.toml` configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Always exit with code 0, even when cryptography is found.
    #[arg(long)]
    pub exit_zero: bool,

    /// Glob patterns to exclude from scanning.
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Skip `.gitignore` rules when collecting files.
    #[arg(long)]
    pub skip_gitignore: bool,

    /// Skip `_test.go` files.
    #[arg(long)]
    pub skip_tests: bool,

    /// Skip files larger than this size in bytes.
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Number of parallel scanning threads.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Arguments for the `cryptoscope rules` command.
#[derive(Debug, Parser)]
pub struct RulesArgs {
    /// Only list rules from this bundle (e.g. `aes`).
    #[arg(short, long)]
    pub bundle: Option<String>,

    /// Show targets, parameters and chained rules.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments for the `cryptoscope init` command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(short, long)]
    pub force: bool,

    /// Write the config file to a custom path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn main() {
    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }

    let cli = parse_cli();

    if let Err(e) = run(cli.command) {
        ui::print_error(&format!("{e:#}"));
        std::process::exit(ui::exit::ERROR);
    }
}

fn parse_cli() -> Cli {
    let cmd = Cli::command().about(build_about()).after_help(build_after_help());

    let matches = cmd.get_matches();

    #[expect(clippy::expect_used, reason = "clap already validated args; this cannot fail")]
    Cli::from_arg_matches(&matches).expect("failed to parse arguments")
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Scan(args) => commands::scan::run(&args),
        Command::Rules(args) => commands::rules::run(args.bundle.as_deref(), args.verbose),
        Command::Init(args) => commands::init::run(args.force, args.output),
        Command::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn build_about() -> String {
    format!(
        r"
  {} finds the cryptography a Go codebase uses.

  Reports ciphers, modes, key sizes, curves, digests, MACs, KDFs
  and TLS settings by matching calls and following local values.",
        colors::accent().apply_to("cryptoscope").bold()
    )
}

fn build_after_help() -> String {
    format!(
        r"
  {}
    cryptoscope scan .                  Scan current directory
    cryptoscope scan cmd/ internal/     Scan multiple paths
    cryptoscope scan . --format json    Output as JSON
    cryptoscope rules --bundle tls      List TLS rules
    cryptoscope init                    Create config file

  Learn more: {}",
        style("Examples:").bold(),
        colors::accent().apply_to(REPO_URL).underlined()
    )
}
