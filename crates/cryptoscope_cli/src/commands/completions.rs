//! Completions command - prints shell completion scripts.

use clap_complete::Shell;

/// Writes the completion script for `shell` to stdout.
pub fn run(shell: Shell, command: &mut clap::Command) {
    let name = command.get_name().to_string();
    clap_complete::generate(shell, command, name, &mut std::io::stdout());
}
