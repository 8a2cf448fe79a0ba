//! CLI command handlers.

/// Shell completion generation.
pub mod completions;
/// Project initialisation and `.cryptoscope.toml` creation.
pub mod init;
/// Rule listing and inspection.
pub mod rules;
/// Go source scanning for cryptography usage.
pub mod scan;

/// Convenience alias for command return types.
pub type Result<T = ()> = anyhow::Result<T>;
