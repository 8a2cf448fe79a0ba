//! Rule compilation and scanner construction.

use anyhow::Context as _;
use cryptoscope_core::prelude::*;
use cryptoscope_rules::BundleRegistry;

/// Compiles the builtin catalog, minus any bundles or rules disabled by
/// configuration, plus the configuration's custom rules.
pub fn load_rules(config: &Config) -> anyhow::Result<RuleSet> {
    RuleSet::compile(&BundleRegistry::builtin(), config).context("compiling detection rules")
}

/// Builds a `Scanner` over the rules selected by `config`.
pub fn build_scanner(config: &Config) -> anyhow::Result<Scanner> {
    load_rules(config).map(Scanner::new)
}

/// Configures the global rayon thread pool with the requested number of
/// threads, if specified.
pub fn configure_thread_pool(concurrency: Option<usize>) -> anyhow::Result<()> {
    if let Some(n) = concurrency {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("failed to configure thread pool")?;
    }
    Ok(())
}
