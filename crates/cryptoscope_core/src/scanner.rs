//! Per-file detection driver.

use std::fmt;
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::{debug, trace, warn};

use crate::engine::DetectionEngine;
use crate::error::ParseError;
use crate::finding::{Finding, FindingId};
use crate::go;
use crate::language::GoLanguage;
use crate::mapper::Mapper;
use crate::rule::RuleSet;
use crate::store::DetectionStore;

/// Scans Go source for cryptography usage against a compiled [`RuleSet`].
///
/// Whitespace-only content and content containing none of the entry rules'
/// method names are skipped before parsing. Each scan owns its syntax tree
/// and detection store, so one scanner can be shared across threads.
pub struct Scanner {
    rules: RuleSet,
    language: GoLanguage,
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

impl Scanner {
    /// Creates a scanner over `rules`.
    #[must_use]
    pub const fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            language: GoLanguage,
        }
    }

    /// Returns the compiled rule set.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Scans `content` and returns its findings ordered by position.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the Go parser cannot produce a tree. Syntax
    /// errors inside the source are not fatal: detection runs over whatever
    /// the parser recovered.
    pub fn scan_content(&self, content: &str, path: &Path) -> Result<Vec<Finding>, ParseError> {
        let mut findings = Vec::new();
        self.scan_content_into(content, path, &mut findings)?;
        findings.sort_by_key(|finding| finding.span);
        Ok(findings)
    }

    /// Scans `content`, appending its findings to `findings` in detection
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the Go parser cannot produce a tree.
    pub fn scan_content_into(&self, content: &str, path: &Path, findings: &mut Vec<Finding>) -> Result<(), ParseError> {
        if content.trim().is_empty() {
            #[cfg(feature = "tracing")]
            trace!("skipping blank file");
            return Ok(());
        }

        if !self.rules.might_match(content) {
            #[cfg(feature = "tracing")]
            trace!(size = content.len(), "no rule keyword present");
            return Ok(());
        }

        let tree = go::parse(content)?;
        #[cfg(feature = "tracing")]
        {
            if tree.has_errors() {
                warn!(path = %path.display(), "source has syntax errors, scanning recovered tree");
            }
        }

        let mut store = DetectionStore::new();
        DetectionEngine::new(&tree, &self.rules, &self.language).run(&mut store);

        #[cfg(feature = "tracing")]
        debug!(path = %path.display(), stores = store.len(), "detection finished");

        let mapper = Mapper::new(&tree, &self.rules, &store);
        for &root in store.roots() {
            let detected = store.get(root);
            let rule = self.rules.get(detected.rule);
            let span = tree.span(detected.node);
            let snippet = content.get(span.byte_start..span.byte_end).unwrap_or_default();

            for asset in mapper.map(root) {
                findings.push(Finding {
                    id: FindingId::new(&rule.id, path, snippet),
                    path: path.into(),
                    span,
                    rule_id: rule.id.as_str().into(),
                    bundle: rule.bundle.as_str().into(),
                    asset,
                });
            }
        }

        Ok(())
    }
}
