//! Bundle registry for accessing all builtin rule bundles.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::bundle::Bundle;
use crate::bundles::builtin_bundles;
use crate::rule::RuleDef;

/// Central registry of all builtin rule bundles.
pub struct BundleRegistry {
    bundles: Vec<&'static dyn Bundle>,
}

impl fmt::Debug for BundleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleRegistry")
            .field("bundles", &self.bundles.iter().map(|b| b.id()).collect::<Vec<_>>())
            .finish()
    }
}

impl BundleRegistry {
    /// Creates a registry pre-loaded with all builtin bundles.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            bundles: builtin_bundles(),
        }
    }

    /// Returns every registered bundle.
    #[must_use]
    pub fn bundles(&self) -> &[&'static dyn Bundle] {
        &self.bundles
    }

    /// Looks up a bundle by its ID (e.g. `"aes"`).
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'static dyn Bundle> {
        self.bundles.iter().copied().find(|b| b.id() == id)
    }

    /// Returns an iterator over the entry rules of every bundle.
    pub fn entry_rules(&self) -> impl Iterator<Item = &'static RuleDef> + '_ {
        self.bundles.iter().flat_map(|b| b.rules().iter().copied())
    }

    /// Returns every rule reachable from the entry rules, each exactly once,
    /// entry rules first.
    #[must_use]
    pub fn all_rules(&self) -> Vec<&'static RuleDef> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        let mut pending: VecDeque<&'static RuleDef> = self.entry_rules().collect();

        while let Some(rule) = pending.pop_front() {
            if !seen.insert(std::ptr::from_ref(rule)) {
                continue;
            }
            ordered.push(rule);

            let chained = rule
                .parameters
                .iter()
                .flat_map(|p| p.dependents.iter())
                .chain(rule.dependents.iter());
            pending.extend(chained.copied());
        }

        ordered
    }

    /// Returns the total number of entry rules across all bundles.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.bundles.iter().map(|b| b.rules().len()).sum()
    }

    /// Finds any reachable rule by ID.
    #[must_use]
    pub fn find_rule(&self, id: &str) -> Option<&'static RuleDef> {
        self.all_rules().into_iter().find(|r| r.id == id)
    }
}
