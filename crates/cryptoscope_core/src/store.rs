//! Arena of detection results.
//!
//! Each store records one rule matched at one node, the values captured
//! there, and the stores of rules that chained from it. Stores form a
//! forest: entry-rule matches are roots, chained matches are children.

use cryptoscope_rules::ValueKind;

use crate::resolver::Value;
use crate::rule::{RuleId, RuleSet};
use crate::tree::{NodeId, Tree};

/// Index of a store within its [`DetectionStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(u32);

impl StoreId {
    /// Returns the arena index of this store.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What produced a captured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// The rule's own tagged value.
    Rule,
    /// A detectable argument.
    Parameter {
        /// Argument position.
        index: usize,
        /// How the value is interpreted.
        kind: ValueKind,
    },
}

/// A value captured at a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedValue {
    /// The constant.
    pub value: Value,
    /// Where the constant was read from.
    pub node: NodeId,
    /// What produced it.
    pub source: ValueSource,
}

/// One rule matched at one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNode {
    /// The matched rule.
    pub rule: RuleId,
    /// The matched invocation or member select.
    pub node: NodeId,
    /// Captured values in capture order: the rule's own value first.
    pub values: Vec<DetectedValue>,
    /// Stores of rules that chained from this match.
    pub children: Vec<StoreId>,
    /// The store this one chained from.
    pub parent: Option<StoreId>,
}

/// The detection forest for one source file.
#[derive(Debug, Clone, Default)]
pub struct DetectionStore {
    nodes: Vec<StoreNode>,
    roots: Vec<StoreId>,
}

impl DetectionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store for `rule` matched at `node`, attached under `parent`
    /// or as a new root.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "store counts for one source file fit in u32"
    )]
    pub(crate) fn open(&mut self, rule: RuleId, node: NodeId, parent: Option<StoreId>) -> StoreId {
        let id = StoreId(self.nodes.len() as u32);
        self.nodes.push(StoreNode {
            rule,
            node,
            values: Vec::new(),
            children: Vec::new(),
            parent,
        });
        match parent {
            Some(parent) => self.nodes[parent.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub(crate) fn record(&mut self, id: StoreId, value: DetectedValue) {
        self.nodes[id.index()].values.push(value);
    }

    /// Detaches `id` if it captured nothing and has no children. Returns
    /// `true` if the store was discarded.
    pub(crate) fn discard_if_empty(&mut self, id: StoreId) -> bool {
        let node = &self.nodes[id.index()];
        if !node.values.is_empty() || !node.children.is_empty() {
            return false;
        }

        let parent = node.parent;
        let siblings = match parent {
            Some(parent) => &mut self.nodes[parent.index()].children,
            None => &mut self.roots,
        };
        siblings.retain(|&sibling| sibling != id);
        true
    }

    /// Returns the store with the given id.
    #[must_use]
    pub fn get(&self, id: StoreId) -> &StoreNode {
        &self.nodes[id.index()]
    }

    /// Returns the entry-rule matches, in detection order.
    #[must_use]
    pub fn roots(&self) -> &[StoreId] {
        &self.roots
    }

    /// Returns the number of attached stores.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<StoreId> = self.roots.clone();
        while let Some(id) = pending.pop() {
            count += 1;
            pending.extend(self.get(id).children.iter().copied());
        }
        count
    }

    /// Returns `true` if nothing was detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Renders the forest as an indented outline, one store per line:
    /// `rule-id @line:column [value, value]`.
    #[must_use]
    pub fn render(&self, tree: &Tree, rules: &RuleSet) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.render_node(&mut out, root, 0, tree, rules);
        }
        out
    }

    fn render_node(&self, out: &mut String, id: StoreId, depth: usize, tree: &Tree, rules: &RuleSet) {
        let store = self.get(id);
        let values: Vec<String> = store
            .values
            .iter()
            .map(|detected| match detected.source {
                ValueSource::Rule => detected.value.to_string(),
                ValueSource::Parameter { kind, .. } => format!("{kind}={}", detected.value),
            })
            .collect();

        out.push_str(&format!(
            "{:indent$}{} @{} [{}]\n",
            "",
            rules.get(store.rule).id,
            tree.span(store.node),
            values.join(", "),
            indent = depth * 2
        ));

        for &child in &store.children {
            self.render_node(out, child, depth + 1, tree, rules);
        }
    }
}
