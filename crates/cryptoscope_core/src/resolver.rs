//! Intraprocedural value resolution.
//!
//! Given an expression and the type of value wanted, the resolver walks
//! backwards through variable definitions, qualifiers and a few call shapes
//! to produce every constant the expression could plausibly hold. It never
//! evaluates code and never fails: anything it cannot follow simply yields
//! no candidates.

use std::collections::{HashMap, HashSet};
use std::fmt;

use cryptoscope_rules::ValueKind;
use serde::Serialize;
#[cfg(feature = "tracing")]
use tracing::trace;

use crate::language::LanguageSupport;
use crate::tree::{LiteralKind, NodeId, NodeKind, SymbolId, Tree, UsageKind};

/// Maximum resolution depth. A node reached below this many steps yields
/// no candidates.
pub const MAX_DEPTH: usize = 15;

/// Resolution steps one [`Resolver::resolve`] call may take across all of
/// its paths. Once spent, every further path yields no candidates.
pub const MAX_STEPS: usize = 512;

/// Candidates kept for one variable, most recent first.
pub const MAX_CANDIDATES: usize = 32;

/// A resolved constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// An integer such as a key length.
    Integer(i64),
    /// A string such as an algorithm or curve name.
    String(String),
}

impl Value {
    /// Returns the integer, if this is one.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::String(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

/// The type of value a resolution is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectedType {
    /// Integers; literals of any other kind are rejected.
    Integer,
    /// Strings; non-string literals keep their source spelling.
    String,
}

impl ExpectedType {
    /// Size kinds expect integers, every other kind expects strings.
    #[must_use]
    pub const fn for_kind(kind: ValueKind) -> Self {
        if kind.is_size() { Self::Integer } else { Self::String }
    }

    /// Interprets a literal as this type.
    #[must_use]
    pub fn parse_literal(self, text: &str, kind: LiteralKind) -> Option<Value> {
        match (self, kind) {
            (Self::Integer, LiteralKind::Int) => parse_int(text).map(Value::Integer),
            (Self::Integer, _) => None,
            (Self::String, LiteralKind::String) => Some(Value::String(unquote(text, '"'))),
            (Self::String, LiteralKind::RawString) => Some(Value::String(unquote(text, '`'))),
            (Self::String, _) => Some(Value::String(text.to_string())),
        }
    }

    /// Interprets a bare name (an unresolved identifier or selected member)
    /// as this type.
    #[must_use]
    pub fn parse_name(self, name: &str) -> Option<Value> {
        match self {
            Self::Integer => parse_int(name).map(Value::Integer),
            Self::String => Some(Value::String(name.to_string())),
        }
    }
}

/// A candidate value together with the node it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedValue {
    /// The constant.
    pub value: Value,
    /// The literal or name the constant was read from.
    pub node: NodeId,
}

/// State shared by every path of one `resolve` call.
#[derive(Debug, Default)]
struct Walk {
    /// Symbols currently being expanded.
    trail: Vec<SymbolId>,
    steps: usize,
    /// Definitions already gathered for a symbol.
    resolved: HashMap<(SymbolId, ExpectedType), Vec<ResolvedValue>>,
}

/// Resolves expressions within one [`Tree`].
pub struct Resolver<'a> {
    tree: &'a Tree,
    support: &'a dyn LanguageSupport,
}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("language", &self.support.name())
            .finish_non_exhaustive()
    }
}

impl<'a> Resolver<'a> {
    /// Creates a resolver over `tree`.
    #[must_use]
    pub fn new(tree: &'a Tree, support: &'a dyn LanguageSupport) -> Self {
        Self { tree, support }
    }

    /// Returns every candidate value of `expression`, most recent
    /// definition first. Empty when nothing could be resolved.
    #[must_use]
    pub fn resolve(&self, expected: ExpectedType, expression: NodeId) -> Vec<ResolvedValue> {
        self.resolve_at(expected, expression, 0, &mut Walk::default())
    }

    fn resolve_at(&self, expected: ExpectedType, node: NodeId, depth: usize, walk: &mut Walk) -> Vec<ResolvedValue> {
        if depth > MAX_DEPTH {
            #[cfg(feature = "tracing")]
            trace!(node = node.index(), "resolution depth exceeded");
            return Vec::new();
        }
        if walk.steps >= MAX_STEPS {
            #[cfg(feature = "tracing")]
            trace!(node = node.index(), "resolution step budget spent");
            return Vec::new();
        }
        walk.steps += 1;

        match self.tree.kind(node) {
            NodeKind::Literal { value, kind } => expected
                .parse_literal(value, *kind)
                .map(|value| vec![ResolvedValue { value, node }])
                .unwrap_or_default(),
            NodeKind::Identifier { name, symbol, .. } => self.identifier(expected, node, name, *symbol, depth, walk),
            NodeKind::MemberSelect { expression, member } => {
                let constant = self
                    .tree
                    .identifier_name(*member)
                    .and_then(|name| expected.parse_name(name));
                match constant {
                    Some(value) => vec![ResolvedValue { value, node: *member }],
                    None => self.resolve_at(expected, *expression, depth + 1, walk),
                }
            }
            NodeKind::Invocation { callee, arguments } => {
                self.invocation(expected, node, *callee, arguments, depth, walk)
            }
            NodeKind::Block { .. }
            | NodeKind::VariableDeclaration { .. }
            | NodeKind::Parameter { .. }
            | NodeKind::Opaque { .. } => Vec::new(),
        }
    }

    fn identifier(
        &self,
        expected: ExpectedType,
        node: NodeId,
        name: &str,
        symbol: Option<SymbolId>,
        depth: usize,
        walk: &mut Walk,
    ) -> Vec<ResolvedValue> {
        if let Some(symbol) = symbol {
            let candidates = self.symbol_definitions(expected, node, symbol, depth, walk);
            if !candidates.is_empty() {
                return candidates;
            }
        }

        match self.support.resolve_enum_value(self.tree, node, expected) {
            Ok(Some(value)) => return vec![value],
            Ok(None) => {}
            #[cfg(feature = "tracing")]
            Err(unsupported) => trace!(%unsupported, "falling back to the identifier name"),
            #[cfg(not(feature = "tracing"))]
            Err(_) => {}
        }

        expected
            .parse_name(name)
            .map(|value| vec![ResolvedValue { value, node }])
            .unwrap_or_default()
    }

    fn invocation(
        &self,
        expected: ExpectedType,
        node: NodeId,
        callee: NodeId,
        arguments: &[NodeId],
        depth: usize,
        walk: &mut Walk,
    ) -> Vec<ResolvedValue> {
        let builtin = match self.tree.kind(callee) {
            NodeKind::Identifier {
                name,
                symbol: None,
                package: None,
                ..
            } => Some(name.as_str()),
            _ => None,
        };

        // make(T, size): the size is the interesting value.
        if builtin == Some("make") && arguments.len() >= 2 {
            let found = self.resolve_at(expected, arguments[1], depth + 1, walk);
            if !found.is_empty() {
                return found;
            }
        }

        if builtin.is_some_and(|name| name != "make") {
            match self.support.resolve_method_return_values(self.tree, node, expected) {
                Ok(found) if !found.is_empty() => return found,
                Ok(_) => {}
                #[cfg(feature = "tracing")]
                Err(unsupported) => trace!(%unsupported, "treating call as opaque"),
                #[cfg(not(feature = "tracing"))]
                Err(_) => {}
            }
        }

        let found = self.resolve_at(expected, callee, depth + 1, walk);
        if !found.is_empty() {
            return found;
        }

        // Any single-argument call counts as a transparent wrapper, so
        // `hash(x)` resolves to `x` just like `int(x)` does.
        if let [argument] = arguments {
            return self.resolve_at(expected, *argument, depth + 1, walk);
        }

        Vec::new()
    }

    /// Candidates from every definition of `symbol` except the one made by
    /// `node` itself. Results are reused within one walk unless `node` is a
    /// defining occurrence.
    fn symbol_definitions(
        &self,
        expected: ExpectedType,
        node: NodeId,
        symbol: SymbolId,
        depth: usize,
        walk: &mut Walk,
    ) -> Vec<ResolvedValue> {
        let usages = &self.tree.symbol(symbol).usages;
        let defining = usages.iter().any(|usage| {
            usage.identifier == node
                && matches!(usage.kind, UsageKind::Declaration { .. } | UsageKind::Assignment { .. })
        });
        let key = (symbol, expected);

        if !defining && let Some(cached) = walk.resolved.get(&key) {
            return cached.clone();
        }
        if walk.trail.contains(&symbol) {
            return Vec::new();
        }

        walk.trail.push(symbol);
        let mut candidates = Vec::new();
        let mut seen = HashSet::new();

        // Most recent definition first.
        for usage in usages.iter().rev() {
            if usage.identifier == node {
                continue;
            }
            let found = match usage.kind {
                UsageKind::Declaration { value: Some(value) } => match self.literal(expected, value) {
                    Some(constant) => vec![constant],
                    None => self.resolve_at(expected, value, depth + 1, walk),
                },
                UsageKind::Assignment { value } => self.resolve_at(expected, value, depth + 1, walk),
                UsageKind::Declaration { value: None } | UsageKind::Parameter | UsageKind::Reference => continue,
            };

            candidates.extend(found.into_iter().filter(|candidate| seen.insert(candidate.clone())));
            if candidates.len() >= MAX_CANDIDATES {
                candidates.truncate(MAX_CANDIDATES);
                break;
            }
        }
        walk.trail.pop();

        if !defining {
            walk.resolved.insert(key, candidates.clone());
        }
        candidates
    }

    fn literal(&self, expected: ExpectedType, node: NodeId) -> Option<ResolvedValue> {
        match self.tree.kind(node) {
            NodeKind::Literal { value, kind } => expected
                .parse_literal(value, *kind)
                .map(|value| ResolvedValue { value, node }),
            _ => None,
        }
    }
}

/// Parses a Go integer literal: decimal, `0x`, `0o`, leading-zero octal or
/// `0b`, with optional `_` digit separators.
#[must_use]
pub fn parse_int(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let lower = digits.to_ascii_lowercase();

    let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(octal) = lower.strip_prefix("0o") {
        (8, octal)
    } else if let Some(binary) = lower.strip_prefix("0b") {
        (2, binary)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }
    i64::from_str_radix(body, radix).ok()
}

fn unquote(text: &str, quote: char) -> String {
    text.strip_prefix(quote)
        .and_then(|inner| inner.strip_suffix(quote))
        .unwrap_or(text)
        .to_string()
}
