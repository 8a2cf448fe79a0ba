//! Language bindings consumed by the matcher, resolver and engine.
//!
//! [`LanguageTranslation`] answers structural questions about call sites.
//! [`LanguageSupport`] bundles a translation with optional resolution
//! capabilities, each of which may report [`Unsupported`].

use std::fmt;

use cryptoscope_rules::ValueKind;

use crate::resolver::{ExpectedType, ResolvedValue};
use crate::tree::{NodeId, NodeKind, Tree};

/// Structural queries the matcher needs about a call site or reference.
pub trait LanguageTranslation: Send + Sync {
    /// The called function or selected member name.
    fn method_name(&self, tree: &Tree, node: NodeId) -> Option<String>;

    /// The package path or type the call or reference is made on.
    fn invoked_object_type(&self, tree: &Tree, node: NodeId) -> Option<String>;

    /// One entry per argument of an invocation. `None` means the type is
    /// unknown, which is compatible with any declared type.
    fn parameter_types(&self, tree: &Tree, node: NodeId) -> Option<Vec<Option<String>>>;

    /// The textual name of an identifier or member select.
    fn resolve_identifier_as_string(&self, tree: &Tree, node: NodeId) -> Option<String>;
}

/// An optional resolution capability of a [`LanguageSupport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Resolving a value from the caller of the enclosing function.
    OuterScopeResolution,
    /// Resolving the values a called function returns.
    MethodReturnResolution,
    /// Finding the function that encloses a node.
    EnclosingMethod,
    /// Resolving a named enum member to its value.
    EnumResolution,
}

impl Capability {
    /// All capabilities in declaration order.
    pub const ALL: [Self; 4] = [
        Self::OuterScopeResolution,
        Self::MethodReturnResolution,
        Self::EnclosingMethod,
        Self::EnumResolution,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OuterScopeResolution => "outer-scope resolution",
            Self::MethodReturnResolution => "method-return resolution",
            Self::EnclosingMethod => "enclosing-method lookup",
            Self::EnumResolution => "enum resolution",
        })
    }
}

/// A capability the language binding does not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{capability} is not supported for {language}")]
pub struct Unsupported {
    /// The missing capability.
    pub capability: Capability,
    /// Name of the language binding.
    pub language: &'static str,
}

/// A language binding: structural translation plus optional capabilities.
///
/// Every capability defaults to [`Unsupported`]. Callers treat that exactly
/// like an empty result.
pub trait LanguageSupport: Send + Sync {
    /// Short language name used in diagnostics.
    fn name(&self) -> &'static str;

    /// The structural translation for this language.
    fn translation(&self) -> &dyn LanguageTranslation;

    /// Resolves `expression` through the callers of its enclosing function.
    fn resolve_in_outer_scope(
        &self,
        _tree: &Tree,
        _expression: NodeId,
        _kind: ValueKind,
    ) -> Result<Vec<ResolvedValue>, Unsupported> {
        Err(self.unsupported(Capability::OuterScopeResolution))
    }

    /// Resolves the values returned by the function `call` invokes.
    fn resolve_method_return_values(
        &self,
        _tree: &Tree,
        _call: NodeId,
        _expected: ExpectedType,
    ) -> Result<Vec<ResolvedValue>, Unsupported> {
        Err(self.unsupported(Capability::MethodReturnResolution))
    }

    /// Finds the function declaration enclosing `node`.
    fn enclosing_method(&self, _tree: &Tree, _node: NodeId) -> Result<Option<NodeId>, Unsupported> {
        Err(self.unsupported(Capability::EnclosingMethod))
    }

    /// Resolves a named enum member to its value.
    fn resolve_enum_value(
        &self,
        _tree: &Tree,
        _node: NodeId,
        _expected: ExpectedType,
    ) -> Result<Option<ResolvedValue>, Unsupported> {
        Err(self.unsupported(Capability::EnumResolution))
    }

    /// Builds the [`Unsupported`] error for `capability`.
    fn unsupported(&self, capability: Capability) -> Unsupported {
        Unsupported {
            capability,
            language: self.name(),
        }
    }
}

/// The Go binding. Supports none of the optional capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoLanguage;

impl LanguageSupport for GoLanguage {
    fn name(&self) -> &'static str {
        "go"
    }

    fn translation(&self) -> &dyn LanguageTranslation {
        self
    }
}

impl LanguageTranslation for GoLanguage {
    fn method_name(&self, tree: &Tree, node: NodeId) -> Option<String> {
        match tree.kind(node) {
            NodeKind::Invocation { callee, .. } => self.resolve_identifier_as_string(tree, *callee),
            NodeKind::MemberSelect { member, .. } => tree.identifier_name(*member).map(str::to_string),
            _ => None,
        }
    }

    fn invoked_object_type(&self, tree: &Tree, node: NodeId) -> Option<String> {
        let qualifier = match tree.kind(node) {
            NodeKind::Invocation { callee, .. } => match tree.kind(*callee) {
                NodeKind::MemberSelect { expression, .. } => *expression,
                _ => return None,
            },
            NodeKind::MemberSelect { expression, .. } => *expression,
            _ => return None,
        };

        match tree.kind(qualifier) {
            NodeKind::Identifier {
                name,
                package,
                type_name,
                ..
            } => package.clone().or_else(|| type_name.clone()).or_else(|| Some(name.clone())),
            _ => None,
        }
    }

    fn parameter_types(&self, tree: &Tree, node: NodeId) -> Option<Vec<Option<String>>> {
        let arguments = tree.arguments(node)?;
        Some(
            arguments
                .iter()
                .map(|&argument| match tree.kind(argument) {
                    NodeKind::Identifier { type_name, .. } => type_name.clone(),
                    _ => None,
                })
                .collect(),
        )
    }

    fn resolve_identifier_as_string(&self, tree: &Tree, node: NodeId) -> Option<String> {
        match tree.kind(node) {
            NodeKind::Identifier { name, .. } => Some(name.clone()),
            NodeKind::MemberSelect { member, .. } => tree.identifier_name(*member).map(str::to_string),
            _ => None,
        }
    }
}
