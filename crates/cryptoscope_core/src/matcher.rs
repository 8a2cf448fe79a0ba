//! Decides whether a call site or reference satisfies a rule.

use crate::language::LanguageTranslation;
use crate::rule::Rule;
use crate::tree::{NodeId, NodeKind, Tree};

/// Declared type that accepts any argument.
pub const ANY_TYPE: &str = "*";

/// Returns `true` if `node` satisfies `rule`.
///
/// Invocations must match on method name, object type, argument count and
/// argument types. Member selects are references to a function or constant
/// and match on name and object type only. Every other node kind never
/// matches.
#[must_use]
pub fn matches(rule: &Rule, tree: &Tree, node: NodeId, translation: &dyn LanguageTranslation) -> bool {
    let invocation = match tree.kind(node) {
        NodeKind::Invocation { .. } => true,
        NodeKind::MemberSelect { .. } => false,
        _ => return false,
    };

    let Some(name) = translation.method_name(tree, node) else {
        return false;
    };
    if !rule.methods.iter().any(|m| *m == name) {
        return false;
    }

    if !rule.targets.is_empty() {
        let Some(object_type) = translation.invoked_object_type(tree, node) else {
            return false;
        };
        if !rule.targets.iter().any(|target| types_equivalent(target, &object_type)) {
            return false;
        }
    }

    !invocation || arguments_match(rule, tree, node, translation)
}

fn arguments_match(rule: &Rule, tree: &Tree, call: NodeId, translation: &dyn LanguageTranslation) -> bool {
    let Some(argument_types) = translation.parameter_types(tree, call) else {
        return false;
    };
    if argument_types.len() < rule.required_arguments() {
        return false;
    }

    rule.parameters.iter().all(|parameter| {
        let declared = parameter.type_name();
        match argument_types.get(parameter.index()) {
            Some(Some(actual)) => declared == ANY_TYPE || types_equivalent(declared, actual),
            Some(None) | None => true,
        }
    })
}

/// Type equivalence used for targets and arguments: exact equality, or the
/// last path segment of whichever side contains `/` equals the other side.
///
/// `crypto/aes` is equivalent to `aes`, but not to `x/aes`.
#[must_use]
pub fn types_equivalent(a: &str, b: &str) -> bool {
    a == b || last_segment_equals(a, b) || last_segment_equals(b, a)
}

fn last_segment_equals(path: &str, name: &str) -> bool {
    path.rsplit_once('/').is_some_and(|(_, last)| last == name)
}
