//! The detection engine driver.
//!
//! The engine applies rules to a [`Tree`] and records what it finds in a
//! [`DetectionStore`]. There are two entry points:
//!
//! - **Blocks.** Every invocation that initializes a declaration or stands
//!   alone as a statement is tried against each entry rule.
//! - **References.** Every member select outside callee position
//!   (`sha256.New`, `tls.VersionTLS12`) is tried as a function or constant
//!   reference, which records the rule's own value only.
//!
//! A matched invocation captures the rule's value, resolves its detectable
//! arguments, and hands dependent arguments to further rules. When the
//! result is bound to a variable, rule-level dependents are tried against
//! later calls in the same block that use that variable. This is how
//! `cipher.NewGCM(block)` attaches to the `aes.NewCipher` that produced
//! `block`.

use std::fmt;

use cryptoscope_rules::ValueKind;
#[cfg(feature = "tracing")]
use tracing::trace;

use crate::language::LanguageSupport;
use crate::matcher;
use crate::resolver::{ExpectedType, MAX_DEPTH, ResolvedValue, Resolver, Value};
use crate::rule::{Parameter, Rule, RuleId, RuleSet, RuleValue};
use crate::store::{DetectedValue, DetectionStore, StoreId, ValueSource};
use crate::tree::{NodeId, NodeKind, SymbolId, Tree, UsageKind};

/// An invocation together with the context it appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationView {
    /// The invocation node.
    pub call: NodeId,
    /// The declaration the invocation initializes, if any.
    pub declaration: Option<NodeId>,
    /// The block containing the statement.
    pub block: NodeId,
}

/// Applies a [`RuleSet`] to one [`Tree`].
pub struct DetectionEngine<'a> {
    tree: &'a Tree,
    rules: &'a RuleSet,
    support: &'a dyn LanguageSupport,
    resolver: Resolver<'a>,
}

impl fmt::Debug for DetectionEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionEngine")
            .field("language", &self.support.name())
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

impl<'a> DetectionEngine<'a> {
    /// Creates an engine over `tree`.
    #[must_use]
    pub fn new(tree: &'a Tree, rules: &'a RuleSet, support: &'a dyn LanguageSupport) -> Self {
        Self {
            tree,
            rules,
            support,
            resolver: Resolver::new(tree, support),
        }
    }

    /// Runs every entry rule over every block and reference in the tree.
    pub fn run(&self, store: &mut DetectionStore) {
        for &rule in self.rules.entry_rules() {
            for &block in self.tree.blocks() {
                self.run_on_block(rule, block, store);
            }
            for &reference in self.tree.references() {
                self.run_on_reference(rule, reference, store, None);
            }
        }
    }

    /// Block entry: tries `rule` against each statement-level invocation.
    pub fn run_on_block(&self, rule: RuleId, block: NodeId, store: &mut DetectionStore) {
        for &statement in self.tree.statements(block) {
            for view in self.invocations(statement, block) {
                if self.matches(rule, view.call) {
                    self.analyse(rule, view, store, None, 0);
                }
            }
        }
    }

    /// Reference entry: records `rule`'s own value if `select` matches it.
    pub fn run_on_reference(
        &self,
        rule: RuleId,
        select: NodeId,
        store: &mut DetectionStore,
        parent: Option<StoreId>,
    ) -> Option<StoreId> {
        if !self.matches(rule, select) {
            return None;
        }

        #[cfg(feature = "tracing")]
        trace!(rule = %self.rules.get(rule).id, at = %self.tree.span(select), "reference matched");

        let id = store.open(rule, select, parent);
        if let Some(value) = self.rule_value(self.rules.get(rule), select) {
            store.record(id, value);
        }
        (!store.discard_if_empty(id)).then_some(id)
    }

    /// Analyses a matched invocation: captures its values, follows its
    /// dependent arguments, and chains into later uses of its result.
    pub fn analyse(
        &self,
        rule_id: RuleId,
        view: InvocationView,
        store: &mut DetectionStore,
        parent: Option<StoreId>,
        depth: usize,
    ) -> Option<StoreId> {
        let rule = self.rules.get(rule_id);

        #[cfg(feature = "tracing")]
        trace!(rule = %rule.id, at = %self.tree.span(view.call), depth, "invocation matched");

        let id = store.open(rule_id, view.call, parent);
        if let Some(value) = self.rule_value(rule, view.call) {
            store.record(id, value);
        }

        let arguments = self.tree.arguments(view.call).unwrap_or_default();
        for parameter in &rule.parameters {
            let Some(&argument) = arguments.get(parameter.index()) else {
                continue;
            };
            match parameter {
                Parameter::Plain { .. } => {}
                Parameter::Detectable { index, kind, .. } => {
                    for resolved in self.detect(argument, *kind) {
                        store.record(
                            id,
                            DetectedValue {
                                value: resolved.value,
                                node: resolved.node,
                                source: ValueSource::Parameter {
                                    index: *index,
                                    kind: *kind,
                                },
                            },
                        );
                    }
                }
                Parameter::Dependent { rules, .. } => {
                    if depth < MAX_DEPTH {
                        self.dependent_argument(rules, argument, view.block, store, id, depth + 1);
                    }
                }
            }
        }

        if !rule.dependents.is_empty()
            && depth < MAX_DEPTH
            && let Some(symbol) = self.trace_symbol(view)
        {
            self.chain(rule, symbol, view, store, id, depth + 1);
        }

        (!store.discard_if_empty(id)).then_some(id)
    }

    fn matches(&self, rule: RuleId, node: NodeId) -> bool {
        matcher::matches(self.rules.get(rule), self.tree, node, self.support.translation())
    }

    fn rule_value(&self, rule: &Rule, node: NodeId) -> Option<DetectedValue> {
        let value = match &rule.value {
            RuleValue::None => return None,
            RuleValue::Constant(value) => value.clone(),
            RuleValue::MemberName => self.support.translation().method_name(self.tree, node)?,
        };
        Some(DetectedValue {
            value: Value::String(value),
            node,
            source: ValueSource::Rule,
        })
    }

    /// Resolves a detectable argument in the current scope, then asks the
    /// language binding to look further out. Outer scopes are the callers
    /// of the enclosing function, so an argument outside any function stops
    /// at the current scope.
    fn detect(&self, argument: NodeId, kind: ValueKind) -> Vec<ResolvedValue> {
        let values = self.resolver.resolve(ExpectedType::for_kind(kind), argument);
        if !values.is_empty() {
            return values;
        }

        match self.support.enclosing_method(self.tree, argument) {
            Ok(None) => return Vec::new(),
            Ok(Some(_)) => {}
            #[cfg(feature = "tracing")]
            Err(unsupported) => trace!(%unsupported, "enclosing function unknown"),
            #[cfg(not(feature = "tracing"))]
            Err(_) => {}
        }

        match self.support.resolve_in_outer_scope(self.tree, argument, kind) {
            Ok(values) => values,
            #[cfg(feature = "tracing")]
            Err(unsupported) => {
                trace!(%unsupported, "argument unresolved");
                Vec::new()
            }
            #[cfg(not(feature = "tracing"))]
            Err(_) => Vec::new(),
        }
    }

    fn dependent_argument(
        &self,
        rules: &[RuleId],
        argument: NodeId,
        block: NodeId,
        store: &mut DetectionStore,
        parent: StoreId,
        depth: usize,
    ) {
        match self.tree.kind(argument) {
            NodeKind::Invocation { .. } => {
                let view = InvocationView {
                    call: argument,
                    declaration: self.declaration_of(argument, block),
                    block,
                };
                self.analyse_dependents(rules, view, store, parent, depth);
            }
            NodeKind::MemberSelect { .. } => {
                for &rule in rules {
                    self.run_on_reference(rule, argument, store, Some(parent));
                }
            }
            NodeKind::Identifier { symbol: Some(symbol), .. } => {
                if let Some(view) = self.declared_invocation(*symbol, block) {
                    self.analyse_dependents(rules, view, store, parent, depth);
                }
            }
            _ => {}
        }
    }

    fn analyse_dependents(
        &self,
        rules: &[RuleId],
        view: InvocationView,
        store: &mut DetectionStore,
        parent: StoreId,
        depth: usize,
    ) {
        for &rule in rules {
            if self.matches(rule, view.call) {
                self.analyse(rule, view, store, Some(parent), depth);
            }
        }
    }

    /// The first declared identifier bound to a variable that is not an
    /// `error`.
    fn trace_symbol(&self, view: InvocationView) -> Option<SymbolId> {
        let declaration = view.declaration?;
        let NodeKind::VariableDeclaration { identifiers, .. } = self.tree.kind(declaration) else {
            return None;
        };

        identifiers.iter().find_map(|&identifier| match self.tree.kind(identifier) {
            NodeKind::Identifier {
                symbol: Some(symbol),
                type_name,
                ..
            } if type_name.as_deref() != Some("error") => Some(*symbol),
            _ => None,
        })
    }

    /// Tries `rule`'s dependents against later invocations in the same block
    /// that take the traced variable as an argument or receiver.
    fn chain(
        &self,
        rule: &Rule,
        symbol: SymbolId,
        view: InvocationView,
        store: &mut DetectionStore,
        parent: StoreId,
        depth: usize,
    ) {
        let statements = self.tree.statements(view.block);
        let Some(position) = statements.iter().position(|&s| Some(s) == view.declaration) else {
            return;
        };

        for &statement in &statements[position + 1..] {
            for later in self.invocations(statement, view.block) {
                if !self.uses_symbol(later.call, symbol) {
                    continue;
                }
                for &dependent in &rule.dependents {
                    if self.matches(dependent, later.call) {
                        #[cfg(feature = "tracing")]
                        trace!(
                            from = %rule.id,
                            to = %self.rules.get(dependent).id,
                            "chained through traced variable"
                        );
                        self.analyse(dependent, later, store, Some(parent), depth);
                    }
                }
            }
        }
    }

    /// Statement-level invocations: declaration initializers and bare calls.
    fn invocations(&self, statement: NodeId, block: NodeId) -> Vec<InvocationView> {
        match self.tree.kind(statement) {
            NodeKind::VariableDeclaration { initializers, .. } => initializers
                .iter()
                .filter(|&&init| matches!(self.tree.kind(init), NodeKind::Invocation { .. }))
                .map(|&call| InvocationView {
                    call,
                    declaration: Some(statement),
                    block,
                })
                .collect(),
            NodeKind::Invocation { .. } => vec![InvocationView {
                call: statement,
                declaration: None,
                block,
            }],
            _ => Vec::new(),
        }
    }

    fn declaration_of(&self, call: NodeId, block: NodeId) -> Option<NodeId> {
        self.tree.statements(block).iter().copied().find(|&statement| {
            matches!(
                self.tree.kind(statement),
                NodeKind::VariableDeclaration { initializers, .. } if initializers.contains(&call)
            )
        })
    }

    /// Follows a variable to the invocation that initialized it, when that
    /// declaration sits in `block`.
    fn declared_invocation(&self, symbol: SymbolId, block: NodeId) -> Option<InvocationView> {
        self.tree.symbol(symbol).usages.iter().find_map(|usage| {
            let UsageKind::Declaration { value: Some(value) } = usage.kind else {
                return None;
            };
            if !matches!(self.tree.kind(value), NodeKind::Invocation { .. }) {
                return None;
            }
            let declaration = self.declaration_of(value, block)?;
            Some(InvocationView {
                call: value,
                declaration: Some(declaration),
                block,
            })
        })
    }

    fn uses_symbol(&self, call: NodeId, symbol: SymbolId) -> bool {
        let NodeKind::Invocation { callee, arguments } = self.tree.kind(call) else {
            return false;
        };
        let bound = |node: NodeId| self.tree.identifier_symbol(node) == Some(symbol);

        let receiver = match self.tree.kind(*callee) {
            NodeKind::MemberSelect { expression, .. } => bound(*expression),
            _ => false,
        };
        receiver || arguments.iter().any(|&argument| bound(argument))
    }
}

#[cfg(test)]
mod tests {
    use cryptoscope_rules::SizeUnit;

    use super::*;
    use crate::go;
    use crate::language::{GoLanguage, LanguageTranslation, Unsupported};
    use crate::test_utils::detect;

    fn rendered(source: &str) -> String {
        let (tree, rules, store) = detect(source);
        store.render(&tree, &rules).trim_end().to_string()
    }

    /// Go translation whose outer scope always supplies a 24-byte key.
    struct OuterKey {
        inside_function: bool,
    }

    impl LanguageSupport for OuterKey {
        fn name(&self) -> &'static str {
            "go"
        }

        fn translation(&self) -> &dyn LanguageTranslation {
            &GoLanguage
        }

        fn enclosing_method(&self, _tree: &Tree, node: NodeId) -> Result<Option<NodeId>, Unsupported> {
            Ok(self.inside_function.then_some(node))
        }

        fn resolve_in_outer_scope(
            &self,
            _tree: &Tree,
            expression: NodeId,
            kind: ValueKind,
        ) -> Result<Vec<ResolvedValue>, Unsupported> {
            assert_eq!(kind, ValueKind::KeySize(SizeUnit::Byte));
            Ok(vec![ResolvedValue {
                value: Value::Integer(24),
                node: expression,
            }])
        }
    }

    fn rendered_with(source: &str, support: &dyn LanguageSupport) -> String {
        let tree = go::parse(source).unwrap();
        let rules = RuleSet::builtin().unwrap();
        let mut store = DetectionStore::new();
        DetectionEngine::new(&tree, &rules, support).run(&mut store);
        store.render(&tree, &rules).trim_end().to_string()
    }

    const PARAMETER_KEY: &str = r#"package main

import "crypto/aes"

func encrypt(key []byte) {
    aes.NewCipher(key)
}
"#;

    #[test]
    fn unresolved_argument_asks_the_outer_scope() {
        let rendered = rendered_with(PARAMETER_KEY, &OuterKey { inside_function: true });
        assert_eq!(rendered, "aes/new-cipher @6:5 [AES, key-size:bytes=24]");
    }

    #[test]
    fn outer_scope_is_skipped_without_an_enclosing_function() {
        let rendered = rendered_with(PARAMETER_KEY, &OuterKey { inside_function: false });
        assert_eq!(rendered, "aes/new-cipher @6:5 [AES]");
    }

    #[test]
    fn go_binding_leaves_parameters_unresolved() {
        assert_eq!(rendered(PARAMETER_KEY), "aes/new-cipher @6:5 [AES]");
    }

    #[test]
    fn aes_key_size_resolves_through_make() {
        insta::assert_snapshot!(rendered(r#"package main

import "crypto/aes"

func encrypt() {
    key := make([]byte, 32)
    block, err := aes.NewCipher(key)
    _, _ = block, err
}
"#), @"aes/new-cipher @7:19 [AES, key-size:bytes=32]");
    }

    #[test]
    fn mode_chains_through_traced_block() {
        insta::assert_snapshot!(rendered(r#"package main

import (
    "crypto/aes"
    "crypto/cipher"
)

func seal(key []byte) {
    block, err := aes.NewCipher(key)
    if err != nil {
        return
    }
    gcm, _ := cipher.NewGCM(block)
    _ = gcm
}
"#), @r"
aes/new-cipher @9:19 [AES]
  cipher/new-gcm @13:15 [GCM]
");
    }

    #[test]
    fn hash_reference_is_a_dependent_of_hmac() {
        insta::assert_snapshot!(rendered(r#"package main

import (
    "crypto/hmac"
    "crypto/sha256"
)

func sign(key []byte) {
    mac := hmac.New(sha256.New, key)
    _ = mac
}
"#), @r"
hash/sha256 @9:21 [SHA-256]
hmac/new @9:12 [HMAC]
  hash/sha256 @9:21 [SHA-256]
");
    }

    #[test]
    fn curve_argument_chains_into_elliptic_rules() {
        insta::assert_snapshot!(rendered(r#"package main

import (
    "crypto/ecdsa"
    "crypto/elliptic"
    "crypto/rand"
)

func keygen() {
    priv, err := ecdsa.GenerateKey(elliptic.P256(), rand.Reader)
    _, _ = priv, err
}
"#), @r"
ecdsa/generate-key @10:18 [ECDSA]
  elliptic/p256 @10:36 [P-256]
");
    }

    #[test]
    fn curve_variable_is_followed_to_its_declaration() {
        let (tree, rules, store) = detect(
            r#"package main

import (
    "crypto/ecdsa"
    "crypto/elliptic"
    "crypto/rand"
)

func keygen() {
    curve := elliptic.P384()
    priv, _ := ecdsa.GenerateKey(curve, rand.Reader)
    _ = priv
}
"#,
        );
        let generate = store
            .roots()
            .iter()
            .copied()
            .find(|&id| rules.get(store.get(id).rule).id == "ecdsa/generate-key")
            .unwrap();
        let child = store.get(generate).children[0];
        assert_eq!(rules.get(store.get(child).rule).id, "elliptic/p384");
        assert_eq!(tree.span(store.get(child).node).line, 10);
    }

    #[test]
    fn tls_constants_match_as_references() {
        insta::assert_snapshot!(rendered(r#"package main

import "crypto/tls"

var config = &tls.Config{
    MinVersion:   tls.VersionTLS12,
    CipherSuites: []uint16{tls.TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256},
}
"#), @r"
tls/version-tls12 @6:19 [TLSv1.2]
tls/cipher-suite @7:28 [TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256]
");
    }

    #[test]
    fn rsa_bits_are_captured() {
        insta::assert_snapshot!(rendered(r#"package main

import (
    "crypto/rand"
    "crypto/rsa"
)

const bits = 3072

func keygen() {
    key, _ := rsa.GenerateKey(rand.Reader, bits)
    _ = key
}
"#), @"rsa/generate-key @11:15 [RSA, key-size:bits=3072]");
    }

    #[test]
    fn unrelated_calls_produce_nothing() {
        let (_, _, store) = detect("package main\n\nfunc main() {\n    x := make([]byte, 32)\n    println(x)\n}\n");
        assert!(store.is_empty());
    }

    #[test]
    fn mode_without_traced_variable_is_not_attached() {
        let (_, rules, store) = detect(
            r#"package main

import (
    "crypto/aes"
    "crypto/cipher"
)

func seal(key []byte, other cipher.Block) {
    block, _ := aes.NewCipher(key)
    _ = block
    gcm, _ := cipher.NewGCM(other)
    _ = gcm
}
"#,
        );
        assert_eq!(store.roots().len(), 1);
        assert!(store.get(store.roots()[0]).children.is_empty());
        assert!(rules.find("cipher/new-gcm").is_some());
    }

    #[test]
    fn chaining_stays_within_the_block() {
        let (_, _, store) = detect(
            r#"package main

import (
    "crypto/aes"
    "crypto/cipher"
)

func seal(key []byte) {
    block, _ := aes.NewCipher(key)
    func() {
        gcm, _ := cipher.NewGCM(block)
        _ = gcm
    }()
}
"#,
        );
        assert_eq!(store.len(), 1);
    }
}
