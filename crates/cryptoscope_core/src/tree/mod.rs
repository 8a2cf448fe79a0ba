//! The closed syntax tree the detection engine walks.
//!
//! A [`Tree`] is an index-addressed arena of [`Node`]s plus the symbol table
//! recorded while the tree was built. Nodes refer to each other by
//! [`NodeId`]; nothing in the tree is mutated after construction, so the
//! engine and resolver only ever borrow it.
//!
//! The node kinds are deliberately few. Everything the engine cannot reason
//! about is lowered to [`NodeKind::Opaque`], which keeps its children
//! reachable but never resolves to a value.

mod span;

pub use span::Span;

/// Index of a node within its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[cfg(test)]
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the arena index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a symbol within its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

/// Lexical category of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    /// Integer literal in any base (`32`, `0x20`, `0o40`, `0b100000`).
    Int,
    /// Floating-point or imaginary literal.
    Float,
    /// Interpreted string literal, quotes included.
    String,
    /// Raw string literal, backticks included.
    RawString,
    /// Rune literal, quotes included.
    Rune,
    /// `true`, `false`, `nil` or `iota`.
    Keyword,
}

/// The shape of a syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A call: `callee(arguments...)`.
    Invocation {
        /// The called expression (identifier or member select).
        callee: NodeId,
        /// Argument expressions in positional order.
        arguments: Vec<NodeId>,
    },
    /// A qualified reference: `expression.member`.
    MemberSelect {
        /// The qualifier (package alias, receiver, or nested selection).
        expression: NodeId,
        /// The selected member, always an [`NodeKind::Identifier`].
        member: NodeId,
    },
    /// A bare name.
    Identifier {
        /// The identifier text.
        name: String,
        /// The variable this name is bound to, when one is in scope.
        symbol: Option<SymbolId>,
        /// Import path when the name is an import alias (`aes` → `crypto/aes`).
        package: Option<String>,
        /// Declared or inferred type of the bound variable.
        type_name: Option<String>,
    },
    /// A literal value, in its source spelling.
    Literal {
        /// The literal text exactly as written.
        value: String,
        /// Lexical category of the literal.
        kind: LiteralKind,
    },
    /// A statement list with its own lexical scope.
    Block {
        /// Statements in source order.
        statements: Vec<NodeId>,
    },
    /// `x := e`, `var x T = e` or `const x = e`.
    VariableDeclaration {
        /// Declared identifiers, blank identifiers included.
        identifiers: Vec<NodeId>,
        /// Initializer expressions as written.
        initializers: Vec<NodeId>,
    },
    /// A function parameter.
    Parameter {
        /// The parameter's identifier.
        identifier: NodeId,
        /// The declared parameter type.
        type_name: Option<String>,
    },
    /// Any construct the engine does not model.
    Opaque {
        /// Lowered sub-expressions and statements.
        children: Vec<NodeId>,
    },
}

/// A syntax node and its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// What the node is.
    pub kind: NodeKind,
    /// Where the node appears in the source.
    pub span: Span,
}

/// How a symbol occurrence relates to the variable's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageKind {
    /// The variable is declared here, optionally with an initial value.
    Declaration {
        /// The initializer bound to this identifier, if any.
        value: Option<NodeId>,
    },
    /// The variable is assigned a new value.
    Assignment {
        /// The assigned expression.
        value: NodeId,
    },
    /// The variable is a function parameter.
    Parameter,
    /// The variable is read.
    Reference,
}

/// One occurrence of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// The identifier node at this occurrence.
    pub identifier: NodeId,
    /// The role of the occurrence.
    pub kind: UsageKind,
}

/// A variable together with every occurrence of it, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// The variable name.
    pub name: String,
    /// Declared or inferred type.
    pub type_name: Option<String>,
    /// Every occurrence of the variable in source order.
    pub usages: Vec<Usage>,
}

/// An immutable, index-addressed syntax tree for one source file.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    symbols: Vec<Symbol>,
    blocks: Vec<NodeId>,
    references: Vec<NodeId>,
    has_errors: bool,
}

impl Tree {
    /// Returns the node with the given id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns the kind of the node with the given id.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Returns the source span of the node with the given id.
    #[must_use]
    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    /// Returns the symbol with the given id.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    /// Every block in the file, including `case` clause bodies.
    #[must_use]
    pub fn blocks(&self) -> &[NodeId] {
        &self.blocks
    }

    /// Every member select that is not the callee of an invocation.
    ///
    /// These are function values and constants used by reference, such as
    /// `sha256.New` or `tls.VersionTLS12`.
    #[must_use]
    pub fn references(&self) -> &[NodeId] {
        &self.references
    }

    /// Returns `true` if the source contained syntax errors.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Returns the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree contains no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over every node id in creation order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "node counts in a single source file fit in u32"
    )]
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Returns the identifier name if the node is an identifier.
    #[must_use]
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns the bound symbol if the node is an identifier with one.
    #[must_use]
    pub fn identifier_symbol(&self, id: NodeId) -> Option<SymbolId> {
        match self.kind(id) {
            NodeKind::Identifier { symbol, .. } => *symbol,
            _ => None,
        }
    }

    /// Returns the statements of a block node, or an empty slice for any other kind.
    #[must_use]
    pub fn statements(&self, block: NodeId) -> &[NodeId] {
        match self.kind(block) {
            NodeKind::Block { statements } => statements,
            _ => &[],
        }
    }

    /// Returns the arguments of an invocation node, or `None` for any other kind.
    #[must_use]
    pub fn arguments(&self, call: NodeId) -> Option<&[NodeId]> {
        match self.kind(call) {
            NodeKind::Invocation { arguments, .. } => Some(arguments),
            _ => None,
        }
    }
}

/// Incrementally assembles a [`Tree`].
///
/// Child nodes are pushed before their parents, so every [`NodeId`] stored
/// inside a node already exists when the node is added.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    tree: Tree,
}

impl TreeBuilder {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "node counts in a single source file fit in u32"
    )]
    pub(crate) fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.tree.nodes.len() as u32);
        self.tree.nodes.push(Node { kind, span });
        id
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "symbol counts in a single source file fit in u32"
    )]
    pub(crate) fn add_symbol(&mut self, name: &str, type_name: Option<String>) -> SymbolId {
        let id = SymbolId(self.tree.symbols.len() as u32);
        self.tree.symbols.push(Symbol {
            name: name.to_string(),
            type_name,
            usages: Vec::new(),
        });
        id
    }

    pub(crate) fn add_usage(&mut self, symbol: SymbolId, identifier: NodeId, kind: UsageKind) {
        self.tree.symbols[symbol.0 as usize].usages.push(Usage { identifier, kind });
    }

    pub(crate) fn symbol_type(&self, symbol: SymbolId) -> Option<&str> {
        self.tree.symbols[symbol.0 as usize].type_name.as_deref()
    }

    pub(crate) fn set_symbol_type(&mut self, symbol: SymbolId, type_name: String) {
        self.tree.symbols[symbol.0 as usize].type_name = Some(type_name);
    }

    pub(crate) fn register_block(&mut self, block: NodeId) {
        self.tree.blocks.push(block);
    }

    pub(crate) fn register_reference(&mut self, select: NodeId) {
        self.tree.references.push(select);
    }

    pub(crate) fn mark_errors(&mut self) {
        self.tree.has_errors = true;
    }

    pub(crate) fn kind(&self, id: NodeId) -> &NodeKind {
        &self.tree.nodes[id.index()].kind
    }

    pub(crate) fn finish(self) -> Tree {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifier(name: &str) -> NodeKind {
        NodeKind::Identifier {
            name: name.to_string(),
            symbol: None,
            package: None,
            type_name: None,
        }
    }

    #[test]
    fn builder_assigns_sequential_ids() {
        let mut builder = TreeBuilder::default();
        let a = builder.push(identifier("a"), Span::default());
        let b = builder.push(identifier("b"), Span::default());
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(builder.finish().len(), 2);
    }

    #[test]
    fn accessors_discriminate_node_kinds() {
        let mut builder = TreeBuilder::default();
        let callee = builder.push(identifier("make"), Span::default());
        let size = builder.push(
            NodeKind::Literal {
                value: "32".into(),
                kind: LiteralKind::Int,
            },
            Span::default(),
        );
        let call = builder.push(
            NodeKind::Invocation {
                callee,
                arguments: vec![size],
            },
            Span::default(),
        );
        let block = builder.push(NodeKind::Block { statements: vec![call] }, Span::default());
        let tree = builder.finish();

        assert_eq!(tree.identifier_name(callee), Some("make"));
        assert_eq!(tree.identifier_name(size), None);
        assert_eq!(tree.arguments(call), Some(&[size][..]));
        assert_eq!(tree.arguments(block), None);
        assert_eq!(tree.statements(block), &[call]);
        assert!(tree.statements(call).is_empty());
    }

    #[test]
    fn usages_are_recorded_in_order() {
        let mut builder = TreeBuilder::default();
        let symbol = builder.add_symbol("key", None);
        let first = builder.push(identifier("key"), Span::default());
        let second = builder.push(identifier("key"), Span::default());
        builder.add_usage(symbol, first, UsageKind::Declaration { value: None });
        builder.add_usage(symbol, second, UsageKind::Reference);
        builder.set_symbol_type(symbol, "[]byte".into());
        let tree = builder.finish();

        let usages: Vec<_> = tree.symbol(symbol).usages.iter().map(|u| u.identifier).collect();
        assert_eq!(usages, [first, second]);
        assert_eq!(tree.symbol(symbol).type_name.as_deref(), Some("[]byte"));
    }
}
