//! Lowering from the tree-sitter concrete syntax tree.

use std::collections::HashMap;

use tree_sitter::Node as TsNode;

use crate::tree::{LiteralKind, NodeId, NodeKind, Span, SymbolId, Tree, TreeBuilder, UsageKind};

/// Predeclared types whose call syntax is a conversion.
const BUILTIN_TYPES: &[&str] = &[
    "bool", "byte", "complex64", "complex128", "float32", "float64", "int", "int8", "int16", "int32", "int64",
    "rune", "string", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
];

/// Syntax nesting lowered before deeper subtrees collapse to an empty
/// [`NodeKind::Opaque`]. Keeps lowering within a worker thread's stack.
pub(crate) const MAX_NESTING: usize = 160;

pub(super) fn lower(parsed: &tree_sitter::Tree, source: &str) -> Tree {
    let root = parsed.root_node();
    let mut lowerer = Lowerer {
        source,
        builder: TreeBuilder::default(),
        imports: HashMap::new(),
        scopes: Vec::new(),
        inferred: HashMap::new(),
        nesting: 0,
    };

    if root.has_error() {
        lowerer.builder.mark_errors();
    }

    lowerer.source_file(root);
    lowerer.builder.finish()
}

struct Lowerer<'s> {
    source: &'s str,
    builder: TreeBuilder,
    /// Import alias → package path.
    imports: HashMap<String, String>,
    scopes: Vec<HashMap<String, SymbolId>>,
    /// Types inferred from initializer shape (`make`, conversions, composite literals).
    inferred: HashMap<NodeId, String>,
    nesting: usize,
}

impl<'s> Lowerer<'s> {
    fn source_file(&mut self, root: TsNode<'_>) {
        self.scopes.push(HashMap::new());
        let children = named_children(root);

        for child in &children {
            if child.kind() == "import_declaration" {
                self.imports(*child);
            }
        }

        // Package-level names are visible in every function body regardless
        // of declaration order, so they are bound before any body is lowered.
        let mut top = Vec::new();
        for child in &children {
            if matches!(child.kind(), "var_declaration" | "const_declaration") {
                self.declarations(*child, &mut top);
            }
        }
        for child in &children {
            if matches!(child.kind(), "function_declaration" | "method_declaration") {
                top.push(self.function(*child));
            }
        }

        self.push(NodeKind::Opaque { children: top }, root);
        self.scopes.pop();
    }

    fn imports(&mut self, node: TsNode<'_>) {
        for child in named_children(node) {
            match child.kind() {
                "import_spec_list" => self.imports(child),
                "import_spec" => {
                    let Some(path_node) = child.child_by_field_name("path") else {
                        continue;
                    };
                    let path = strip_quotes(self.text(path_node)).to_string();
                    let alias = match child.child_by_field_name("name") {
                        Some(name) if matches!(name.kind(), "dot" | "blank_identifier") => continue,
                        Some(name) => self.text(name).to_string(),
                        None => default_package_name(&path).to_string(),
                    };
                    self.imports.insert(alias, path);
                }
                _ => {}
            }
        }
    }

    fn function(&mut self, node: TsNode<'_>) -> NodeId {
        self.scopes.push(HashMap::new());
        let mut children = Vec::new();

        for field in ["receiver", "parameters", "result"] {
            if let Some(list) = node.child_by_field_name(field)
                && list.kind() == "parameter_list"
            {
                self.parameters(list, &mut children);
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            children.push(self.block(body));
        }

        self.scopes.pop();
        self.push(NodeKind::Opaque { children }, node)
    }

    fn parameters(&mut self, list: TsNode<'_>, out: &mut Vec<NodeId>) {
        for decl in named_children(list) {
            let variadic = match decl.kind() {
                "parameter_declaration" => false,
                "variadic_parameter_declaration" => true,
                _ => continue,
            };
            let type_name = decl.child_by_field_name("type").map(|t| {
                let text = self.text(t);
                if variadic { format!("...{text}") } else { text.to_string() }
            });

            for name_node in children_by_field(decl, "name") {
                let name = self.text(name_node);
                let identifier = if name == "_" {
                    self.push(plain_identifier(name), name_node)
                } else {
                    let symbol = self.builder.add_symbol(name, type_name.clone());
                    let id = self.push(
                        NodeKind::Identifier {
                            name: name.to_string(),
                            symbol: Some(symbol),
                            package: None,
                            type_name: type_name.clone(),
                        },
                        name_node,
                    );
                    self.builder.add_usage(symbol, id, UsageKind::Parameter);
                    self.declare(name, symbol);
                    id
                };
                out.push(self.push(
                    NodeKind::Parameter {
                        identifier,
                        type_name: type_name.clone(),
                    },
                    decl,
                ));
            }
        }
    }

    fn block(&mut self, node: TsNode<'_>) -> NodeId {
        self.scopes.push(HashMap::new());
        let mut statements = Vec::new();
        self.statement_list(node, &mut statements);
        self.scopes.pop();

        let id = self.push(NodeKind::Block { statements }, node);
        self.builder.register_block(id);
        id
    }

    fn statement_list(&mut self, node: TsNode<'_>, out: &mut Vec<NodeId>) {
        for child in named_children(node) {
            if child.kind() == "statement_list" {
                self.statement_list(child, out);
            } else {
                self.statement(child, out);
            }
        }
    }

    fn statement(&mut self, node: TsNode<'_>, out: &mut Vec<NodeId>) {
        if self.nesting >= MAX_NESTING {
            out.push(self.push(NodeKind::Opaque { children: Vec::new() }, node));
            return;
        }
        self.nesting += 1;
        self.nested_statement(node, out);
        self.nesting -= 1;
    }

    fn nested_statement(&mut self, node: TsNode<'_>, out: &mut Vec<NodeId>) {
        match node.kind() {
            "short_var_declaration" => {
                let left = field_children(node, "left");
                let right = field_children(node, "right");
                out.push(self.declaration(node, &left, None, &right, true));
            }
            "var_declaration" | "const_declaration" => self.declarations(node, out),
            "assignment_statement" => out.push(self.assignment(node)),
            "expression_statement" | "go_statement" | "defer_statement" => {
                for child in named_children(node) {
                    out.extend(self.expression(child));
                }
            }
            "labeled_statement" => {
                for child in named_children(node) {
                    if child.kind() != "label_name" {
                        self.statement(child, out);
                    }
                }
            }
            "block" => out.push(self.block(node)),
            "if_statement"
            | "for_statement"
            | "expression_switch_statement"
            | "type_switch_statement"
            | "select_statement" => out.push(self.scoped(node)),
            "range_clause" => out.push(self.range_clause(node)),
            "empty_statement" => {}
            _ => out.extend(self.expression(node)),
        }
    }

    fn scoped(&mut self, node: TsNode<'_>) -> NodeId {
        self.scopes.push(HashMap::new());
        let mut children = Vec::new();

        for child in named_children(node) {
            match child.kind() {
                "expression_case" | "default_case" | "type_case" | "communication_case" => {
                    children.push(self.case_clause(child));
                }
                _ => self.statement(child, &mut children),
            }
        }

        self.scopes.pop();
        self.push(NodeKind::Opaque { children }, node)
    }

    /// Each `case` body is an implicit block with its own scope.
    fn case_clause(&mut self, node: TsNode<'_>) -> NodeId {
        let header: Vec<usize> = ["value", "type", "communication"]
            .into_iter()
            .flat_map(|field| children_by_field(node, field))
            .map(|n| n.id())
            .collect();

        self.scopes.push(HashMap::new());
        let mut children = Vec::new();
        let mut statements = Vec::new();

        for child in named_children(node) {
            if header.contains(&child.id()) {
                self.statement(child, &mut children);
            } else if child.kind() == "statement_list" {
                self.statement_list(child, &mut statements);
            } else {
                self.statement(child, &mut statements);
            }
        }

        self.scopes.pop();
        let block = self.push(NodeKind::Block { statements }, node);
        self.builder.register_block(block);
        children.push(block);
        self.push(NodeKind::Opaque { children }, node)
    }

    fn range_clause(&mut self, node: TsNode<'_>) -> NodeId {
        let right = node.child_by_field_name("right").and_then(|r| self.expression(r));
        let declares = {
            let mut cursor = node.walk();
            node.children(&mut cursor).any(|c| c.kind() == ":=")
        };

        let mut children = Vec::new();
        for target in field_children(node, "left") {
            if declares && target.kind() == "identifier" {
                let name = self.text(target);
                children.push(self.bind(name, target, None, None, false));
            } else {
                children.extend(self.expression(target));
            }
        }
        children.extend(right);
        self.push(NodeKind::Opaque { children }, node)
    }

    fn declarations(&mut self, node: TsNode<'_>, out: &mut Vec<NodeId>) {
        for child in named_children(node) {
            match child.kind() {
                "var_spec" | "const_spec" => {
                    let names = children_by_field(child, "name");
                    let type_node = child.child_by_field_name("type");
                    let values = field_children(child, "value");
                    out.push(self.declaration(child, &names, type_node, &values, false));
                }
                "var_spec_list" | "const_spec_list" => self.declarations(child, out),
                _ => {}
            }
        }
    }

    fn declaration(
        &mut self,
        node: TsNode<'_>,
        names: &[TsNode<'_>],
        type_node: Option<TsNode<'_>>,
        values: &[TsNode<'_>],
        short: bool,
    ) -> NodeId {
        // Initializers are lowered before the names enter scope: in
        // `key := derive(key)` the right-hand `key` is the outer one.
        let initializers: Vec<NodeId> = values.iter().filter_map(|v| self.expression(*v)).collect();
        let declared_type = type_node.map(|t| self.text(t).to_string());
        let single_call = initializers.len() == 1 && names.len() > 1;

        let mut identifiers = Vec::with_capacity(names.len());
        for (i, name_node) in names.iter().enumerate() {
            let name = self.text(*name_node);
            let value = if initializers.len() == names.len() {
                initializers.get(i).copied()
            } else if single_call {
                initializers.first().copied()
            } else {
                None
            };

            let type_name = if declared_type.is_some() {
                declared_type.clone()
            } else if single_call && i + 1 == names.len() && name == "err" {
                Some("error".to_string())
            } else if single_call {
                None
            } else {
                value.and_then(|v| self.inferred.get(&v).cloned())
            };

            identifiers.push(self.bind(name, *name_node, value, type_name, short));
        }

        self.push(
            NodeKind::VariableDeclaration {
                identifiers,
                initializers,
            },
            node,
        )
    }

    /// Binds a declared name, or re-assigns it when `:=` redeclares a name
    /// already in the innermost scope.
    fn bind(
        &mut self,
        name: &str,
        node: TsNode<'_>,
        value: Option<NodeId>,
        type_name: Option<String>,
        short: bool,
    ) -> NodeId {
        if name == "_" {
            return self.push(plain_identifier(name), node);
        }

        let redeclared = if short {
            self.scopes.last().and_then(|scope| scope.get(name)).copied()
        } else {
            None
        };

        if let Some(symbol) = redeclared {
            if let Some(new_type) = type_name
                && self.builder.symbol_type(symbol).is_none()
            {
                self.builder.set_symbol_type(symbol, new_type);
            }
            let id = self.bound_identifier(name, symbol, node);
            let kind = value.map_or(UsageKind::Reference, |value| UsageKind::Assignment { value });
            self.builder.add_usage(symbol, id, kind);
            return id;
        }

        let symbol = self.builder.add_symbol(name, type_name);
        let id = self.bound_identifier(name, symbol, node);
        self.builder.add_usage(symbol, id, UsageKind::Declaration { value });
        self.declare(name, symbol);
        id
    }

    fn assignment(&mut self, node: TsNode<'_>) -> NodeId {
        let left = field_children(node, "left");
        let right = field_children(node, "right");
        let plain = node.child_by_field_name("operator").is_some_and(|op| self.text(op) == "=");

        let values: Vec<NodeId> = right.iter().filter_map(|v| self.expression(*v)).collect();
        let mut children = Vec::new();

        for (i, target) in left.iter().enumerate() {
            let value = if values.len() == left.len() {
                values.get(i).copied()
            } else if values.len() == 1 {
                values.first().copied()
            } else {
                None
            };

            let lowered = match value {
                Some(value) if plain && target.kind() == "identifier" => self.assign(*target, value),
                _ => self.expression(*target),
            };
            children.extend(lowered);
        }

        children.extend(values);
        self.push(NodeKind::Opaque { children }, node)
    }

    fn assign(&mut self, target: TsNode<'_>, value: NodeId) -> Option<NodeId> {
        let name = self.text(target);
        let Some(symbol) = self.lookup(name) else {
            return self.expression(target);
        };

        if let Some(new_type) = self.inferred.get(&value).cloned()
            && self.builder.symbol_type(symbol).is_none()
        {
            self.builder.set_symbol_type(symbol, new_type);
        }

        let id = self.bound_identifier(name, symbol, target);
        self.builder.add_usage(symbol, id, UsageKind::Assignment { value });
        Some(id)
    }

    fn expression(&mut self, node: TsNode<'_>) -> Option<NodeId> {
        if self.nesting >= MAX_NESTING {
            return Some(self.push(NodeKind::Opaque { children: Vec::new() }, node));
        }
        self.nesting += 1;
        let id = self.nested_expression(node);
        self.nesting -= 1;
        id
    }

    fn nested_expression(&mut self, node: TsNode<'_>) -> Option<NodeId> {
        let id = match node.kind() {
            "comment" => return None,
            "parenthesized_expression" => {
                return named_children(node).first().and_then(|inner| self.expression(*inner));
            }
            "identifier" => self.identifier(node),
            "call_expression" => self.call(node),
            "selector_expression" => self.selector(node, false),
            "type_conversion_expression" => self.conversion(node),
            "func_literal" => self.function(node),
            "int_literal" => self.literal(node, LiteralKind::Int),
            "float_literal" | "imaginary_literal" => self.literal(node, LiteralKind::Float),
            "interpreted_string_literal" => self.literal(node, LiteralKind::String),
            "raw_string_literal" => self.literal(node, LiteralKind::RawString),
            "rune_literal" => self.literal(node, LiteralKind::Rune),
            "true" | "false" | "nil" | "iota" => self.literal(node, LiteralKind::Keyword),
            "composite_literal" => {
                let id = self.opaque(node);
                if let Some(type_node) = node.child_by_field_name("type") {
                    let type_name = self.text(type_node).to_string();
                    self.inferred.insert(id, type_name);
                }
                id
            }
            "unary_expression" => {
                let id = self.opaque(node);
                let pointee = node
                    .child_by_field_name("operand")
                    .filter(|operand| operand.kind() == "composite_literal")
                    .and_then(|operand| operand.child_by_field_name("type"));
                let is_address = node.child_by_field_name("operator").is_some_and(|op| self.text(op) == "&");
                if is_address && let Some(type_node) = pointee {
                    let type_name = format!("*{}", self.text(type_node));
                    self.inferred.insert(id, type_name);
                }
                id
            }
            _ => self.opaque(node),
        };
        Some(id)
    }

    fn opaque(&mut self, node: TsNode<'_>) -> NodeId {
        let mut children = Vec::new();
        for child in named_children(node) {
            self.statement(child, &mut children);
        }
        self.push(NodeKind::Opaque { children }, node)
    }

    fn identifier(&mut self, node: TsNode<'_>) -> NodeId {
        let name = self.text(node);
        if name != "_"
            && let Some(symbol) = self.lookup(name)
        {
            let id = self.bound_identifier(name, symbol, node);
            self.builder.add_usage(symbol, id, UsageKind::Reference);
            return id;
        }

        self.push(
            NodeKind::Identifier {
                name: name.to_string(),
                symbol: None,
                package: self.imports.get(name).cloned(),
                type_name: None,
            },
            node,
        )
    }

    fn call(&mut self, node: TsNode<'_>) -> NodeId {
        let callee = match node.child_by_field_name("function") {
            Some(function) if function.kind() == "selector_expression" => self.selector(function, true),
            Some(function) => self
                .expression(function)
                .unwrap_or_else(|| self.push(NodeKind::Opaque { children: Vec::new() }, function)),
            None => self.push(NodeKind::Opaque { children: Vec::new() }, node),
        };

        let argument_nodes = field_children(node, "arguments");
        let first_argument_text = argument_nodes.first().map(|a| self.text(*a));
        let arguments: Vec<NodeId> = argument_nodes.iter().filter_map(|a| self.expression(*a)).collect();

        let inferred = match self.builder.kind(callee) {
            NodeKind::Identifier {
                name, symbol: None, ..
            } => match name.as_str() {
                "make" => first_argument_text.map(str::to_string),
                "new" => first_argument_text.map(|t| format!("*{t}")),
                builtin if BUILTIN_TYPES.contains(&builtin) => Some(builtin.to_string()),
                _ => None,
            },
            _ => None,
        };

        let id = self.push(NodeKind::Invocation { callee, arguments }, node);
        if let Some(type_name) = inferred {
            self.inferred.insert(id, type_name);
        }
        id
    }

    /// `T(x)` for a composite type `T`. The callee is opaque so the
    /// conversion only ever resolves through its operand.
    fn conversion(&mut self, node: TsNode<'_>) -> NodeId {
        let type_node = node.child_by_field_name("type");
        let callee = self.push(NodeKind::Opaque { children: Vec::new() }, type_node.unwrap_or(node));
        let arguments: Vec<NodeId> = node
            .child_by_field_name("operand")
            .and_then(|operand| self.expression(operand))
            .into_iter()
            .collect();

        let id = self.push(NodeKind::Invocation { callee, arguments }, node);
        if let Some(type_node) = type_node {
            let type_name = self.text(type_node).to_string();
            self.inferred.insert(id, type_name);
        }
        id
    }

    fn selector(&mut self, node: TsNode<'_>, callee: bool) -> NodeId {
        let expression = node
            .child_by_field_name("operand")
            .and_then(|operand| self.expression(operand))
            .unwrap_or_else(|| self.push(NodeKind::Opaque { children: Vec::new() }, node));

        let field = node.child_by_field_name("field").unwrap_or(node);
        let member_name = self.text(field);
        let member = self.push(plain_identifier(member_name), field);

        let id = self.push(NodeKind::MemberSelect { expression, member }, node);
        if !callee {
            self.builder.register_reference(id);
        }
        id
    }

    fn literal(&mut self, node: TsNode<'_>, kind: LiteralKind) -> NodeId {
        let value = self.text(node).to_string();
        self.push(NodeKind::Literal { value, kind }, node)
    }

    fn bound_identifier(&mut self, name: &str, symbol: SymbolId, node: TsNode<'_>) -> NodeId {
        let type_name = self.builder.symbol_type(symbol).map(str::to_string);
        self.push(
            NodeKind::Identifier {
                name: name.to_string(),
                symbol: Some(symbol),
                package: None,
                type_name,
            },
            node,
        )
    }

    fn declare(&mut self, name: &str, symbol: SymbolId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), symbol);
        }
    }

    fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name)).copied()
    }

    fn push(&mut self, kind: NodeKind, node: TsNode<'_>) -> NodeId {
        let span = Span::from_position(
            self.source,
            node.start_position().row,
            node.start_position().column,
            node.start_byte(),
            node.end_byte(),
        );
        self.builder.push(kind, span)
    }

    fn text(&self, node: TsNode<'_>) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }
}

fn plain_identifier(name: &str) -> NodeKind {
    NodeKind::Identifier {
        name: name.to_string(),
        symbol: None,
        package: None,
        type_name: None,
    }
}

fn named_children<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).filter(|c| c.kind() != "comment").collect()
}

fn children_by_field<'t>(node: TsNode<'t>, field: &str) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// Named children of the node stored in `field`, typically an `expression_list`.
fn field_children<'t>(node: TsNode<'t>, field: &str) -> Vec<TsNode<'t>> {
    node.child_by_field_name(field).map(named_children).unwrap_or_default()
}

fn strip_quotes(literal: &str) -> &str {
    literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')))
        .unwrap_or(literal)
}

/// The name an unaliased import binds: the last path segment, skipping a
/// major-version suffix (`math/rand/v2` → `rand`).
fn default_package_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_version = last.len() > 1 && last.starts_with('v') && last[1..].bytes().all(|b| b.is_ascii_digit());
    if is_version { segments.next().unwrap_or(last) } else { last }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_package_name_uses_last_segment() {
        assert_eq!(default_package_name("crypto/aes"), "aes");
        assert_eq!(default_package_name("golang.org/x/crypto/hkdf"), "hkdf");
        assert_eq!(default_package_name("fmt"), "fmt");
    }

    #[test]
    fn default_package_name_skips_major_version() {
        assert_eq!(default_package_name("math/rand/v2"), "rand");
        assert_eq!(default_package_name("example.com/v"), "v");
    }

    #[test]
    fn strip_quotes_handles_both_string_forms() {
        assert_eq!(strip_quotes("\"crypto/aes\""), "crypto/aes");
        assert_eq!(strip_quotes("`crypto/aes`"), "crypto/aes");
        assert_eq!(strip_quotes("bare"), "bare");
    }
}
