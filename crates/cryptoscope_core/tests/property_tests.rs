//! Property-based tests for `cryptoscope_core`.
//!
//! These tests verify resolver and matcher invariants over generated Go
//! snippets, catching shapes that hand-written cases might miss.

#![expect(clippy::expect_used, reason = "tests use expect for fixture setup")]

use cryptoscope_core::go;
use cryptoscope_core::matcher::types_equivalent;
use cryptoscope_core::resolver::parse_int;
use cryptoscope_core::{ExpectedType, GoLanguage, MAX_DEPTH, NodeKind, Resolver, Value};
use proptest::prelude::*;

/// Resolves the first argument of the last call statement in the function
/// body, which is registered after any block nested inside it.
fn resolve_last_argument(source: &str, expected: ExpectedType) -> Vec<Value> {
    let tree = go::parse(source).expect("fixture parses");
    let block = *tree.blocks().last().expect("fixture has a function body");
    let call = tree
        .statements(block)
        .iter()
        .rev()
        .copied()
        .find(|&statement| matches!(tree.kind(statement), NodeKind::Invocation { .. }))
        .expect("fixture ends with a call");
    let argument = tree.arguments(call).expect("call has arguments")[0];
    Resolver::new(&tree, &GoLanguage)
        .resolve(expected, argument)
        .into_iter()
        .map(|resolved| resolved.value)
        .collect()
}

fn function(body: &str) -> String {
    format!("package main\n\nfunc f() {{\n{body}}}\n")
}

proptest! {
    /// Decimal, hex, octal and binary spellings of a number all parse back.
    #[test]
    fn integer_literals_round_trip(n in 0i64..i64::MAX) {
        prop_assert_eq!(parse_int(&n.to_string()), Some(n));
        prop_assert_eq!(parse_int(&format!("{n:#x}")), Some(n));
        prop_assert_eq!(parse_int(&format!("{n:#o}")), Some(n));
        prop_assert_eq!(parse_int(&format!("{n:#b}")), Some(n));
    }

    /// A variable defined once resolves to exactly its literal.
    #[test]
    fn single_definition_resolves_to_its_literal(name in "k_[a-z0-9]{0,8}", n in 0i64..1_000_000) {
        let source = function(&format!("    {name} := {n}\n    use({name})\n"));
        prop_assert_eq!(resolve_last_argument(&source, ExpectedType::Integer), vec![Value::Integer(n)]);
    }

    /// Every reassignment contributes one candidate, most recent first.
    #[test]
    fn reassignments_fan_out_most_recent_first(base in 0i64..10_000, count in 1i64..8) {
        let values: Vec<i64> = (0..count).map(|i| base + i).collect();
        let mut body = format!("    size := {}\n", values[0]);
        for value in &values[1..] {
            body.push_str(&format!("    size = {value}\n"));
        }
        body.push_str("    use(size)\n");

        let resolved = resolve_last_argument(&function(&body), ExpectedType::Integer);
        let expected: Vec<Value> = values.iter().rev().map(|&v| Value::Integer(v)).collect();
        prop_assert_eq!(resolved, expected);
    }

    /// Copying a variable through a chain of reassigned variables keeps only
    /// the distinct source values, however long the chain.
    #[test]
    fn chained_reassignments_resolve_to_source_values(links in 1usize..40, copies in 1usize..5) {
        let mut body = String::from("    x0 := 16\n    x0 = 24\n");
        for i in 1..=links {
            let previous = i - 1;
            body.push_str(&format!("    x{i} := x{previous}\n"));
            for _ in 0..copies {
                body.push_str(&format!("    x{i} = x{previous}\n"));
            }
        }
        body.push_str(&format!("    use(x{links})\n"));

        let resolved = resolve_last_argument(&function(&body), ExpectedType::Integer);
        prop_assert_eq!(resolved, vec![Value::Integer(24), Value::Integer(16)]);
    }

    /// Assignments in either branch of an `if` are all candidates.
    #[test]
    fn branch_assignments_are_candidates(a in 0i64..1_000, b in 1_000i64..2_000, c in 2_000i64..3_000) {
        let body = format!(
            "    size := {a}\n    if ok {{\n        size = {b}\n    }} else {{\n        size = {c}\n    }}\n    use(size)\n"
        );
        let resolved = resolve_last_argument(&function(&body), ExpectedType::Integer);
        prop_assert_eq!(resolved, vec![Value::Integer(c), Value::Integer(b), Value::Integer(a)]);
    }

    /// Resolution is a pure function of the tree.
    #[test]
    fn resolution_is_idempotent(n in 0i64..1_000, wrappers in 0usize..4) {
        let argument = format!("{}{n}{}", "w(".repeat(wrappers), ")".repeat(wrappers));
        let source = function(&format!("    x := {argument}\n    use(x)\n"));
        let first = resolve_last_argument(&source, ExpectedType::Integer);
        let second = resolve_last_argument(&source, ExpectedType::Integer);
        prop_assert_eq!(first, second);
    }

    /// Single-argument wrappers are transparent up to the depth ceiling.
    #[test]
    fn wrappers_resolve_within_depth(n in 0i64..1_000, wrappers in 0usize..=MAX_DEPTH) {
        let source = function(&format!("    use({}{n}{})\n", "w(".repeat(wrappers), ")".repeat(wrappers)));
        prop_assert_eq!(resolve_last_argument(&source, ExpectedType::Integer), vec![Value::Integer(n)]);
    }

    /// Beyond the ceiling nothing resolves.
    #[test]
    fn wrappers_beyond_depth_resolve_nothing(n in 0i64..1_000, extra in 1usize..5) {
        let wrappers = MAX_DEPTH + extra;
        let source = function(&format!("    use({}{n}{})\n", "w(".repeat(wrappers), ")".repeat(wrappers)));
        prop_assert!(resolve_last_argument(&source, ExpectedType::Integer).is_empty());
    }

    /// A package path is equivalent to its last segment, in either order.
    #[test]
    fn package_path_matches_last_segment(prefix in "[a-z]{1,8}(/[a-z]{1,8}){0,2}", name in "[a-z]{1,8}") {
        let path = format!("{prefix}/{name}");
        prop_assert!(types_equivalent(&path, &name));
        prop_assert!(types_equivalent(&name, &path));
        prop_assert!(types_equivalent(&path, &path));
    }

    /// Distinct bare names are never equivalent.
    #[test]
    fn distinct_names_are_not_equivalent(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
        prop_assume!(a != b);
        prop_assert!(!types_equivalent(&a, &b));
    }
}
