//! Test utilities for `cryptoscope_core` (compiled only during testing).

use std::path::Path;

use crate::engine::DetectionEngine;
use crate::finding::{Finding, FindingId};
use crate::go;
use crate::language::GoLanguage;
use crate::mapper::{Asset, AssetKind};
use crate::rule::RuleSet;
use crate::store::DetectionStore;
use crate::tree::{Span, Tree};

/// Parses `source` and runs the builtin rules over it.
pub fn detect(source: &str) -> (Tree, RuleSet, DetectionStore) {
    let tree = go::parse(source).unwrap();
    let rules = RuleSet::builtin().unwrap();
    let mut store = DetectionStore::new();
    DetectionEngine::new(&tree, &rules, &GoLanguage).run(&mut store);
    (tree, rules, store)
}

pub fn make_finding(rule_id: &str, kind: AssetKind, value: &str) -> Finding {
    let path = Path::new("main.go");
    let span = Span::new(3, 5, 20, 38);
    Finding {
        id: FindingId::new(rule_id, path, value),
        path: path.into(),
        span,
        rule_id: rule_id.into(),
        bundle: "test".into(),
        asset: Asset {
            kind,
            value: value.into(),
            span,
            children: Vec::new(),
        },
    }
}
