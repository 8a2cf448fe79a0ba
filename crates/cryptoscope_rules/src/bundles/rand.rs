//! `crypto/rand` secure random generation.

use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, ValueDef, declare_bundle};

const TARGETS: &[&str] = &["crypto/rand"];

static READ: RuleDef = rule! {
    id: "rand/read",
    targets: TARGETS,
    methods: &["Read"],
    value: ValueDef::Constant("CSPRNG"),
    parameters: &[ParamDef::plain("[]byte")],
    context: ContextKind::Prng,
};

static INT: RuleDef = rule! {
    id: "rand/int",
    targets: TARGETS,
    methods: &["Int", "Prime", "Text"],
    value: ValueDef::Constant("CSPRNG"),
    parameters: &[],
    context: ContextKind::Prng,
};

declare_bundle!(
    RandBundle,
    id: "rand",
    name: "crypto/rand",
    rules: [&READ, &INT],
);
