//! `crypto/elliptic` named curves.

use crate::rule;
use crate::{ContextKind, RuleDef, ValueDef, declare_bundle};

const TARGETS: &[&str] = &["crypto/elliptic"];
const EC: &[(&str, &str)] = &[("kind", "EC")];

static P224: RuleDef = rule! {
    id: "elliptic/p224",
    targets: TARGETS,
    methods: &["P224"],
    value: ValueDef::Constant("P-224"),
    parameters: &[],
    context: ContextKind::Key,
    metadata: EC,
};

static P256: RuleDef = rule! {
    id: "elliptic/p256",
    targets: TARGETS,
    methods: &["P256"],
    value: ValueDef::Constant("P-256"),
    parameters: &[],
    context: ContextKind::Key,
    metadata: EC,
};

static P384: RuleDef = rule! {
    id: "elliptic/p384",
    targets: TARGETS,
    methods: &["P384"],
    value: ValueDef::Constant("P-384"),
    parameters: &[],
    context: ContextKind::Key,
    metadata: EC,
};

static P521: RuleDef = rule! {
    id: "elliptic/p521",
    targets: TARGETS,
    methods: &["P521"],
    value: ValueDef::Constant("P-521"),
    parameters: &[],
    context: ContextKind::Key,
    metadata: EC,
};

/// All named curve constructors.
pub(crate) static CURVES: &[&RuleDef] = &[&P224, &P256, &P384, &P521];

declare_bundle!(
    EllipticBundle,
    id: "elliptic",
    name: "crypto/elliptic",
    rules: [&P224, &P256, &P384, &P521],
);
