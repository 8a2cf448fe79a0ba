//! `crypto/dsa` parameters, keys and signatures.

use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, ValueDef, declare_bundle};

const TARGETS: &[&str] = &["crypto/dsa"];
const DSA: &[(&str, &str)] = &[("kind", "DSA")];

static GENERATE_PARAMETERS: RuleDef = rule! {
    id: "dsa/generate-parameters",
    targets: TARGETS,
    methods: &["GenerateParameters"],
    value: ValueDef::Constant("DSA"),
    parameters: &[
        ParamDef::plain("*dsa.Parameters"),
        ParamDef::plain("io.Reader"),
        ParamDef::plain("dsa.ParameterSizes"),
    ],
    context: ContextKind::Key,
    metadata: DSA,
};

static GENERATE_KEY: RuleDef = rule! {
    id: "dsa/generate-key",
    targets: TARGETS,
    methods: &["GenerateKey"],
    value: ValueDef::Constant("DSA"),
    parameters: &[ParamDef::plain("*"), ParamDef::plain("*")],
    context: ContextKind::Key,
    metadata: DSA,
};

static SIGN: RuleDef = rule! {
    id: "dsa/sign",
    targets: TARGETS,
    methods: &["Sign"],
    value: ValueDef::Constant("DSA"),
    parameters: &[ParamDef::plain("*"), ParamDef::plain("*"), ParamDef::plain("*")],
    context: ContextKind::Signature,
    metadata: DSA,
};

static VERIFY: RuleDef = rule! {
    id: "dsa/verify",
    targets: TARGETS,
    methods: &["Verify"],
    value: ValueDef::Constant("DSA"),
    parameters: &[
        ParamDef::plain("*"),
        ParamDef::plain("*"),
        ParamDef::plain("*"),
        ParamDef::plain("*"),
    ],
    context: ContextKind::Signature,
    metadata: DSA,
};

declare_bundle!(
    DsaBundle,
    id: "dsa",
    name: "crypto/dsa",
    rules: [&GENERATE_PARAMETERS, &GENERATE_KEY, &SIGN, &VERIFY],
);
