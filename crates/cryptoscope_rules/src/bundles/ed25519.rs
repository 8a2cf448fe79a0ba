//! `crypto/ed25519` signatures.

use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, ValueDef, declare_bundle};

const TARGETS: &[&str] = &["crypto/ed25519"];
const ED25519: &[(&str, &str)] = &[("kind", "Ed25519")];

static GENERATE_KEY: RuleDef = rule! {
    id: "ed25519/generate-key",
    targets: TARGETS,
    methods: &["GenerateKey", "NewKeyFromSeed"],
    value: ValueDef::Constant("Ed25519"),
    parameters: &[ParamDef::plain("*")],
    context: ContextKind::Signature,
    metadata: ED25519,
};

static SIGN: RuleDef = rule! {
    id: "ed25519/sign",
    targets: TARGETS,
    methods: &["Sign"],
    value: ValueDef::Constant("Ed25519"),
    parameters: &[ParamDef::plain("ed25519.PrivateKey"), ParamDef::plain("[]byte")],
    context: ContextKind::Signature,
    metadata: ED25519,
};

static VERIFY: RuleDef = rule! {
    id: "ed25519/verify",
    targets: TARGETS,
    methods: &["Verify"],
    value: ValueDef::Constant("Ed25519"),
    parameters: &[
        ParamDef::plain("ed25519.PublicKey"),
        ParamDef::plain("[]byte"),
        ParamDef::plain("[]byte"),
    ],
    context: ContextKind::Signature,
    metadata: ED25519,
};

declare_bundle!(
    Ed25519Bundle,
    id: "ed25519",
    name: "crypto/ed25519",
    rules: [&GENERATE_KEY, &SIGN, &VERIFY],
);
