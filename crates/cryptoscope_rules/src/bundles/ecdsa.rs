//! `crypto/ecdsa` key generation, signing and verification.

use super::elliptic::CURVES;
use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, ValueDef, declare_bundle};

const TARGETS: &[&str] = &["crypto/ecdsa"];
const SIGNATURE: &[(&str, &str)] = &[("kind", "ECDSA")];

// ecdsa.GenerateKey(c elliptic.Curve, rand io.Reader) (*PrivateKey, error)
static GENERATE_KEY: RuleDef = rule! {
    id: "ecdsa/generate-key",
    targets: TARGETS,
    methods: &["GenerateKey"],
    value: ValueDef::Constant("ECDSA"),
    parameters: &[ParamDef::depends("elliptic.Curve", CURVES), ParamDef::plain("io.Reader")],
    context: ContextKind::Key,
    metadata: &[("kind", "EC")],
};

// ecdsa.Sign(rand io.Reader, priv *PrivateKey, hash []byte) (r, s *big.Int, err error)
static SIGN: RuleDef = rule! {
    id: "ecdsa/sign",
    targets: TARGETS,
    methods: &["Sign", "SignASN1"],
    value: ValueDef::Constant("ECDSA"),
    parameters: &[
        ParamDef::plain("io.Reader"),
        ParamDef::plain("*ecdsa.PrivateKey"),
        ParamDef::plain("[]byte"),
    ],
    context: ContextKind::Signature,
    metadata: SIGNATURE,
};

// ecdsa.Verify(pub *PublicKey, hash []byte, r, s *big.Int) bool
// ecdsa.VerifyASN1(pub *PublicKey, hash, sig []byte) bool
static VERIFY: RuleDef = rule! {
    id: "ecdsa/verify",
    targets: TARGETS,
    methods: &["Verify", "VerifyASN1"],
    value: ValueDef::Constant("ECDSA"),
    parameters: &[ParamDef::plain("*ecdsa.PublicKey"), ParamDef::plain("[]byte"), ParamDef::plain("*")],
    context: ContextKind::Signature,
    metadata: SIGNATURE,
};

declare_bundle!(
    EcdsaBundle,
    id: "ecdsa",
    name: "crypto/ecdsa",
    rules: [&GENERATE_KEY, &SIGN, &VERIFY],
);
