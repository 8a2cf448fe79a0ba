//! `crypto/rsa` key generation, signing and encryption.

use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, SizeUnit, ValueDef, ValueKind, declare_bundle};

const TARGETS: &[&str] = &["crypto/rsa"];
const RSA: &[(&str, &str)] = &[("kind", "RSA")];

// rsa.GenerateKey(random io.Reader, bits int) (*PrivateKey, error)
static GENERATE_KEY: RuleDef = rule! {
    id: "rsa/generate-key",
    targets: TARGETS,
    methods: &["GenerateKey"],
    value: ValueDef::Constant("RSA"),
    parameters: &[ParamDef::plain("io.Reader"), ParamDef::detect("int", ValueKind::KeySize(SizeUnit::Bit))],
    context: ContextKind::Key,
    metadata: RSA,
};

static SIGN: RuleDef = rule! {
    id: "rsa/sign",
    targets: TARGETS,
    methods: &["SignPKCS1v15", "SignPSS", "VerifyPKCS1v15", "VerifyPSS"],
    value: ValueDef::Constant("RSA"),
    parameters: &[ParamDef::plain("*"), ParamDef::plain("*"), ParamDef::plain("crypto.Hash")],
    context: ContextKind::Signature,
    metadata: RSA,
};

static ENCRYPT: RuleDef = rule! {
    id: "rsa/encrypt",
    targets: TARGETS,
    methods: &["EncryptOAEP", "DecryptOAEP", "EncryptPKCS1v15", "DecryptPKCS1v15"],
    value: ValueDef::Constant("RSA"),
    parameters: &[ParamDef::plain("*"), ParamDef::plain("*")],
    context: ContextKind::Key,
    metadata: RSA,
};

declare_bundle!(
    RsaBundle,
    id: "rsa",
    name: "crypto/rsa",
    rules: [&GENERATE_KEY, &SIGN, &ENCRYPT],
);
