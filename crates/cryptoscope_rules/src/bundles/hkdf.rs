//! HKDF from `crypto/hkdf` and `golang.org/x/crypto/hkdf`.

use super::hash::CONSTRUCTORS;
use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, SizeUnit, ValueDef, ValueKind, declare_bundle};

const TARGETS: &[&str] = &["crypto/hkdf", "golang.org/x/crypto/hkdf"];

// hkdf.New(hash func() hash.Hash, secret, salt, info []byte) io.Reader
static NEW: RuleDef = rule! {
    id: "hkdf/new",
    targets: TARGETS,
    methods: &["New"],
    value: ValueDef::Constant("HKDF"),
    parameters: &[
        ParamDef::depends("func() hash.Hash", CONSTRUCTORS),
        ParamDef::plain("[]byte"),
        ParamDef::detect("[]byte", ValueKind::SaltSize(SizeUnit::Byte)),
        ParamDef::plain("*"),
    ],
    context: ContextKind::Kdf,
};

// hkdf.Key(h func() H, secret []byte, salt []byte, info string, keyLength int) ([]byte, error)
static KEY: RuleDef = rule! {
    id: "hkdf/key",
    targets: TARGETS,
    methods: &["Key"],
    value: ValueDef::Constant("HKDF"),
    parameters: &[
        ParamDef::depends("*", CONSTRUCTORS),
        ParamDef::plain("[]byte"),
        ParamDef::detect("[]byte", ValueKind::SaltSize(SizeUnit::Byte)),
        ParamDef::plain("string"),
        ParamDef::detect("int", ValueKind::KeySize(SizeUnit::Byte)),
    ],
    context: ContextKind::Kdf,
};

declare_bundle!(
    HkdfBundle,
    id: "hkdf",
    name: "crypto/hkdf",
    rules: [&NEW, &KEY],
);
