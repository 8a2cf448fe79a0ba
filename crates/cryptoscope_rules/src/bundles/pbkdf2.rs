//! PBKDF2 from `crypto/pbkdf2` and `golang.org/x/crypto/pbkdf2`.

use super::hash::CONSTRUCTORS;
use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, SizeUnit, ValueDef, ValueKind, declare_bundle};

// pbkdf2.Key(password, salt []byte, iter, keyLen int, h func() hash.Hash) []byte
static KEY: RuleDef = rule! {
    id: "pbkdf2/key",
    targets: &["golang.org/x/crypto/pbkdf2"],
    methods: &["Key"],
    value: ValueDef::Constant("PBKDF2"),
    parameters: &[
        ParamDef::plain("[]byte"),
        ParamDef::detect("[]byte", ValueKind::SaltSize(SizeUnit::Byte)),
        ParamDef::plain("int"),
        ParamDef::detect("int", ValueKind::KeySize(SizeUnit::Byte)),
        ParamDef::depends("func() hash.Hash", CONSTRUCTORS),
    ],
    context: ContextKind::Kdf,
};

// pbkdf2.Key(h func() Hash, password string, salt []byte, iter, keyLength int) ([]byte, error)
static STD_KEY: RuleDef = rule! {
    id: "pbkdf2/std-key",
    targets: &["crypto/pbkdf2"],
    methods: &["Key"],
    value: ValueDef::Constant("PBKDF2"),
    parameters: &[
        ParamDef::depends("*", CONSTRUCTORS),
        ParamDef::plain("string"),
        ParamDef::detect("[]byte", ValueKind::SaltSize(SizeUnit::Byte)),
        ParamDef::plain("int"),
        ParamDef::detect("int", ValueKind::KeySize(SizeUnit::Byte)),
    ],
    context: ContextKind::Kdf,
};

declare_bundle!(
    Pbkdf2Bundle,
    id: "pbkdf2",
    name: "crypto/pbkdf2",
    rules: [&KEY, &STD_KEY],
);
