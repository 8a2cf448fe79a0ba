//! `crypto/aes` block cipher construction.

use super::cipher::MODES;
use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, SizeUnit, ValueDef, ValueKind, declare_bundle};

// aes.NewCipher(key []byte) (cipher.Block, error)
// 16, 24 or 32 key bytes select AES-128, AES-192 or AES-256.
static NEW_CIPHER: RuleDef = rule! {
    id: "aes/new-cipher",
    targets: &["crypto/aes"],
    methods: &["NewCipher"],
    value: ValueDef::Constant("AES"),
    parameters: &[ParamDef::detect("[]byte", ValueKind::KeySize(SizeUnit::Byte))],
    context: ContextKind::Cipher,
    dependents: MODES,
};

declare_bundle!(
    AesBundle,
    id: "aes",
    name: "crypto/aes",
    rules: [&NEW_CIPHER],
);
