//! `crypto/des` block cipher construction.

use super::cipher::MODES;
use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, SizeUnit, ValueDef, ValueKind, declare_bundle};

const KEY: &[ParamDef] = &[ParamDef::detect("[]byte", ValueKind::KeySize(SizeUnit::Byte))];

static NEW_CIPHER: RuleDef = rule! {
    id: "des/new-cipher",
    targets: &["crypto/des"],
    methods: &["NewCipher"],
    value: ValueDef::Constant("DES"),
    parameters: KEY,
    context: ContextKind::Cipher,
    dependents: MODES,
};

static NEW_TRIPLE_DES_CIPHER: RuleDef = rule! {
    id: "des/new-triple-des-cipher",
    targets: &["crypto/des"],
    methods: &["NewTripleDESCipher"],
    value: ValueDef::Constant("3DES"),
    parameters: KEY,
    context: ContextKind::Cipher,
    dependents: MODES,
};

declare_bundle!(
    DesBundle,
    id: "des",
    name: "crypto/des",
    rules: [&NEW_CIPHER, &NEW_TRIPLE_DES_CIPHER],
);
