//! `crypto/cipher` modes of operation.
//!
//! These rules are never entry points. They chain from block cipher
//! constructors whose result flows into the mode constructor.

use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, ValueDef};

const TARGETS: &[&str] = &["crypto/cipher"];
const BLOCK_AND_IV: &[ParamDef] = &[ParamDef::plain("cipher.Block"), ParamDef::plain("[]byte")];
const BLOCK_MODE: &[(&str, &str)] = &[("kind", "BLOCK_CIPHER_MODE")];

pub(crate) static NEW_GCM: RuleDef = rule! {
    id: "cipher/new-gcm",
    targets: TARGETS,
    methods: &["NewGCM", "NewGCMWithNonceSize", "NewGCMWithTagSize", "NewGCMWithRandomNonce"],
    value: ValueDef::Constant("GCM"),
    parameters: &[ParamDef::plain("cipher.Block")],
    context: ContextKind::Cipher,
    metadata: &[("kind", "AEAD_BLOCK_CIPHER_MODE")],
};

pub(crate) static NEW_CBC: RuleDef = rule! {
    id: "cipher/new-cbc",
    targets: TARGETS,
    methods: &["NewCBCEncrypter", "NewCBCDecrypter"],
    value: ValueDef::Constant("CBC"),
    parameters: BLOCK_AND_IV,
    context: ContextKind::Cipher,
    metadata: BLOCK_MODE,
};

pub(crate) static NEW_CFB: RuleDef = rule! {
    id: "cipher/new-cfb",
    targets: TARGETS,
    methods: &["NewCFBEncrypter", "NewCFBDecrypter"],
    value: ValueDef::Constant("CFB"),
    parameters: BLOCK_AND_IV,
    context: ContextKind::Cipher,
    metadata: BLOCK_MODE,
};

pub(crate) static NEW_CTR: RuleDef = rule! {
    id: "cipher/new-ctr",
    targets: TARGETS,
    methods: &["NewCTR"],
    value: ValueDef::Constant("CTR"),
    parameters: BLOCK_AND_IV,
    context: ContextKind::Cipher,
    metadata: BLOCK_MODE,
};

pub(crate) static NEW_OFB: RuleDef = rule! {
    id: "cipher/new-ofb",
    targets: TARGETS,
    methods: &["NewOFB"],
    value: ValueDef::Constant("OFB"),
    parameters: BLOCK_AND_IV,
    context: ContextKind::Cipher,
    metadata: BLOCK_MODE,
};

/// Every mode constructor a block cipher can chain into.
pub(crate) static MODES: &[&RuleDef] = &[&NEW_GCM, &NEW_CBC, &NEW_CFB, &NEW_CTR, &NEW_OFB];
