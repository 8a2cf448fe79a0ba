//! `crypto/hmac` message authentication.

use super::hash::CONSTRUCTORS;
use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, ValueDef, declare_bundle};

// hmac.New(h func() hash.Hash, key []byte) hash.Hash
static NEW: RuleDef = rule! {
    id: "hmac/new",
    targets: &["crypto/hmac"],
    methods: &["New"],
    value: ValueDef::Constant("HMAC"),
    parameters: &[ParamDef::depends("func() hash.Hash", CONSTRUCTORS), ParamDef::plain("[]byte")],
    context: ContextKind::Mac,
};

declare_bundle!(
    HmacBundle,
    id: "hmac",
    name: "crypto/hmac",
    rules: [&NEW],
);
