//! Message digests from `crypto/md5`, `crypto/sha1`, `crypto/sha256` and `crypto/sha512`.
//!
//! The `New*` constructors are usually passed by reference
//! (`hmac.New(sha256.New, key)`), so they are matched both as calls and as
//! bare function values.

use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, ValueDef, declare_bundle};

const DATA: &[ParamDef] = &[ParamDef::plain("[]byte")];

static MD5: RuleDef = rule! {
    id: "hash/md5",
    targets: &["crypto/md5"],
    methods: &["New"],
    value: ValueDef::Constant("MD5"),
    parameters: &[],
    context: ContextKind::Digest,
};

static SHA1: RuleDef = rule! {
    id: "hash/sha1",
    targets: &["crypto/sha1"],
    methods: &["New"],
    value: ValueDef::Constant("SHA-1"),
    parameters: &[],
    context: ContextKind::Digest,
};

static SHA224: RuleDef = rule! {
    id: "hash/sha224",
    targets: &["crypto/sha256"],
    methods: &["New224"],
    value: ValueDef::Constant("SHA-224"),
    parameters: &[],
    context: ContextKind::Digest,
};

static SHA256: RuleDef = rule! {
    id: "hash/sha256",
    targets: &["crypto/sha256"],
    methods: &["New"],
    value: ValueDef::Constant("SHA-256"),
    parameters: &[],
    context: ContextKind::Digest,
};

static SHA384: RuleDef = rule! {
    id: "hash/sha384",
    targets: &["crypto/sha512"],
    methods: &["New384"],
    value: ValueDef::Constant("SHA-384"),
    parameters: &[],
    context: ContextKind::Digest,
};

static SHA512: RuleDef = rule! {
    id: "hash/sha512",
    targets: &["crypto/sha512"],
    methods: &["New"],
    value: ValueDef::Constant("SHA-512"),
    parameters: &[],
    context: ContextKind::Digest,
};

static MD5_SUM: RuleDef = rule! {
    id: "hash/md5-sum",
    targets: &["crypto/md5"],
    methods: &["Sum"],
    value: ValueDef::Constant("MD5"),
    parameters: DATA,
    context: ContextKind::Digest,
};

static SHA1_SUM: RuleDef = rule! {
    id: "hash/sha1-sum",
    targets: &["crypto/sha1"],
    methods: &["Sum"],
    value: ValueDef::Constant("SHA-1"),
    parameters: DATA,
    context: ContextKind::Digest,
};

static SHA256_SUM: RuleDef = rule! {
    id: "hash/sha256-sum",
    targets: &["crypto/sha256"],
    methods: &["Sum256"],
    value: ValueDef::Constant("SHA-256"),
    parameters: DATA,
    context: ContextKind::Digest,
};

static SHA512_SUM: RuleDef = rule! {
    id: "hash/sha512-sum",
    targets: &["crypto/sha512"],
    methods: &["Sum512"],
    value: ValueDef::Constant("SHA-512"),
    parameters: DATA,
    context: ContextKind::Digest,
};

/// Hash constructors accepted wherever a `func() hash.Hash` is expected.
pub(crate) static CONSTRUCTORS: &[&RuleDef] = &[&MD5, &SHA1, &SHA224, &SHA256, &SHA384, &SHA512];

declare_bundle!(
    HashBundle,
    id: "hash",
    name: "crypto/sha*, crypto/md5",
    rules: [
        &MD5,
        &SHA1,
        &SHA224,
        &SHA256,
        &SHA384,
        &SHA512,
        &MD5_SUM,
        &SHA1_SUM,
        &SHA256_SUM,
        &SHA512_SUM,
    ],
);
