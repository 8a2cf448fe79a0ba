//! `crypto/tls` protocol versions, cipher suites and connection entry points.
//!
//! Version and suite constants are matched as bare member references
//! (`MinVersion: tls.VersionTLS12`), never as calls.

use crate::rule;
use crate::{ContextKind, ParamDef, RuleDef, ValueDef, declare_bundle};

const TARGETS: &[&str] = &["crypto/tls"];
const TLS: &[(&str, &str)] = &[("kind", "TLS")];

/// Cipher suite constant names exported by `crypto/tls`.
pub const CIPHER_SUITES: &[&str] = &[
    "TLS_RSA_WITH_RC4_128_SHA",
    "TLS_RSA_WITH_3DES_EDE_CBC_SHA",
    "TLS_RSA_WITH_AES_128_CBC_SHA",
    "TLS_RSA_WITH_AES_256_CBC_SHA",
    "TLS_RSA_WITH_AES_128_CBC_SHA256",
    "TLS_RSA_WITH_AES_128_GCM_SHA256",
    "TLS_RSA_WITH_AES_256_GCM_SHA384",
    "TLS_ECDHE_ECDSA_WITH_RC4_128_SHA",
    "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA",
    "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA",
    "TLS_ECDHE_RSA_WITH_RC4_128_SHA",
    "TLS_ECDHE_RSA_WITH_3DES_EDE_CBC_SHA",
    "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA",
    "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA",
    "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256",
    "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256",
    "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
    "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
    "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384",
    "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384",
    "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256",
    "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256",
    "TLS_AES_128_GCM_SHA256",
    "TLS_AES_256_GCM_SHA384",
    "TLS_CHACHA20_POLY1305_SHA256",
];

static VERSION_SSL30: RuleDef = rule! {
    id: "tls/version-ssl30",
    targets: TARGETS,
    methods: &["VersionSSL30"],
    value: ValueDef::Constant("SSLv3"),
    parameters: &[],
    context: ContextKind::Protocol,
    metadata: TLS,
};

static VERSION_TLS10: RuleDef = rule! {
    id: "tls/version-tls10",
    targets: TARGETS,
    methods: &["VersionTLS10"],
    value: ValueDef::Constant("TLSv1.0"),
    parameters: &[],
    context: ContextKind::Protocol,
    metadata: TLS,
};

static VERSION_TLS11: RuleDef = rule! {
    id: "tls/version-tls11",
    targets: TARGETS,
    methods: &["VersionTLS11"],
    value: ValueDef::Constant("TLSv1.1"),
    parameters: &[],
    context: ContextKind::Protocol,
    metadata: TLS,
};

static VERSION_TLS12: RuleDef = rule! {
    id: "tls/version-tls12",
    targets: TARGETS,
    methods: &["VersionTLS12"],
    value: ValueDef::Constant("TLSv1.2"),
    parameters: &[],
    context: ContextKind::Protocol,
    metadata: TLS,
};

static VERSION_TLS13: RuleDef = rule! {
    id: "tls/version-tls13",
    targets: TARGETS,
    methods: &["VersionTLS13"],
    value: ValueDef::Constant("TLSv1.3"),
    parameters: &[],
    context: ContextKind::Protocol,
    metadata: TLS,
};

static CIPHER_SUITE: RuleDef = rule! {
    id: "tls/cipher-suite",
    targets: TARGETS,
    methods: CIPHER_SUITES,
    value: ValueDef::MemberName,
    parameters: &[],
    context: ContextKind::Protocol,
    metadata: TLS,
};

// tls.Dial(network, addr string, config *Config) (*Conn, error)
static CONNECTION: RuleDef = rule! {
    id: "tls/connection",
    targets: TARGETS,
    methods: &["Dial", "DialWithDialer", "Listen", "NewListener", "Server", "Client"],
    value: ValueDef::Constant("TLS"),
    parameters: &[],
    context: ContextKind::Protocol,
    metadata: TLS,
};

declare_bundle!(
    TlsBundle,
    id: "tls",
    name: "crypto/tls",
    rules: [
        &VERSION_SSL30,
        &VERSION_TLS10,
        &VERSION_TLS11,
        &VERSION_TLS12,
        &VERSION_TLS13,
        &CIPHER_SUITE,
        &CONNECTION,
    ],
);
