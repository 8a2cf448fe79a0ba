//! Translation of detection stores into cryptographic assets.
//!
//! A detection store records raw captured values: the rule's own tag plus
//! any resolved arguments. The mapper interprets those values through the
//! rule's context and `kind` metadata, producing an [`Asset`] tree that a
//! reporter can print without knowing anything about rules.

use std::fmt;

use cryptoscope_rules::bundles::CIPHER_SUITES;
use cryptoscope_rules::{ContextKind, SizeUnit, ValueKind};
use serde::Serialize;

use crate::resolver::Value;
use crate::rule::{Rule, RuleSet};
use crate::store::{DetectedValue, DetectionStore, StoreId, ValueSource};
use crate::tree::{Span, Tree};

const AEAD_MODE: &str = "AEAD_BLOCK_CIPHER_MODE";
const BLOCK_MODE: &str = "BLOCK_CIPHER_MODE";
const TLS_VERSIONS: &[&str] = &["SSLv3", "TLSv1.0", "TLSv1.1", "TLSv1.2", "TLSv1.3"];

/// Category of a detected cryptographic asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    /// A block or stream cipher.
    BlockCipher,
    /// A block cipher mode of operation.
    Mode,
    /// A named elliptic curve.
    EllipticCurve,
    /// A signature scheme.
    Signature,
    /// A public-key encryption scheme.
    PublicKeyEncryption,
    /// A message authentication code.
    Mac,
    /// A message digest.
    MessageDigest,
    /// A key derivation function.
    KeyDerivationFunction,
    /// A key length in bits.
    KeyLength,
    /// A salt length in bits.
    SaltLength,
    /// A TLS protocol version or connection.
    Tls,
    /// A TLS cipher suite.
    CipherSuite,
    /// A random number generator.
    Prng,
}

impl AssetKind {
    /// Returns the human-readable name used in finding messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BlockCipher => "BlockCipher",
            Self::Mode => "Mode",
            Self::EllipticCurve => "EllipticCurve",
            Self::Signature => "Signature",
            Self::PublicKeyEncryption => "PublicKeyEncryption",
            Self::Mac => "Mac",
            Self::MessageDigest => "MessageDigest",
            Self::KeyDerivationFunction => "KeyDerivationFunction",
            Self::KeyLength => "KeyLength",
            Self::SaltLength => "SaltLength",
            Self::Tls => "TLS",
            Self::CipherSuite => "CipherSuite",
            Self::Prng => "PRNG",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A cryptographic asset and the assets that refine it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    /// What the asset is.
    pub kind: AssetKind,
    /// Its value, e.g. `AES`, `P-256` or `256`.
    pub value: String,
    /// Where the value was read from.
    pub span: Span,
    /// Refinements: key lengths, modes, curves, digests.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Asset>,
}

impl Asset {
    fn leaf(kind: AssetKind, value: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            value: value.into(),
            span,
            children: Vec::new(),
        }
    }

    /// Returns the finding message for this asset, e.g. `(Signature) ECDSA`.
    #[must_use]
    pub fn message(&self) -> String {
        format!("({}) {}", self.kind, self.value)
    }

    /// Iterates this asset and all its descendants, depth first.
    pub fn walk(&self) -> impl Iterator<Item = &Self> {
        let mut pending = vec![self];
        std::iter::from_fn(move || {
            let next = pending.pop()?;
            pending.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

/// Maps detection stores to asset trees.
#[derive(Debug, Clone, Copy)]
pub struct Mapper<'a> {
    tree: &'a Tree,
    rules: &'a RuleSet,
    store: &'a DetectionStore,
}

impl<'a> Mapper<'a> {
    /// Creates a mapper over one file's detection results.
    #[must_use]
    pub const fn new(tree: &'a Tree, rules: &'a RuleSet, store: &'a DetectionStore) -> Self {
        Self { tree, rules, store }
    }

    /// Maps the store `id` and its chained stores.
    ///
    /// The store's first translatable value becomes the primary asset, with
    /// the remaining values and every child store's assets beneath it. A
    /// store with no translatable value passes its children's assets
    /// through, so the result can hold more than one asset.
    #[must_use]
    pub fn map(&self, id: StoreId) -> Vec<Asset> {
        let node = self.store.get(id);
        let rule = self.rules.get(node.rule);

        let mut assets = node.values.iter().filter_map(|detected| self.translate(rule, detected));
        let primary = assets.next();
        let mut children: Vec<Asset> = assets.collect();
        for &child in &node.children {
            children.extend(self.map(child));
        }

        match primary {
            Some(mut primary) => {
                primary.children = children;
                vec![primary]
            }
            None => children,
        }
    }

    fn translate(&self, rule: &Rule, detected: &DetectedValue) -> Option<Asset> {
        let span = self.tree.span(detected.node);
        match detected.source {
            ValueSource::Parameter { kind, .. } => match kind {
                ValueKind::KeySize(unit) => size(AssetKind::KeyLength, unit, &detected.value, span),
                ValueKind::SaltSize(unit) => size(AssetKind::SaltLength, unit, &detected.value, span),
                ValueKind::Mode => Some(Asset::leaf(AssetKind::Mode, detected.value.to_string(), span)),
                ValueKind::Curve => Some(Asset::leaf(AssetKind::EllipticCurve, detected.value.to_string(), span)),
                ValueKind::Algorithm | ValueKind::Any => Some(named(rule, &detected.value.to_string(), span)),
            },
            ValueSource::Rule => Some(named(rule, &detected.value.to_string(), span)),
        }
    }
}

fn size(kind: AssetKind, unit: SizeUnit, value: &Value, span: Span) -> Option<Asset> {
    let amount = value.as_integer()?;
    let bits = match unit {
        SizeUnit::Bit => amount,
        SizeUnit::Byte => amount.checked_mul(8)?,
    };
    Some(Asset::leaf(kind, bits.to_string(), span))
}

fn named(rule: &Rule, value: &str, span: Span) -> Asset {
    let kind = match rule.context {
        ContextKind::Cipher => match rule.metadata("kind") {
            Some(AEAD_MODE | BLOCK_MODE) => AssetKind::Mode,
            _ => AssetKind::BlockCipher,
        },
        ContextKind::Key => match rule.metadata("kind") {
            Some("EC") if is_curve(value) => AssetKind::EllipticCurve,
            Some("EC" | "DSA" | "Ed25519") => AssetKind::Signature,
            _ => AssetKind::PublicKeyEncryption,
        },
        ContextKind::Signature => AssetKind::Signature,
        ContextKind::Mac => AssetKind::Mac,
        ContextKind::Digest => AssetKind::MessageDigest,
        ContextKind::Kdf => AssetKind::KeyDerivationFunction,
        ContextKind::Prng => AssetKind::Prng,
        ContextKind::Protocol => return protocol(value, span),
    };
    Asset::leaf(kind, value, span)
}

fn protocol(value: &str, span: Span) -> Asset {
    if value.starts_with("TLS_") && CIPHER_SUITES.contains(&value) {
        Asset::leaf(AssetKind::CipherSuite, value, span)
    } else if TLS_VERSIONS.contains(&value) {
        Asset::leaf(AssetKind::Tls, value, span)
    } else {
        Asset::leaf(AssetKind::Tls, "TLS", span)
    }
}

fn is_curve(value: &str) -> bool {
    value.starts_with("P-") || value.eq_ignore_ascii_case("X25519")
}
