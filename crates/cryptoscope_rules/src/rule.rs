//! Rule definition types for cryptography detection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid context kind string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContextError {
    invalid_value: Box<str>,
}

impl ParseContextError {
    fn new(value: &str) -> Self {
        Self {
            invalid_value: value.into(),
        }
    }

    /// Returns the invalid value that caused the parse failure.
    #[must_use]
    pub fn invalid_value(&self) -> &str {
        &self.invalid_value
    }
}

impl fmt::Display for ParseContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid context '{}': expected one of 'cipher', 'key', 'signature', 'protocol', 'mac', 'digest', 'prng', 'kdf'",
            self.invalid_value
        )
    }
}

impl std::error::Error for ParseContextError {}

/// Semantic category of the construct a matched call produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    /// Block or stream cipher construction and its modes of operation.
    Cipher,
    /// Key generation or key parameters.
    Key,
    /// Signing and verification.
    Signature,
    /// Transport protocol configuration (TLS versions, cipher suites).
    Protocol,
    /// Message authentication codes.
    Mac,
    /// Message digests.
    Digest,
    /// Random number generation.
    Prng,
    /// Key derivation functions.
    Kdf,
}

impl ContextKind {
    /// All context kinds in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Cipher,
        Self::Key,
        Self::Signature,
        Self::Protocol,
        Self::Mac,
        Self::Digest,
        Self::Prng,
        Self::Kdf,
    ];

    /// Returns the lowercase identifier used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cipher => "cipher",
            Self::Key => "key",
            Self::Signature => "signature",
            Self::Protocol => "protocol",
            Self::Mac => "mac",
            Self::Digest => "digest",
            Self::Prng => "prng",
            Self::Kdf => "kdf",
        }
    }

    /// Returns the human-readable display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cipher => "Cipher",
            Self::Key => "Key",
            Self::Signature => "Signature",
            Self::Protocol => "Protocol",
            Self::Mac => "MAC",
            Self::Digest => "Digest",
            Self::Prng => "PRNG",
            Self::Kdf => "KDF",
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextKind {
    type Err = ParseContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseContextError::new(s))
    }
}

/// Unit a detected size is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeUnit {
    /// Size counted in bits (e.g. the `bits` argument of `rsa.GenerateKey`).
    Bit,
    /// Size counted in bytes (e.g. the length of an AES key slice).
    Byte,
}

impl SizeUnit {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Bit => "bits",
            Self::Byte => "bytes",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "bits" | "bit" => Some(Self::Bit),
            "bytes" | "byte" => Some(Self::Byte),
            _ => None,
        }
    }
}

/// Error returned when parsing an invalid value kind string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseValueKindError {
    invalid_value: Box<str>,
}

impl ParseValueKindError {
    /// Returns the invalid value that caused the parse failure.
    #[must_use]
    pub fn invalid_value(&self) -> &str {
        &self.invalid_value
    }
}

impl fmt::Display for ParseValueKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid value kind '{}': expected 'algorithm', 'mode', 'curve', 'any', 'key-size:<bits|bytes>' or 'salt-size:<bits|bytes>'",
            self.invalid_value
        )
    }
}

impl std::error::Error for ParseValueKindError {}

/// How a detectable argument is interpreted once its value is resolved.
///
/// Size kinds expect integer values; all other kinds expect strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ValueKind {
    /// An algorithm name.
    Algorithm,
    /// A key length.
    KeySize(SizeUnit),
    /// A salt length.
    SaltSize(SizeUnit),
    /// A mode of operation.
    Mode,
    /// A named elliptic curve.
    Curve,
    /// Anything; the raw resolved value is kept.
    Any,
}

impl ValueKind {
    /// Returns `true` for kinds whose values must resolve to integers.
    #[must_use]
    pub const fn is_size(self) -> bool {
        matches!(self, Self::KeySize(_) | Self::SaltSize(_))
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Algorithm => f.write_str("algorithm"),
            Self::KeySize(unit) => write!(f, "key-size:{}", unit.as_str()),
            Self::SaltSize(unit) => write!(f, "salt-size:{}", unit.as_str()),
            Self::Mode => f.write_str("mode"),
            Self::Curve => f.write_str("curve"),
            Self::Any => f.write_str("any"),
        }
    }
}

impl FromStr for ValueKind {
    type Err = ParseValueKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseValueKindError {
            invalid_value: s.into(),
        };
        let lowered = s.to_ascii_lowercase();

        match lowered.split_once(':') {
            Some(("key-size", unit)) => SizeUnit::parse(unit).map(Self::KeySize).ok_or_else(err),
            Some(("salt-size", unit)) => SizeUnit::parse(unit).map(Self::SaltSize).ok_or_else(err),
            Some(_) => Err(err()),
            None => match lowered.as_str() {
                "algorithm" => Ok(Self::Algorithm),
                "mode" => Ok(Self::Mode),
                "curve" => Ok(Self::Curve),
                "any" => Ok(Self::Any),
                _ => Err(err()),
            },
        }
    }
}

impl TryFrom<String> for ValueKind {
    type Error = ParseValueKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ValueKind> for String {
    fn from(kind: ValueKind) -> Self {
        kind.to_string()
    }
}

/// Where a rule's own tagged value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDef {
    /// The rule tags no value of its own.
    None,
    /// A fixed value such as `"AES"`.
    Constant(&'static str),
    /// The matched callee or member name itself (e.g. a cipher-suite constant).
    MemberName,
}

/// A single argument position in a rule's target signature.
#[derive(Debug, Clone, Copy)]
pub struct ParamDef {
    /// Declared Go type of the argument, or `"*"` for any.
    pub type_name: &'static str,
    /// Value interpretation when the argument should be captured.
    pub detect: Option<ValueKind>,
    /// Rules to try against the argument's sub-expression.
    pub dependents: &'static [&'static RuleDef],
}

impl ParamDef {
    /// An argument that only constrains the signature.
    #[must_use]
    pub const fn plain(type_name: &'static str) -> Self {
        Self {
            type_name,
            detect: None,
            dependents: &[],
        }
    }

    /// An argument whose resolved value is captured as `kind`.
    #[must_use]
    pub const fn detect(type_name: &'static str, kind: ValueKind) -> Self {
        Self {
            type_name,
            detect: Some(kind),
            dependents: &[],
        }
    }

    /// An argument matched against further rules.
    #[must_use]
    pub const fn depends(type_name: &'static str, dependents: &'static [&'static RuleDef]) -> Self {
        Self {
            type_name,
            detect: None,
            dependents,
        }
    }
}

/// A declarative description of one detectable Go call or constant.
#[derive(Debug)]
pub struct RuleDef {
    /// Unique identifier in `"package/name"` format (e.g. `"aes/new-cipher"`).
    pub id: &'static str,
    /// Bundle the rule belongs to.
    pub bundle: &'static str,
    /// Package paths or receiver types the call is made on. Empty matches any.
    pub targets: &'static [&'static str],
    /// Function, method or constant names.
    pub methods: &'static [&'static str],
    /// The rule's own tagged value.
    pub value: ValueDef,
    /// Argument specifications in positional order.
    pub parameters: &'static [ParamDef],
    /// Category of the produced construct.
    pub context: ContextKind,
    /// Free-form context metadata (e.g. `("kind", "BLOCK_CIPHER_MODE")`).
    pub metadata: &'static [(&'static str, &'static str)],
    /// Rules that may chain from this call's result.
    pub dependents: &'static [&'static RuleDef],
}

/// Creates a `RuleDef` in the builtin bundle, with `metadata` and
/// `dependents` defaulting to empty.
#[macro_export]
macro_rules! rule {
    (@or [$value:expr] $default:expr) => {
        $value
    };
    (@or [] $default:expr) => {
        $default
    };
    (
        id: $id:expr,
        targets: $targets:expr,
        methods: $methods:expr,
        value: $value:expr,
        parameters: $parameters:expr,
        context: $context:expr
        $(, metadata: $metadata:expr)?
        $(, dependents: $dependents:expr)?
        $(,)?
    ) => {
        $crate::RuleDef {
            id: $id,
            bundle: $crate::BUNDLE_NAME,
            targets: $targets,
            methods: $methods,
            value: $value,
            parameters: $parameters,
            context: $context,
            metadata: $crate::rule!(@or [$($metadata)?] &[]),
            dependents: $crate::rule!(@or [$($dependents)?] &[]),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_display_formats_as_lowercase() {
        assert_eq!(ContextKind::Cipher.to_string(), "cipher");
        assert_eq!(ContextKind::Kdf.to_string(), "kdf");
    }

    #[test]
    fn context_from_str_is_case_insensitive() {
        assert_eq!(ContextKind::from_str("SIGNATURE"), Ok(ContextKind::Signature));
        assert_eq!(ContextKind::from_str("Mac"), Ok(ContextKind::Mac));
    }

    #[test]
    fn context_from_str_returns_error_for_invalid_value() {
        let err = ContextKind::from_str("hash").unwrap_err();
        assert_eq!(err.invalid_value(), "hash");
        assert!(err.to_string().contains("expected one of"));
    }

    #[test]
    fn value_kind_parses_sizes_with_units() {
        assert_eq!(ValueKind::from_str("key-size:bytes"), Ok(ValueKind::KeySize(SizeUnit::Byte)));
        assert_eq!(ValueKind::from_str("salt-size:bits"), Ok(ValueKind::SaltSize(SizeUnit::Bit)));
        assert_eq!(ValueKind::from_str("Algorithm"), Ok(ValueKind::Algorithm));
    }

    #[test]
    fn value_kind_rejects_unknown_unit() {
        assert!(ValueKind::from_str("key-size:words").is_err());
        assert!(ValueKind::from_str("colour").is_err());
    }

    #[test]
    fn value_kind_display_round_trips() {
        for kind in [
            ValueKind::Algorithm,
            ValueKind::KeySize(SizeUnit::Bit),
            ValueKind::SaltSize(SizeUnit::Byte),
            ValueKind::Mode,
            ValueKind::Curve,
            ValueKind::Any,
        ] {
            assert_eq!(kind.to_string().parse::<ValueKind>(), Ok(kind));
        }
    }

    #[test]
    fn only_sizes_are_integer_kinds() {
        assert!(ValueKind::KeySize(SizeUnit::Byte).is_size());
        assert!(!ValueKind::Curve.is_size());
    }

    #[test]
    fn param_constructors_set_one_role() {
        let plain = ParamDef::plain("io.Reader");
        assert!(plain.detect.is_none() && plain.dependents.is_empty());

        let detect = ParamDef::detect("[]byte", ValueKind::KeySize(SizeUnit::Byte));
        assert!(detect.detect.is_some() && detect.dependents.is_empty());
    }

    #[test]
    fn rule_macro_defaults_metadata_and_dependents() {
        static RULE: RuleDef = rule! {
            id: "test/rule",
            targets: &["crypto/test"],
            methods: &["New"],
            value: ValueDef::Constant("TEST"),
            parameters: &[],
            context: ContextKind::Cipher,
        };

        assert_eq!(RULE.bundle, crate::BUNDLE_NAME);
        assert!(RULE.metadata.is_empty());
        assert!(RULE.dependents.is_empty());
    }
}
