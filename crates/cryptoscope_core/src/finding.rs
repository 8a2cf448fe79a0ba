//! Reported cryptography usages.
//!
//! A [`Finding`] pairs one mapped [`Asset`] tree with the file and rule that
//! produced it. [`FindingId`] is derived from content rather than position,
//! so the same call keeps its id when surrounding lines move.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::mapper::{Asset, AssetKind};
use crate::tree::Span;

const FINDING_ID_BYTES: usize = 6;

/// Stable identifier for a finding: a 12 hex character digest of the rule
/// id, the file path and the matched source text.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FindingId(Box<str>);

impl FindingId {
    /// Derives the id of a finding.
    #[must_use]
    pub fn new(rule_id: &str, path: &Path, snippet: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(rule_id.as_bytes());
        hasher.update([0]);
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update([0]);
        hasher.update(snippet.as_bytes());
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..FINDING_ID_BYTES]).into())
    }

    /// Returns the hex string representation of this id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FindingId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FindingId({})", self.0)
    }
}

impl fmt::Display for FindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One detected cryptography usage in a source file.
#[derive(Debug, Clone)]
pub struct Finding {
    /// Stable identifier.
    pub id: FindingId,
    /// File the usage was found in.
    pub path: Box<Path>,
    /// Location of the matched call or reference.
    pub span: Span,
    /// Identifier of the entry rule that matched (e.g. `"aes/new-cipher"`).
    pub rule_id: Arc<str>,
    /// Bundle the entry rule belongs to.
    pub bundle: Arc<str>,
    /// The detected asset and its refinements.
    pub asset: Asset,
}

impl Finding {
    /// Returns the 1-indexed line number of the match.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.span.line
    }

    /// Returns the 1-indexed column number of the match.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.span.column
    }

    /// Returns the kind of the primary asset.
    #[must_use]
    pub const fn kind(&self) -> AssetKind {
        self.asset.kind
    }

    /// Returns the finding message, e.g. `(BlockCipher) AES`.
    #[must_use]
    pub fn message(&self) -> String {
        self.asset.message()
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}]",
            self.path.display(),
            self.span.line,
            self.span.column,
            self.message(),
            self.rule_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_finding;

    #[test]
    fn finding_id_is_twelve_hex_characters() {
        let id = FindingId::new("aes/new-cipher", Path::new("main.go"), "aes.NewCipher(key)");
        assert_eq!(id.as_str().len(), 12);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn finding_id_is_deterministic() {
        let a = FindingId::new("aes/new-cipher", Path::new("main.go"), "aes.NewCipher(key)");
        let b = FindingId::new("aes/new-cipher", Path::new("main.go"), "aes.NewCipher(key)");
        assert_eq!(a, b);
    }

    #[test]
    fn finding_id_depends_on_every_input() {
        let base = FindingId::new("aes/new-cipher", Path::new("main.go"), "aes.NewCipher(key)");
        assert_ne!(base, FindingId::new("des/new-cipher", Path::new("main.go"), "aes.NewCipher(key)"));
        assert_ne!(base, FindingId::new("aes/new-cipher", Path::new("other.go"), "aes.NewCipher(key)"));
        assert_ne!(base, FindingId::new("aes/new-cipher", Path::new("main.go"), "aes.NewCipher(k)"));
    }

    #[test]
    fn finding_id_fields_do_not_run_together() {
        let a = FindingId::new("ab", Path::new("c"), "d");
        let b = FindingId::new("a", Path::new("bc"), "d");
        assert_ne!(a, b);
    }

    #[test]
    fn finding_id_debug_names_the_type() {
        let id = FindingId::new("aes/new-cipher", Path::new("main.go"), "x");
        assert_eq!(format!("{id:?}"), format!("FindingId({id})"));
    }

    #[test]
    fn finding_display_shows_location_message_and_rule() {
        let finding = make_finding("aes/new-cipher", AssetKind::BlockCipher, "AES");
        assert_eq!(finding.to_string(), "main.go:3:5: (BlockCipher) AES [aes/new-cipher]");
        assert_eq!(finding.line(), 3);
        assert_eq!(finding.column(), 5);
        assert_eq!(finding.kind(), AssetKind::BlockCipher);
    }

    #[test]
    fn asset_serializes_with_kebab_case_kind_and_no_empty_children() {
        let mut finding = make_finding("hmac/new", AssetKind::Mac, "HMAC");
        finding.asset.children.push(Asset {
            kind: AssetKind::MessageDigest,
            value: "SHA256".into(),
            span: Span::new(3, 15, 30, 40),
            children: Vec::new(),
        });

        let json = serde_json::to_value(&finding.asset).unwrap();

        assert_eq!(json["kind"], "mac");
        assert_eq!(json["children"][0]["kind"], "message-digest");
        assert_eq!(json["children"][0]["span"]["line"], 3);
        assert!(json["children"][0].get("children").is_none());
    }
}
