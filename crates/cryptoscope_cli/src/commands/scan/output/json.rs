//! JSON output formatter for scan findings.

use std::io::Write;

use cryptoscope_core::prelude::*;
use serde::Serialize;

#[derive(Serialize)]
struct JsonFinding<'a> {
    id: &'a str,
    path: String,
    line: u32,
    column: u32,
    rule_id: &'a str,
    bundle: &'a str,
    kind: AssetKind,
    value: &'a str,
    message: String,
    asset: &'a Asset,
}

fn to_json_finding(f: &Finding) -> JsonFinding<'_> {
    JsonFinding {
        id: f.id.as_str(),
        path: f.path.display().to_string(),
        line: f.line(),
        column: f.column(),
        rule_id: &f.rule_id,
        bundle: &f.bundle,
        kind: f.kind(),
        value: &f.asset.value,
        message: f.message(),
        asset: &f.asset,
    }
}

/// Serialises scan findings as a pretty-printed JSON array to the given writer.
pub fn write(findings: &[Finding], writer: &mut dyn Write) -> anyhow::Result<()> {
    let json_findings: Vec<JsonFinding<'_>> = findings.iter().map(to_json_finding).collect();
    serde_json::to_writer_pretty(&mut *writer, &json_findings)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;

    fn finding() -> Finding {
        let span = Span::new(6, 5, 60, 78);
        Finding {
            id: FindingId::new("aes/new-cipher", Path::new("main.go"), "aes.NewCipher(key)"),
            path: Path::new("main.go").into(),
            span,
            rule_id: Arc::from("aes/new-cipher"),
            bundle: Arc::from("aes"),
            asset: Asset {
                kind: AssetKind::BlockCipher,
                value: "AES".to_string(),
                span,
                children: vec![Asset {
                    kind: AssetKind::KeyLength,
                    value: "256".to_string(),
                    span: Span::new(5, 12, 40, 56),
                    children: Vec::new(),
                }],
            },
        }
    }

    #[test]
    fn writes_flat_fields_and_nested_asset() {
        let mut out = Vec::new();
        write(&[finding()], &mut out).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let entry = &parsed[0];
        assert_eq!(entry["path"], "main.go");
        assert_eq!(entry["line"], 6);
        assert_eq!(entry["column"], 5);
        assert_eq!(entry["rule_id"], "aes/new-cipher");
        assert_eq!(entry["bundle"], "aes");
        assert_eq!(entry["kind"], "block-cipher");
        assert_eq!(entry["value"], "AES");
        assert_eq!(entry["message"], "(BlockCipher) AES");
        assert_eq!(entry["id"].as_str().unwrap().len(), 12);
        assert_eq!(entry["asset"]["children"][0]["kind"], "key-length");
        assert_eq!(entry["asset"]["children"][0]["value"], "256");
        assert!(entry["asset"]["children"][0].get("children").is_none());
    }

    #[test]
    fn empty_findings_are_an_empty_array() {
        let mut out = Vec::new();
        write(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[]\n");
    }
}
