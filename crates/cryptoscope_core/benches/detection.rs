//! Benchmarks for the detection pipeline.
//!
//! Run with: cargo bench -p `cryptoscope_core`

#![expect(clippy::expect_used, reason = "benchmarks use expect for setup code")]

use std::hint::black_box;
use std::path::Path;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use cryptoscope_core::prelude::*;

/// Ordinary Go with no cryptography (the common case).
const PLAIN_GO: &str = r#"package main

import (
    "fmt"
    "strings"
)

func greet(names []string) string {
    var b strings.Builder
    for _, name := range names {
        b.WriteString(fmt.Sprintf("hello %s\n", name))
    }
    return b.String()
}
"#;

/// Go that exercises chaining, dependents and value resolution.
const CRYPTO_GO: &str = r#"package main

import (
    "crypto/aes"
    "crypto/cipher"
    "crypto/ecdsa"
    "crypto/elliptic"
    "crypto/hmac"
    "crypto/rand"
    "crypto/sha256"
)

func work(msg []byte) {
    key := make([]byte, 32)
    block, _ := aes.NewCipher(key)
    gcm, _ := cipher.NewGCM(block)
    curve := elliptic.P256()
    priv, _ := ecdsa.GenerateKey(curve, rand.Reader)
    mac := hmac.New(sha256.New, key)
    mac.Write(msg)
    _, _, _ = gcm, priv, mac
}
"#;

fn bench_rule_compilation(c: &mut Criterion) {
    c.bench_function("rule_set_builtin", |b| {
        b.iter(|| black_box(RuleSet::builtin().expect("builtin rules")));
    });
}

fn bench_scan_plain(c: &mut Criterion) {
    let scanner = Scanner::new(RuleSet::builtin().expect("builtin rules"));
    let path = Path::new("plain.go");

    let mut group = c.benchmark_group("scan_plain");
    group.throughput(Throughput::Bytes(PLAIN_GO.len() as u64));
    group.bench_function("prefiltered", |b| {
        b.iter(|| black_box(scanner.scan_content(black_box(PLAIN_GO), path)));
    });
    group.finish();
}

fn bench_scan_crypto(c: &mut Criterion) {
    let scanner = Scanner::new(RuleSet::builtin().expect("builtin rules"));
    let path = Path::new("crypto.go");

    let mut group = c.benchmark_group("scan_crypto");
    group.throughput(Throughput::Bytes(CRYPTO_GO.len() as u64));
    group.bench_function("small_file", |b| {
        b.iter(|| black_box(scanner.scan_content(black_box(CRYPTO_GO), path)));
    });

    let body = CRYPTO_GO
        .split_once("func work")
        .map(|(_, rest)| rest)
        .expect("fixture has a function");
    let mut large = CRYPTO_GO.to_string();
    for i in 0..200 {
        large.push_str(&format!("\nfunc work{i}{body}"));
    }
    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("large_file", |b| {
        b.iter(|| black_box(scanner.scan_content(black_box(&large), path)));
    });
    group.finish();
}

criterion_group!(benches, bench_rule_compilation, bench_scan_plain, bench_scan_crypto);

criterion_main!(benches);
