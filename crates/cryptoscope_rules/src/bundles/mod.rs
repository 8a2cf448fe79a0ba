//! Builtin rule bundles for the Go standard cryptography packages.

mod aes;
mod cipher;
mod des;
mod dsa;
mod ecdsa;
mod ed25519;
mod elliptic;
mod hash;
mod hkdf;
mod hmac;
mod pbkdf2;
mod rand;
mod rsa;
mod tls;

pub use tls::CIPHER_SUITES;

use crate::bundle::Bundle;

/// Returns all builtin bundles, one per Go package family.
#[must_use]
pub fn builtin_bundles() -> Vec<&'static dyn Bundle> {
    vec![
        // Symmetric ciphers
        &aes::AesBundle,
        &des::DesBundle,
        // Asymmetric keys and signatures
        &dsa::DsaBundle,
        &ecdsa::EcdsaBundle,
        &ed25519::Ed25519Bundle,
        &elliptic::EllipticBundle,
        &rsa::RsaBundle,
        // Digests, MACs and KDFs
        &hash::HashBundle,
        &hkdf::HkdfBundle,
        &hmac::HmacBundle,
        &pbkdf2::Pbkdf2Bundle,
        // Randomness
        &rand::RandBundle,
        // Protocols
        &tls::TlsBundle,
    ]
}
