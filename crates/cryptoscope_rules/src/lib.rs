//! Declarative cryptography detection rules for cryptoscope.
//!
//! This crate holds rule definitions as static data. A rule names the Go
//! package and function it targets, how each argument is interpreted, and
//! which further rules may chain from it. The engine in `cryptoscope_core`
//! validates and compiles these definitions before matching.

mod bundle;
/// Builtin rule bundles organised by Go package.
pub mod bundles;
mod registry;
mod rule;

pub use bundle::Bundle;
pub use registry::BundleRegistry;
pub use rule::{ContextKind, ParamDef, ParseContextError, ParseValueKindError, RuleDef, SizeUnit, ValueDef, ValueKind};

/// Bundle name stamped on every builtin rule.
pub const BUNDLE_NAME: &str = "GoCrypto";
