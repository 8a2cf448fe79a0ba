//! Detection engine for cryptography usage in Go source.
//!
//! Go files are parsed with tree-sitter and lowered into a small closed
//! [`Tree`]. Declarative rules from `cryptoscope_rules` are matched against
//! its call sites and references, constant arguments are resolved through
//! local data flow, and matches chain into one another when the result of
//! one call flows into the next. The resulting [`DetectionStore`] forest is
//! mapped into [`Asset`] trees and reported as [`Finding`]s.
//!
//! # Main Types
//!
//! - [`Scanner`] - Runs the whole pipeline over one file's content
//! - [`RuleSet`] - Validated, compiled rules with keyword pre-filtering
//! - [`DetectionEngine`] - Matches rules and chains dependents over a tree
//! - [`Resolver`] - Resolves expressions to the constants they may hold
//! - [`Finding`] - A detected usage with location and asset tree
//! - [`Config`] - User configuration loaded from `.cryptoscope.toml`
//!
//! # Error Handling
//!
//! This crate uses [`thiserror`] for structured, typed errors that library
//! consumers can match on:
//!
//! - [`RuleError`] - Rule validation failures
//! - [`ParseError`] - Go grammar or parser failures
//! - [`ConfigError`] - Configuration loading/parsing failures
//! - [`CryptoscopeError`] - Top-level error enum combining the above
//!
//! Matching and resolution never fail. A capability the language binding
//! lacks is reported as [`Unsupported`] and treated as an empty result.
//!
//! The CLI crate (`cryptoscope_cli`) uses `anyhow` for error propagation.

/// User configuration loaded from `.cryptoscope.toml`.
pub mod config;
/// Rule matching, value capture and rule chaining.
pub mod engine;
/// Error types for rule validation, parsing and configuration.
pub mod error;
/// Reported usages and their stable identifiers.
pub mod finding;
/// Filesystem helpers for atomic writes.
pub mod fs_util;
pub mod go;
/// Language bindings and optional resolution capabilities.
pub mod language;
pub mod mapper;
/// Call-site and reference matching.
pub mod matcher;
/// Common re-exports for internal use.
pub mod prelude;
pub mod resolver;
pub mod rule;
/// The per-file detection driver.
pub mod scanner;
pub mod store;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod tree;

pub use config::{Config, ConfigError, CustomParameter, CustomRule};
pub use engine::{DetectionEngine, InvocationView};
pub use error::{CryptoscopeError, ParseError, RuleError};
pub use finding::{Finding, FindingId};
pub use language::{Capability, GoLanguage, LanguageSupport, LanguageTranslation, Unsupported};
pub use mapper::{Asset, AssetKind, Mapper};
pub use resolver::{ExpectedType, MAX_CANDIDATES, MAX_DEPTH, MAX_STEPS, ResolvedValue, Resolver, Value};
pub use rule::{CUSTOM_BUNDLE, Parameter, Rule, RuleId, RuleSet, RuleValue};
pub use scanner::Scanner;
pub use store::{DetectedValue, DetectionStore, StoreId, StoreNode, ValueSource};
pub use tree::{NodeId, NodeKind, Span, Tree};

/// Default filename for cryptoscope configuration.
pub const CONFIG_FILENAME: &str = ".cryptoscope.toml";
