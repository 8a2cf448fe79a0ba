use thiserror::Error;

/// Errors raised when a rule definition is malformed.
///
/// Rules are validated once, when the rule set is compiled. Matching and
/// resolution never fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The rule tags no value and declares no parameters.
    #[error("rule '{id}' has neither a value nor parameters")]
    NoValueOrParameters {
        /// Identifier of the offending rule.
        id: String,
    },

    /// The rule names no methods to match.
    #[error("rule '{id}' declares no methods")]
    NoMethods {
        /// Identifier of the offending rule.
        id: String,
    },

    /// A parameter is marked both detectable and dependent.
    #[error("parameter {index} of rule '{id}' is both detectable and dependent")]
    DetectableAndDependent {
        /// Identifier of the offending rule.
        id: String,
        /// Argument position of the parameter.
        index: usize,
    },

    /// A dependent parameter lists no rules.
    #[error("parameter {index} of rule '{id}' depends on an empty rule list")]
    EmptyDependents {
        /// Identifier of the offending rule.
        id: String,
        /// Argument position of the parameter.
        index: usize,
    },

    /// A dependent rule id does not name any known rule.
    #[error("rule '{id}' depends on unknown rule '{dependent}'")]
    UnknownDependent {
        /// Identifier of the offending rule.
        id: String,
        /// The unresolved dependent rule id.
        dependent: String,
    },

    /// Two parameters claim the same argument position.
    #[error("rule '{id}' declares argument {index} twice")]
    DuplicateIndex {
        /// Identifier of the offending rule.
        id: String,
        /// The repeated argument position.
        index: usize,
    },

    /// Two rules share one identifier.
    #[error("rule id '{id}' is declared more than once")]
    DuplicateId {
        /// The repeated rule id.
        id: String,
    },
}

/// Errors raised while parsing Go source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The Go grammar could not be loaded into the parser.
    #[error("failed to load the Go grammar: {0}")]
    Language(String),

    /// The parser returned no tree.
    #[error("parsing was cancelled before a tree was produced")]
    Cancelled,
}

/// Top-level error type for the cryptoscope pipeline.
///
/// Unifies rule validation, parsing and configuration errors for callers
/// that orchestrate a full scan.
#[derive(Debug, Error)]
pub enum CryptoscopeError {
    /// A rule failed validation.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// A source file could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration could not be read, parsed, or written.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}
