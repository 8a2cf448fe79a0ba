use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cryptoscope_rules::{ContextKind, ValueKind};
use serde::{Deserialize, Serialize};

/// Project-level configuration loaded from `.cryptoscope.toml`.
///
/// Controls which files are scanned, which builtin rules take part, and any
/// user-declared rules. Every field is optional and defaults to scanning
/// everything with the full builtin catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Glob patterns for file paths to exclude from scanning.
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// Rule IDs to drop from the entry set (e.g. `"rand/read"`), builtin or
    /// custom.
    #[serde(default)]
    pub disabled_rules: Vec<String>,

    /// Bundle IDs whose entry rules are dropped (e.g. `"hash"`). Custom
    /// rules belong to the `"custom"` bundle.
    #[serde(default)]
    pub disabled_bundles: Vec<String>,

    /// Maximum file size in bytes. Larger files are skipped.
    #[serde(default)]
    pub max_file_size: Option<u64>,

    /// Whether `_test.go` files are scanned.
    #[serde(default = "default_true")]
    pub include_tests: bool,

    /// User-declared detection rules.
    #[serde(default)]
    pub custom_rules: Vec<CustomRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_paths: Vec::new(),
            disabled_rules: Vec::new(),
            disabled_bundles: Vec::new(),
            max_file_size: None,
            include_tests: true,
            custom_rules: Vec::new(),
        }
    }
}

const fn default_true() -> bool {
    true
}

/// A user-declared detection rule in `.cryptoscope.toml`.
///
/// Custom rules share the builtin schema but hold owned data and refer to
/// their dependents by rule ID, so they may chain into builtin rules (for
/// example a custom cipher constructor depending on `"cipher/new-gcm"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRule {
    /// Unique identifier, conventionally prefixed with `"custom/"`.
    pub id: String,
    /// Package paths or receiver types the call is made on. Empty matches any.
    #[serde(default)]
    pub targets: Vec<String>,
    /// Function, method or constant names.
    pub methods: Vec<String>,
    /// Fixed value tagged by the rule (e.g. `"ChaCha20"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Tag the matched callee or member name instead of a fixed value.
    #[serde(default)]
    pub value_from_member: bool,
    /// Category of the produced construct.
    pub context: ContextKind,
    /// Argument specifications.
    #[serde(default)]
    pub parameters: Vec<CustomParameter>,
    /// Free-form context metadata (e.g. `kind = "AEAD_BLOCK_CIPHER_MODE"`).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// IDs of rules that may chain from this call's result.
    #[serde(default)]
    pub dependents: Vec<String>,
    /// Whether the rule is matched on its own, or only through chaining.
    #[serde(default = "default_true")]
    pub entry: bool,
}

/// One argument of a [`CustomRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomParameter {
    /// Declared Go type of the argument, or `"*"` for any.
    #[serde(rename = "type", default = "any_type")]
    pub type_name: String,
    /// Argument position. Defaults to the parameter's position in the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Capture the argument's resolved value as this kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detect: Option<ValueKind>,
    /// Match the argument against these rule IDs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends: Option<Vec<String>>,
}

fn any_type() -> String {
    "*".to_string()
}

impl Config {
    /// Creates a default configuration with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a `.cryptoscope.toml` file.
    ///
    /// Returns the default configuration if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = read_file(path)?;
        parse_toml(path, &content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        parse_toml(Path::new("<inline>"), content)
    }

    /// Atomically writes this configuration to a `.cryptoscope.toml` file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serialise_toml(self)?;
        write_file(path, &content)
    }

    /// Serialises this configuration to a pretty-printed TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        serialise_toml(self)
    }

    /// Returns `true` if rules from the given bundle take part in scanning.
    #[must_use]
    pub fn bundle_enabled(&self, bundle: &str) -> bool {
        !self.disabled_bundles.iter().any(|b| b == bundle)
    }

    /// Returns `true` if the given rule is matched on its own.
    #[must_use]
    pub fn rule_enabled(&self, rule: &str) -> bool {
        !self.disabled_rules.iter().any(|r| r == rule)
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    crate::fs_util::atomic_write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_toml(path: &Path, content: &str) -> Result<Config, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn serialise_toml(config: &Config) -> Result<String, ConfigError> {
    toml::to_string_pretty(config).map_err(|source| ConfigError::Serialize { source })
}

/// Errors that can occur when reading, parsing, serialising, or writing
/// a `.cryptoscope.toml` configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read from disk.
    #[error("failed to read config '{path}': {source}")]
    Read {
        /// Path to the config file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file contained invalid TOML or unexpected values.
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        /// Path to the config file that could not be parsed.
        path: PathBuf,
        /// The underlying TOML deserialization error.
        #[source]
        source: toml::de::Error,
    },

    /// The in-memory configuration could not be serialised to TOML.
    #[error("failed to serialise config: {source}")]
    Serialize {
        /// The underlying TOML serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// The config file could not be written to disk.
    #[error("failed to write config '{path}': {source}")]
    Write {
        /// Path to the config file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Returns the file path associated with this error, if any.
    ///
    /// `ConfigError::Serialize` errors have no associated path.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Write { path, .. } => Some(path),
            Self::Serialize { .. } => None,
        }
    }
}
