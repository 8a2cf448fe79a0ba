//! Convenience re-exports of the most commonly used types.

pub use crate::config::{Config, ConfigError};
pub use crate::error::{CryptoscopeError, ParseError, RuleError};
pub use crate::finding::{Finding, FindingId};
pub use crate::mapper::{Asset, AssetKind};
pub use crate::rule::{Rule, RuleSet};
pub use crate::scanner::Scanner;
pub use crate::tree::Span;
