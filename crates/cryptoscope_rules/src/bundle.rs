//! Bundle trait for rule definitions.

use crate::rule::RuleDef;

/// A group of detection rules for one Go package family.
///
/// `rules` returns the entry rules only. Rules reachable solely through
/// chaining (cipher modes behind `aes.NewCipher`, curves behind
/// `ecdsa.GenerateKey`) are referenced from the entry rules' dependents.
pub trait Bundle: Send + Sync {
    /// Returns the unique identifier for this bundle (e.g. `"aes"`).
    fn id(&self) -> &'static str;

    /// Returns the human-readable display name (e.g. `"crypto/aes"`).
    fn name(&self) -> &'static str;

    /// Returns the entry rules this bundle contributes.
    fn rules(&self) -> &'static [&'static RuleDef];
}

/// Generates a `Bundle` implementation for a static list of entry rules.
///
/// Creates a unit struct, implements `Bundle` for it, and emits basic tests
/// asserting the bundle has rules and every rule is well-formed enough to
/// be compiled.
#[macro_export]
macro_rules! declare_bundle {
    (
        $struct_name:ident,
        id: $id:expr,
        name: $display_name:expr,
        rules: [$($rule:expr),+ $(,)?] $(,)?
    ) => {
        static ENTRY_RULES: &[&$crate::RuleDef] = &[$($rule),+];

        #[doc = concat!("Detection rule bundle for `", $display_name, "`.")]
        #[derive(Debug)]
        pub struct $struct_name;

        impl $crate::Bundle for $struct_name {
            fn id(&self) -> &'static str {
                $id
            }

            fn name(&self) -> &'static str {
                $display_name
            }

            fn rules(&self) -> &'static [&'static $crate::RuleDef] {
                ENTRY_RULES
            }
        }

        #[cfg(test)]
        mod bundle_tests {
            use $crate::Bundle as _;

            use super::*;

            #[test]
            fn bundle_has_rules() {
                assert!(!$struct_name.rules().is_empty());
            }

            #[test]
            fn all_rules_name_methods() {
                for rule in $struct_name.rules() {
                    assert!(!rule.methods.is_empty(), "{} has no methods", rule.id);
                }
            }

            #[test]
            fn all_rules_carry_value_or_parameters() {
                for rule in $struct_name.rules() {
                    assert!(
                        rule.value != $crate::ValueDef::None || !rule.parameters.is_empty(),
                        "{} has neither value nor parameters",
                        rule.id
                    );
                }
            }
        }
    };
}
