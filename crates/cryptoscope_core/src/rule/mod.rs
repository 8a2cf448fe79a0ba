//! Compiled detection rules and the rule-set arena.
//!
//! Static [`RuleDef`]s from the builtin catalog and [`CustomRule`]s from
//! configuration are both lowered into owned [`Rule`]s. Dependents are
//! addressed by [`RuleId`], so a rule reachable from several parents (the
//! cipher modes behind both `aes.NewCipher` and `des.NewCipher`) is compiled
//! once and shared.

use std::collections::HashMap;
use std::fmt;

use aho_corasick::AhoCorasick;
use cryptoscope_rules::{BundleRegistry, ContextKind, RuleDef, ValueDef, ValueKind};
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::config::{Config, CustomRule};
use crate::error::RuleError;

/// Index of a rule within its [`RuleSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u32);

impl RuleId {
    /// Returns the arena index of this rule.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a rule's own tagged value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValue {
    /// The rule tags no value of its own.
    None,
    /// A fixed value such as `"AES"`.
    Constant(String),
    /// The matched callee or member name itself.
    MemberName,
}

/// One argument position of a compiled rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    /// Only constrains the call signature.
    Plain {
        /// Argument position.
        index: usize,
        /// Declared Go type, or `"*"` for any.
        type_name: String,
    },
    /// The argument's resolved values are captured.
    Detectable {
        /// Argument position.
        index: usize,
        /// Declared Go type, or `"*"` for any.
        type_name: String,
        /// How resolved values are interpreted.
        kind: ValueKind,
    },
    /// The argument is matched against further rules.
    Dependent {
        /// Argument position.
        index: usize,
        /// Declared Go type, or `"*"` for any.
        type_name: String,
        /// Rules tried against the argument. Never empty.
        rules: Vec<RuleId>,
    },
}

impl Parameter {
    /// Returns the argument position.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Plain { index, .. } | Self::Detectable { index, .. } | Self::Dependent { index, .. } => *index,
        }
    }

    /// Returns the declared Go type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Plain { type_name, .. } | Self::Detectable { type_name, .. } | Self::Dependent { type_name, .. } => {
                type_name
            }
        }
    }
}

/// A validated detection rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Unique identifier (e.g. `"aes/new-cipher"`).
    pub id: String,
    /// Bundle the rule was declared in (e.g. `"aes"`, or `"custom"`).
    pub bundle: String,
    /// Package paths or receiver types the call is made on. Empty matches any.
    pub targets: Vec<String>,
    /// Function, method or constant names.
    pub methods: Vec<String>,
    /// The rule's own tagged value.
    pub value: RuleValue,
    /// Argument specifications, ordered by index.
    pub parameters: Vec<Parameter>,
    /// Category of the produced construct.
    pub context: ContextKind,
    /// Free-form context metadata.
    pub metadata: Vec<(String, String)>,
    /// Rules that may chain from this call's result.
    pub dependents: Vec<RuleId>,
}

impl Rule {
    /// Returns the metadata value stored under `key`.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Returns the number of arguments a call needs to satisfy every
    /// declared parameter.
    #[must_use]
    pub fn required_arguments(&self) -> usize {
        self.parameters.iter().map(|p| p.index() + 1).max().unwrap_or(0)
    }
}

/// A rule before dependent IDs are resolved.
struct Draft {
    id: String,
    bundle: String,
    targets: Vec<String>,
    methods: Vec<String>,
    value: RuleValue,
    parameters: Vec<DraftParameter>,
    context: ContextKind,
    metadata: Vec<(String, String)>,
    dependents: Vec<String>,
}

struct DraftParameter {
    index: usize,
    type_name: String,
    detect: Option<ValueKind>,
    dependents: Option<Vec<String>>,
}

impl Draft {
    fn from_def(def: &RuleDef, bundle: &str) -> Self {
        let value = match def.value {
            ValueDef::None => RuleValue::None,
            ValueDef::Constant(value) => RuleValue::Constant(value.to_string()),
            ValueDef::MemberName => RuleValue::MemberName,
        };

        let parameters = def
            .parameters
            .iter()
            .enumerate()
            .map(|(index, param)| DraftParameter {
                index,
                type_name: param.type_name.to_string(),
                detect: param.detect,
                dependents: (!param.dependents.is_empty())
                    .then(|| param.dependents.iter().map(|d| d.id.to_string()).collect()),
            })
            .collect();

        Self {
            id: def.id.to_string(),
            bundle: bundle.to_string(),
            targets: def.targets.iter().map(ToString::to_string).collect(),
            methods: def.methods.iter().map(ToString::to_string).collect(),
            value,
            parameters,
            context: def.context,
            metadata: def.metadata.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect(),
            dependents: def.dependents.iter().map(|d| d.id.to_string()).collect(),
        }
    }

    fn from_custom(custom: &CustomRule) -> Self {
        let value = match (&custom.value, custom.value_from_member) {
            (_, true) => RuleValue::MemberName,
            (Some(value), false) => RuleValue::Constant(value.clone()),
            (None, false) => RuleValue::None,
        };

        let parameters = custom
            .parameters
            .iter()
            .enumerate()
            .map(|(position, param)| DraftParameter {
                index: param.index.unwrap_or(position),
                type_name: param.type_name.clone(),
                detect: param.detect,
                dependents: param.depends.clone(),
            })
            .collect();

        Self {
            id: custom.id.clone(),
            bundle: CUSTOM_BUNDLE.to_string(),
            targets: custom.targets.clone(),
            methods: custom.methods.clone(),
            value,
            parameters,
            context: custom.context,
            metadata: custom.metadata.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            dependents: custom.dependents.clone(),
        }
    }

    /// Validates the draft and resolves dependent IDs through `lookup`.
    fn compile(self, lookup: &HashMap<String, RuleId>) -> Result<Rule, RuleError> {
        let id = self.id;

        if self.methods.is_empty() {
            return Err(RuleError::NoMethods { id });
        }
        if self.value == RuleValue::None && self.parameters.is_empty() {
            return Err(RuleError::NoValueOrParameters { id });
        }

        let resolve = |names: &[String], id: &str| -> Result<Vec<RuleId>, RuleError> {
            names
                .iter()
                .map(|name| {
                    lookup.get(name).copied().ok_or_else(|| RuleError::UnknownDependent {
                        id: id.to_string(),
                        dependent: name.clone(),
                    })
                })
                .collect()
        };

        let mut parameters = Vec::with_capacity(self.parameters.len());
        for param in self.parameters {
            if parameters.iter().any(|p: &Parameter| p.index() == param.index) {
                return Err(RuleError::DuplicateIndex { id, index: param.index });
            }

            let compiled = match (param.detect, param.dependents) {
                (Some(_), Some(_)) => {
                    return Err(RuleError::DetectableAndDependent { id, index: param.index });
                }
                (None, Some(names)) if names.is_empty() => {
                    return Err(RuleError::EmptyDependents { id, index: param.index });
                }
                (None, Some(names)) => Parameter::Dependent {
                    index: param.index,
                    type_name: param.type_name,
                    rules: resolve(&names, &id)?,
                },
                (Some(kind), None) => Parameter::Detectable {
                    index: param.index,
                    type_name: param.type_name,
                    kind,
                },
                (None, None) => Parameter::Plain {
                    index: param.index,
                    type_name: param.type_name,
                },
            };
            parameters.push(compiled);
        }
        parameters.sort_by_key(Parameter::index);

        let dependents = resolve(&self.dependents, &id)?;

        Ok(Rule {
            id,
            bundle: self.bundle,
            targets: self.targets,
            methods: self.methods,
            value: self.value,
            parameters,
            context: self.context,
            metadata: self.metadata,
            dependents,
        })
    }
}

/// Bundle name recorded on rules declared in configuration.
pub const CUSTOM_BUNDLE: &str = "custom";

/// Arena of compiled rules with a keyword pre-filter.
///
/// The keyword automaton is built over the method names of every entry rule.
/// Because chained rules are only ever tried after an entry rule matched, a
/// source file containing none of those names cannot produce a detection
/// and is never parsed.
pub struct RuleSet {
    rules: Vec<Rule>,
    entry: Vec<RuleId>,
    by_id: HashMap<String, RuleId>,
    keyword_automaton: Option<AhoCorasick>,
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.rules.len())
            .field("entry", &self.entry.len())
            .finish_non_exhaustive()
    }
}

impl RuleSet {
    /// Compiles the full builtin catalog with every bundle enabled.
    pub fn builtin() -> Result<Self, RuleError> {
        Self::compile(&BundleRegistry::builtin(), &Config::default())
    }

    /// Compiles the registry's rules plus any custom rules from `config`.
    ///
    /// Disabled bundles and rules are dropped from the entry set but stay
    /// compiled, so other rules may still chain into them.
    pub fn compile(registry: &BundleRegistry, config: &Config) -> Result<Self, RuleError> {
        let mut bundle_of: HashMap<&str, &str> = HashMap::new();
        for bundle in registry.bundles() {
            for rule in bundle.rules() {
                bundle_of.insert(rule.id, bundle.id());
            }
        }

        let mut drafts = Vec::new();
        let mut entry_ids = Vec::new();
        for def in registry.all_rules() {
            // Chained-only rules take the bundle named by their id prefix.
            let bundle = bundle_of
                .get(def.id)
                .copied()
                .unwrap_or_else(|| def.id.split_once('/').map_or(def.bundle, |(prefix, _)| prefix));
            let is_entry = bundle_of.contains_key(def.id);
            if is_entry && config.bundle_enabled(bundle) && config.rule_enabled(def.id) {
                entry_ids.push(def.id.to_string());
            }
            drafts.push(Draft::from_def(def, bundle));
        }

        for custom in &config.custom_rules {
            if custom.entry && config.bundle_enabled(CUSTOM_BUNDLE) && config.rule_enabled(&custom.id) {
                entry_ids.push(custom.id.clone());
            }
            drafts.push(Draft::from_custom(custom));
        }

        let rule_set = Self::from_drafts(drafts, &entry_ids)?;

        #[cfg(feature = "tracing")]
        debug!(
            rules = rule_set.len(),
            entry = rule_set.entry.len(),
            custom = config.custom_rules.len(),
            "compiled rule set"
        );

        Ok(rule_set)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "rule counts are far below u32::MAX"
    )]
    fn from_drafts(drafts: Vec<Draft>, entry_ids: &[String]) -> Result<Self, RuleError> {
        let mut by_id = HashMap::with_capacity(drafts.len());
        for (index, draft) in drafts.iter().enumerate() {
            if by_id.insert(draft.id.clone(), RuleId(index as u32)).is_some() {
                return Err(RuleError::DuplicateId { id: draft.id.clone() });
            }
        }

        let rules = drafts
            .into_iter()
            .map(|draft| draft.compile(&by_id))
            .collect::<Result<Vec<_>, _>>()?;

        let entry: Vec<RuleId> = entry_ids.iter().filter_map(|id| by_id.get(id).copied()).collect();
        let keyword_automaton = build_automaton(&rules, &entry);

        Ok(Self {
            rules,
            entry,
            by_id,
            keyword_automaton,
        })
    }

    /// Returns the rule with the given id.
    #[must_use]
    pub fn get(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    /// Looks up a rule by its string identifier.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<RuleId> {
        self.by_id.get(id).copied()
    }

    /// Returns the rules matched on their own, in catalog order.
    #[must_use]
    pub fn entry_rules(&self) -> &[RuleId] {
        &self.entry
    }

    /// Iterates over every compiled rule with its id.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "rule counts are far below u32::MAX"
    )]
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules.iter().enumerate().map(|(i, rule)| (RuleId(i as u32), rule))
    }

    /// Returns the total number of compiled rules, chained ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules were compiled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `false` when `content` mentions none of the entry rules'
    /// method names, meaning no detection is possible.
    #[must_use]
    pub fn might_match(&self, content: &str) -> bool {
        self.keyword_automaton
            .as_ref()
            .is_some_and(|automaton| automaton.is_match(content))
    }
}

fn build_automaton(rules: &[Rule], entry: &[RuleId]) -> Option<AhoCorasick> {
    let mut keywords: Vec<&str> = entry
        .iter()
        .flat_map(|id| rules[id.index()].methods.iter().map(String::as_str))
        .collect();
    keywords.sort_unstable();
    keywords.dedup();

    if keywords.is_empty() {
        return None;
    }

    AhoCorasick::builder()
        .match_kind(aho_corasick::MatchKind::LeftmostFirst)
        .build(&keywords)
        .ok()
}
