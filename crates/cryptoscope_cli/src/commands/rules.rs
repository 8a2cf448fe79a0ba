//! Rules command - lists the builtin detection rules by bundle.

use console::style;
use cryptoscope_core::prelude::*;
use cryptoscope_core::{Parameter, RuleValue};
use cryptoscope_rules::{Bundle, BundleRegistry};

use crate::scanning::load_rules;
use crate::ui::{colors, print_command_header, print_hint, truncate_with_ellipsis};

const ID_WIDTH: usize = 28;
const METHODS_WIDTH: usize = 40;

/// Lists builtin rules grouped by bundle, optionally restricted to one
/// bundle, with chaining details when `verbose` is set.
pub fn run(bundle_filter: Option<&str>, verbose: bool) -> super::Result {
    print_command_header("rules");

    let registry = BundleRegistry::builtin();
    let rules = load_rules(&Config::default())?;
    let bundles = filter_bundles(registry.bundles(), bundle_filter);

    if bundles.is_empty() {
        print_no_matches(bundle_filter);
        return Ok(());
    }

    let entry_count: usize = bundles.iter().map(|b| b.rules().len()).sum();
    println!(
        "{}",
        colors::muted().apply_to(format!("{entry_count} entry rules · {} bundles", bundles.len()))
    );

    for bundle in bundles {
        print_bundle(*bundle, &rules, verbose);
    }

    println!();
    Ok(())
}

fn filter_bundles<'a>(bundles: &'a [&'static dyn Bundle], filter: Option<&str>) -> Vec<&'a &'static dyn Bundle> {
    bundles
        .iter()
        .filter(|bundle| filter.is_none_or(|f| bundle.id().eq_ignore_ascii_case(f)))
        .collect()
}

fn print_no_matches(filter: Option<&str>) {
    match filter {
        Some(bundle) => {
            println!(
                "{} {} {}",
                colors::muted().apply_to("○"),
                colors::secondary().apply_to("no bundle matches"),
                colors::emphasis().apply_to(format!("--bundle {bundle}"))
            );
            println!();
            print_hint("cryptoscope rules", "list every bundle");
            println!();
        }
        None => println!(
            "{} {}",
            colors::muted().apply_to("○"),
            colors::secondary().apply_to("no rules")
        ),
    }
}

fn print_bundle(bundle: &dyn Bundle, rules: &RuleSet, verbose: bool) {
    println!();
    println!(
        "{} {}",
        style(bundle.id()).bold(),
        colors::muted().apply_to(bundle.name())
    );

    for def in bundle.rules() {
        let Some(rule) = rules.find(def.id).map(|id| rules.get(id)) else {
            continue;
        };

        if verbose {
            print_rule_verbose(rule, rules);
        } else {
            print_rule_row(rule);
        }
    }
}

fn print_rule_row(rule: &Rule) {
    println!(
        "  {} {} {}",
        colors::accent().apply_to(format!("{:<ID_WIDTH$}", rule.id)),
        colors::secondary().apply_to(format!(
            "{:<METHODS_WIDTH$}",
            truncate_with_ellipsis(&rule.methods.join(", "), METHODS_WIDTH)
        )),
        colors::muted().apply_to(rule.context.name())
    );
}

fn print_rule_verbose(rule: &Rule, rules: &RuleSet) {
    println!();
    println!(
        "  {} {}",
        colors::accent().bold().apply_to(&rule.id),
        colors::muted().apply_to(format!("· {}", rule.context.name()))
    );

    print_field("targets", &list_or_any(&rule.targets));
    print_field("methods", &rule.methods.join(", "));
    print_field("value", &describe_value(&rule.value));

    for (key, value) in &rule.metadata {
        print_field(key, value);
    }

    for parameter in &rule.parameters {
        print_field(&format!("arg {}", parameter.index()), &describe_parameter(parameter, rules));
    }

    if !rule.dependents.is_empty() {
        print_field("chains", &rule_names(&rule.dependents, rules));
    }
}

fn print_field(label: &str, value: &str) {
    println!(
        "    {} {}",
        colors::muted().apply_to(format!("{label:<9}")),
        colors::secondary().apply_to(value)
    );
}

fn list_or_any(items: &[String]) -> String {
    if items.is_empty() {
        "any".to_string()
    } else {
        items.join(", ")
    }
}

fn describe_value(value: &RuleValue) -> String {
    match value {
        RuleValue::None => "-".to_string(),
        RuleValue::Constant(value) => value.clone(),
        RuleValue::MemberName => "matched name".to_string(),
    }
}

fn describe_parameter(parameter: &Parameter, rules: &RuleSet) -> String {
    match parameter {
        Parameter::Plain { type_name, .. } => type_name.clone(),
        Parameter::Detectable { type_name, kind, .. } => format!("{type_name} → {kind}"),
        Parameter::Dependent {
            type_name,
            rules: dependents,
            ..
        } => format!("{type_name} ⇒ {}", rule_names(dependents, rules)),
    }
}

fn rule_names(ids: &[cryptoscope_core::RuleId], rules: &RuleSet) -> String {
    ids.iter()
        .map(|&id| rules.get(id).id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_filter_is_case_insensitive() {
        let registry = BundleRegistry::builtin();
        let found = filter_bundles(registry.bundles(), Some("TLS"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "tls");
    }

    #[test]
    fn unknown_bundle_matches_nothing() {
        let registry = BundleRegistry::builtin();
        assert!(filter_bundles(registry.bundles(), Some("blowfish")).is_empty());
        assert_eq!(filter_bundles(registry.bundles(), None).len(), registry.bundles().len());
    }

    #[test]
    fn dependent_parameters_name_their_rules() {
        let rules = RuleSet::builtin().unwrap();
        let hmac = rules.get(rules.find("hmac/new").unwrap());
        let described: Vec<_> = hmac.parameters.iter().map(|p| describe_parameter(p, &rules)).collect();
        assert!(described.iter().any(|d| d.contains("⇒") && d.contains("hash/sha256")));
    }

    #[test]
    fn values_describe_their_source() {
        assert_eq!(describe_value(&RuleValue::None), "-");
        assert_eq!(describe_value(&RuleValue::Constant("AES".into())), "AES");
        assert_eq!(describe_value(&RuleValue::MemberName), "matched name");
        assert_eq!(list_or_any(&[]), "any");
    }
}
