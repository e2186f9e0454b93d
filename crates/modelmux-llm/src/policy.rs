//! Ordered tag-to-model rules
//!
//! The policy is data: a list of rules evaluated in order, first match wins.
//! Each rule names the backend it targets, a default symbol and optional
//! variants selected by secondary tags.

use modelmux_config::BackendKind;

use crate::types::TagSet;

/// When a rule applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// The request carries at least one of these tags
    AnyTag(Vec<String>),
    /// Always matches; used for the final catch-all rule
    Always,
}

impl Trigger {
    pub fn matches(&self, tags: &TagSet) -> bool {
        match self {
            Self::AnyTag(wanted) => wanted.iter().any(|tag| tags.contains(tag)),
            Self::Always => true,
        }
    }
}

/// Secondary tag that swaps the rule's default symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub tag: String,
    pub symbol: String,
}

impl Variant {
    pub fn new(tag: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            symbol: symbol.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Name reported in selections and logs
    pub name: String,
    pub trigger: Trigger,
    pub backend: BackendKind,
    /// Checked in order; the first variant whose tag is present wins
    pub variants: Vec<Variant>,
    pub default_symbol: String,
}

impl Rule {
    /// Symbol this rule selects for `tags`, assuming the trigger matched
    pub fn symbol_for(&self, tags: &TagSet) -> &str {
        self.variants
            .iter()
            .find(|variant| tags.contains(&variant.tag))
            .map_or(self.default_symbol.as_str(), |variant| variant.symbol.as_str())
    }

    /// Every symbol this rule can produce
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.default_symbol.as_str()).chain(self.variants.iter().map(|v| v.symbol.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPolicy {
    rules: Vec<Rule>,
}

impl RoutingPolicy {
    pub const fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The built-in policy
    ///
    /// 1. `claude` or `premium` go to the hosted backend, `code` picks the
    ///    code-tuned hosted model.
    /// 2. `code`, `refactor` or `tests` go to a local code model; `alt`,
    ///    `alt2` and `alt3` (checked in that order) pick alternates.
    /// 3. Everything else goes to the local general model.
    pub fn standard() -> Self {
        Self::new(vec![
            Rule {
                name: "premium".to_owned(),
                trigger: Trigger::AnyTag(vec!["claude".to_owned(), "premium".to_owned()]),
                backend: BackendKind::Hosted,
                variants: vec![Variant::new("code", "claude_code")],
                default_symbol: "claude_general".to_owned(),
            },
            Rule {
                name: "code".to_owned(),
                trigger: Trigger::AnyTag(vec!["code".to_owned(), "refactor".to_owned(), "tests".to_owned()]),
                backend: BackendKind::Local,
                variants: vec![
                    Variant::new("alt", "code_ds"),
                    Variant::new("alt2", "code_cl"),
                    Variant::new("alt3", "code_sc"),
                ],
                default_symbol: "code_qwen".to_owned(),
            },
            Rule {
                name: "general".to_owned(),
                trigger: Trigger::Always,
                backend: BackendKind::Local,
                variants: Vec::new(),
                default_symbol: "general_local".to_owned(),
            },
        ])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> TagSet {
        list.iter().copied().collect()
    }

    #[test]
    fn standard_policy_ends_with_catch_all() {
        let policy = RoutingPolicy::standard();
        assert_eq!(policy.rules().last().unwrap().trigger, Trigger::Always);
    }

    #[test]
    fn first_matching_variant_wins() {
        let policy = RoutingPolicy::standard();
        let code = &policy.rules()[1];
        assert_eq!(code.symbol_for(&tags(&["code", "alt3", "alt2"])), "code_cl");
        assert_eq!(code.symbol_for(&tags(&["code", "alt3", "alt"])), "code_ds");
        assert_eq!(code.symbol_for(&tags(&["tests"])), "code_qwen");
    }

    #[test]
    fn symbols_lists_default_and_variants() {
        let policy = RoutingPolicy::standard();
        let symbols: Vec<_> = policy.rules()[1].symbols().collect();
        assert_eq!(symbols, vec!["code_qwen", "code_ds", "code_cl", "code_sc"]);
    }

    #[test]
    fn any_tag_trigger() {
        let trigger = Trigger::AnyTag(vec!["claude".to_owned(), "premium".to_owned()]);
        assert!(trigger.matches(&tags(&["premium"])));
        assert!(!trigger.matches(&tags(&["code"])));
        assert!(!trigger.matches(&TagSet::new()));
    }
}
