//! Immutable rule collections
//!
//! A [`RuleSet`] is built once from the rules of every loaded list and never
//! mutated afterwards. Reloading builds a new set and replaces the old one.

use std::collections::HashMap;

use crate::types::{DomainScope, ListRule, MatchOptions, Rule};

/// A network rule with its precomputed comparison needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NetworkEntry {
    pub(crate) rule: ListRule,
    /// Needle as written in the list, compared against the lower-cased URL.
    /// Rules containing upper-case letters therefore never match.
    pub(crate) needle: String,
}

/// Queryable, immutable set of network and cosmetic rules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleSet {
    pub(crate) network: Vec<NetworkEntry>,
    pub(crate) cosmetic: Vec<ListRule>,
    pub(crate) options: MatchOptions,
    /// Domain -> lowest network rule index. Only built for hostname-anchored matching.
    pub(crate) domain_index: HashMap<String, u32>,
    /// Indices of pattern rules, ascending. Only built for hostname-anchored matching.
    pub(crate) pattern_ids: Vec<u32>,
}

impl RuleSet {
    /// Build a rule set, preserving the order rules are yielded in.
    pub fn new<I>(rules: I, options: MatchOptions) -> Self
    where
        I: IntoIterator<Item = ListRule>,
    {
        let mut network = Vec::new();
        let mut cosmetic = Vec::new();
        let mut dropped = 0usize;

        for list_rule in rules {
            match list_rule.rule.needle() {
                Some(needle) if needle.is_empty() => dropped += 1,
                Some(needle) => {
                    let needle = needle.to_string();
                    network.push(NetworkEntry { rule: list_rule, needle });
                }
                None => cosmetic.push(list_rule),
            }
        }

        if dropped > 0 {
            log::debug!("dropped {} network rules with an empty pattern", dropped);
        }

        let mut set = Self {
            network,
            cosmetic,
            options,
            domain_index: HashMap::new(),
            pattern_ids: Vec::new(),
        };

        if options.contains(MatchOptions::HOSTNAME_ANCHORED) {
            set.build_domain_index();
        }

        set
    }

    fn build_domain_index(&mut self) {
        for (idx, entry) in self.network.iter().enumerate() {
            let idx = idx as u32;
            if entry.rule.rule.domain().is_some() {
                let domain = entry.needle.trim_matches('.');
                self.domain_index.entry(domain.to_string()).or_insert(idx);
            } else {
                self.pattern_ids.push(idx);
            }
        }

        log::debug!(
            "indexed {} domains, {} pattern rules",
            self.domain_index.len(),
            self.pattern_ids.len()
        );
    }

    /// Match options this set was built with.
    #[inline]
    pub fn options(&self) -> MatchOptions {
        self.options
    }

    /// Network rules in insertion order.
    pub fn network_rules(&self) -> impl Iterator<Item = &ListRule> + '_ {
        self.network.iter().map(|entry| &entry.rule)
    }

    /// Cosmetic rules in insertion order.
    pub fn cosmetic_rules(&self) -> impl Iterator<Item = &ListRule> + '_ {
        self.cosmetic.iter()
    }

    pub fn network_len(&self) -> usize {
        self.network.len()
    }

    pub fn cosmetic_len(&self) -> usize {
        self.cosmetic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.network.is_empty() && self.cosmetic.is_empty()
    }

    /// Get a network rule by the index reported in a match result.
    pub fn network_rule(&self, rule_id: i32) -> Option<&ListRule> {
        usize::try_from(rule_id)
            .ok()
            .and_then(|idx| self.network.get(idx))
            .map(|entry| &entry.rule)
    }
}

pub(crate) fn cosmetic_parts(rule: &ListRule) -> Option<(&DomainScope, &str)> {
    match &rule.rule {
        Rule::CosmeticHide { scope, selector } => Some((scope, selector.as_str())),
        _ => None,
    }
}
