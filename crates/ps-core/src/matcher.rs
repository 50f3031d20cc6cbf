//! Core Matching Engine
//!
//! Every intercepted request and every page navigation goes through here.
//! Queries are read-only over an immutable [`RuleSet`].

use std::collections::HashSet;
use std::fmt::Write;

use crate::ruleset::{cosmetic_parts, RuleSet};
use crate::types::{MatchDecision, MatchOptions, MatchResult};
use crate::url::{extract_host, walk_host_suffixes};

// =============================================================================
// Matcher
// =============================================================================

/// The core matching engine.
pub struct Matcher<'a> {
    rules: &'a RuleSet,
}

/// Selectors to hide on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CosmeticMatchResult {
    pub selectors: Vec<String>,
}

impl CosmeticMatchResult {
    /// Render the selectors as a stylesheet for injection.
    ///
    /// Each selector gets its own rule, so one selector the page's CSS
    /// engine rejects does not invalidate the rest.
    pub fn stylesheet(&self) -> String {
        let mut css = String::with_capacity(self.selectors.len() * 48);
        for selector in &self.selectors {
            let _ = writeln!(css, "{} {{ display: none !important; }}", selector);
        }
        css
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl<'a> Matcher<'a> {
    /// Create a new matcher over the given rule set.
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Match a request URL and return the decision.
    pub fn match_request(&self, url: &str) -> MatchResult {
        let lowered = url.to_lowercase();

        let hit = if self.rules.options.contains(MatchOptions::HOSTNAME_ANCHORED) {
            self.first_anchored_match(&lowered)
        } else {
            self.first_substring_match(&lowered)
        };

        match hit {
            Some(idx) => MatchResult {
                decision: MatchDecision::Block,
                rule_id: idx as i32,
                list_id: self.rules.network[idx].rule.list_id,
            },
            None => MatchResult::default(),
        }
    }

    /// Whether a request to `url` should be cancelled.
    #[inline]
    pub fn should_block(&self, url: &str) -> bool {
        self.match_request(url).is_blocked()
    }

    /// Collect the selectors to hide on `hostname`, in rule order.
    pub fn match_cosmetic(&self, hostname: &str) -> CosmeticMatchResult {
        let dedupe = self.rules.options.contains(MatchOptions::DEDUPE_SELECTORS);
        let mut seen: HashSet<&str> = HashSet::new();
        let mut selectors = Vec::new();

        for rule in &self.rules.cosmetic {
            let Some((scope, selector)) = cosmetic_parts(rule) else {
                continue;
            };
            if !scope.applies_to(hostname) {
                continue;
            }
            if dedupe && !seen.insert(selector) {
                continue;
            }
            selectors.push(selector.to_string());
        }

        CosmeticMatchResult { selectors }
    }

    /// Linear scan: the first rule whose needle occurs anywhere in the URL.
    fn first_substring_match(&self, lowered: &str) -> Option<usize> {
        self.rules
            .network
            .iter()
            .position(|entry| lowered.contains(entry.needle.as_str()))
    }

    /// Domain rules match the host or one of its parents, pattern rules
    /// still match anywhere in the URL. Returns the lowest matching index.
    fn first_anchored_match(&self, lowered: &str) -> Option<usize> {
        let best_domain = extract_host(lowered).and_then(|host| {
            walk_host_suffixes(host)
                .filter_map(|suffix| self.rules.domain_index.get(suffix).copied())
                .min()
        });

        for &idx in &self.rules.pattern_ids {
            if best_domain.is_some_and(|best| idx > best) {
                break;
            }
            if lowered.contains(self.rules.network[idx as usize].needle.as_str()) {
                return Some(idx as usize);
            }
        }

        best_domain.map(|idx| idx as usize)
    }
}
