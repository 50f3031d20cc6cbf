//! Rule set builder
//!
//! Collects parsed lists in source order and produces one immutable
//! [`RuleSet`]. Rules keep the order of their list, and lists keep the
//! order they were added in.

use ps_core::ruleset::RuleSet;
use ps_core::types::{ListRule, MatchOptions};

use crate::parser::{parse_filter_list_with, ParseOptions, ParseStats};

/// Per-list parse statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListStats {
    pub list_id: u16,
    pub name: String,
    pub stats: ParseStats,
}

pub struct RuleSetBuilder {
    options: ParseOptions,
    rules: Vec<ListRule>,
    lists: Vec<ListStats>,
}

impl RuleSetBuilder {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            rules: Vec::new(),
            lists: Vec::new(),
        }
    }

    /// Parse `text` and append its rules, tagged with `list_id`.
    pub fn add_list(&mut self, list_id: u16, name: &str, text: &str) -> &ListStats {
        let parsed = parse_filter_list_with(text, &self.options);

        log::debug!(
            "[{}] {} - {} lines, {} network, {} cosmetic",
            list_id,
            name,
            parsed.stats.lines,
            parsed.stats.network_rules(),
            parsed.stats.cosmetic
        );

        self.rules
            .extend(parsed.rules.into_iter().map(|rule| ListRule { rule, list_id }));
        self.lists.push(ListStats {
            list_id,
            name: name.to_string(),
            stats: parsed.stats,
        });

        &self.lists[self.lists.len() - 1]
    }

    pub fn lists(&self) -> &[ListStats] {
        &self.lists
    }

    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    /// Finish the set. Returns the rules together with per-list statistics.
    pub fn build(self, options: MatchOptions) -> (RuleSet, Vec<ListStats>) {
        (RuleSet::new(self.rules, options), self.lists)
    }
}

impl Default for RuleSetBuilder {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use ps_core::matcher::Matcher;
    use ps_core::types::{MatchDecision, MatchOptions};

    use super::RuleSetBuilder;

    #[test]
    fn builds_rules_in_list_order() {
        let mut builder = RuleSetBuilder::default();
        builder.add_list(0, "first", "||ads.example.com^\n##.first");
        builder.add_list(3, "second", "0.0.0.0 tracker.example.com\n##.second");
        assert_eq!(builder.list_count(), 2);

        let (rules, lists) = builder.build(MatchOptions::empty());
        assert_eq!(rules.network_len(), 2);
        assert_eq!(rules.cosmetic_len(), 2);
        assert_eq!(lists[1].list_id, 3);
        assert_eq!(lists[1].stats.hosts, 1);

        let matcher = Matcher::new(&rules);
        let result = matcher.match_request("http://tracker.example.com/pixel.gif");
        assert_eq!(result.decision, MatchDecision::Block);
        assert_eq!(result.list_id, 3);

        let selectors = matcher.match_cosmetic("example.com").selectors;
        assert_eq!(selectors, vec![".first", ".second"]);
    }

    #[test]
    fn building_twice_is_identical() {
        let text = "||a.example^\n0.0.0.0 b.example\nc.example##.d\n##.e\n! comment";

        let mut first = RuleSetBuilder::default();
        first.add_list(0, "list", text);
        let mut second = RuleSetBuilder::default();
        second.add_list(0, "list", text);

        assert_eq!(
            first.build(MatchOptions::empty()),
            second.build(MatchOptions::empty())
        );
    }

    #[test]
    fn returns_stats_for_added_list() {
        let mut builder = RuleSetBuilder::default();
        let stats = builder.add_list(0, "hosts", "# hosts file\n0.0.0.0 a.example\n127.0.0.1 b.example");
        assert_eq!(stats.stats.hosts, 2);
        assert_eq!(stats.stats.skipped, 1);
        assert_eq!(stats.name, "hosts");
    }
}
