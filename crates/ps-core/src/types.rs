//! Core type definitions for playshield
//!
//! These types are produced by the filter-list parser and consumed by the
//! matching engine.

// =============================================================================
// Rules
// =============================================================================

/// Where a cosmetic rule applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomainScope {
    /// `##selector` - applies on every host
    Any,
    /// `host##selector` - applies when `host` is a substring of the page hostname
    Host(String),
}

impl DomainScope {
    /// Check whether this scope covers the given page hostname.
    #[inline]
    pub fn applies_to(&self, hostname: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Host(scope) => hostname.contains(scope.as_str()),
        }
    }
}

/// A single parsed filter rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rule {
    /// `||domain^...` - blocks URLs containing `domain`
    DomainBlock { domain: String, raw_pattern: String },
    /// `0.0.0.0 domain` - hosts-file entry
    HostBlock { domain: String },
    /// Any other network filter, matched as a URL substring
    PatternBlock { pattern: String },
    /// `scope##selector` - element hiding
    CosmeticHide { scope: DomainScope, selector: String },
}

impl Rule {
    /// Domain, host and pattern rules act on network requests.
    #[inline]
    pub fn is_network(&self) -> bool {
        !matches!(self, Self::CosmeticHide { .. })
    }

    #[inline]
    pub fn is_cosmetic(&self) -> bool {
        matches!(self, Self::CosmeticHide { .. })
    }

    /// The fragment a network rule looks for in a request URL.
    pub fn needle(&self) -> Option<&str> {
        match self {
            Self::DomainBlock { domain, .. } | Self::HostBlock { domain } => Some(domain.as_str()),
            Self::PatternBlock { pattern } => Some(pattern.as_str()),
            Self::CosmeticHide { .. } => None,
        }
    }

    /// Domain of a domain or host rule.
    pub fn domain(&self) -> Option<&str> {
        match self {
            Self::DomainBlock { domain, .. } | Self::HostBlock { domain } => Some(domain.as_str()),
            _ => None,
        }
    }
}

/// A rule tagged with the list it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListRule {
    pub rule: Rule,
    /// Position of the source list in load order
    pub list_id: u16,
}

// =============================================================================
// Match Options
// =============================================================================

bitflags::bitflags! {
    /// Flags controlling how a rule set answers queries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MatchOptions: u8 {
        /// Domain and host rules match the URL host (or a parent of it)
        /// instead of any substring of the URL
        const HOSTNAME_ANCHORED = 1 << 0;
        /// Drop repeated selectors from cosmetic results
        const DEDUPE_SELECTORS = 1 << 1;
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Match Result
// =============================================================================

/// Final decision for a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDecision {
    /// No network rule matched
    Allow,
    /// A network rule matched
    Block,
}

/// Result of matching a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// The final decision for this request
    pub decision: MatchDecision,
    /// Index of the first matching network rule, -1 if none (for logging)
    pub rule_id: i32,
    /// List the rule came from (for logging)
    pub list_id: u16,
}

impl MatchResult {
    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.decision == MatchDecision::Block
    }
}

impl Default for MatchResult {
    fn default() -> Self {
        Self {
            decision: MatchDecision::Allow,
            rule_id: -1,
            list_id: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_applies_to() {
        assert!(DomainScope::Any.applies_to("anything.example"));
        let scope = DomainScope::Host("youtube.com".to_string());
        assert!(scope.applies_to("music.youtube.com"));
        assert!(!scope.applies_to("example.com"));
    }

    #[test]
    fn test_rule_needle() {
        let rule = Rule::DomainBlock {
            domain: "ads.example.com".to_string(),
            raw_pattern: "||ads.example.com^".to_string(),
        };
        assert_eq!(rule.needle(), Some("ads.example.com"));
        assert!(rule.is_network());

        let cosmetic = Rule::CosmeticHide {
            scope: DomainScope::Any,
            selector: ".ad".to_string(),
        };
        assert_eq!(cosmetic.needle(), None);
        assert!(cosmetic.is_cosmetic());
    }
}
