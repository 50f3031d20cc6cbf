use serde::{Deserialize, Serialize};

use ps_core::types::{DomainScope, Rule};

/// What to do with `#@#` cosmetic exception lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionPolicy {
    /// Keep the line as a global cosmetic rule whose selector is the whole line.
    #[default]
    Literal,
    /// Skip the line.
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub exceptions: ExceptionPolicy,
}

/// Classification of a single (trimmed) filter-list line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    /// `! comment` or `[Adblock Plus 2.0]`
    Comment,
    Network,
    Cosmetic,
    Hosts,
    /// Fits no classification; dropped
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseStats {
    pub lines: usize,
    pub comments: usize,
    pub network: usize,
    pub cosmetic: usize,
    pub hosts: usize,
    pub skipped: usize,
}

impl ParseStats {
    /// Domain, pattern and hosts rules together.
    pub fn network_rules(&self) -> usize {
        self.network + self.hosts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedList {
    pub rules: Vec<Rule>,
    pub stats: ParseStats,
}

const NULL_ADDRESSES: [&str; 2] = ["0.0.0.0", "127.0.0.1"];

pub fn parse_filter_list(text: &str) -> Vec<Rule> {
    parse_filter_list_with(text, &ParseOptions::default()).rules
}

pub fn parse_filter_list_with(text: &str, options: &ParseOptions) -> ParsedList {
    let mut rules = Vec::new();
    let mut stats = ParseStats::default();

    for raw_line in text.lines() {
        stats.lines += 1;
        let line = raw_line.trim_start_matches('\u{feff}').trim();

        match classify_line(line) {
            LineKind::Blank => {}
            LineKind::Comment => stats.comments += 1,
            LineKind::Network => {
                let rule = parse_network_filter(line);
                if rule.needle().map_or(true, str::is_empty) {
                    stats.skipped += 1;
                    continue;
                }
                stats.network += 1;
                rules.push(rule);
            }
            LineKind::Cosmetic => {
                if options.exceptions == ExceptionPolicy::Drop && line.contains("#@#") {
                    stats.skipped += 1;
                    continue;
                }
                stats.cosmetic += 1;
                rules.push(parse_cosmetic_filter(line));
            }
            LineKind::Hosts => match parse_hosts_line(line) {
                Some(rule) => {
                    stats.hosts += 1;
                    rules.push(rule);
                }
                None => stats.skipped += 1,
            },
            LineKind::Unknown => stats.skipped += 1,
        }
    }

    log::trace!(
        "parsed {} lines: {} network, {} cosmetic, {} hosts, {} skipped",
        stats.lines,
        stats.network,
        stats.cosmetic,
        stats.hosts,
        stats.skipped
    );

    ParsedList { rules, stats }
}

/// Classify a trimmed line. Network checks run before cosmetic checks, which
/// run before the hosts check, so `example.com##div[id$="ad"]` is a network line.
pub fn classify_line(line: &str) -> LineKind {
    if line.is_empty() {
        return LineKind::Blank;
    }
    if is_comment_line(line) {
        return LineKind::Comment;
    }
    if line.starts_with("||") || line.contains('$') {
        return LineKind::Network;
    }
    if line.contains("##") || line.contains("#@#") {
        return LineKind::Cosmetic;
    }
    if is_hosts_line(line) {
        return LineKind::Hosts;
    }
    LineKind::Unknown
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('!') || line.starts_with('[')
}

fn is_hosts_line(line: &str) -> bool {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(address), Some(_), None) => NULL_ADDRESSES.contains(&address),
        _ => false,
    }
}

/// `||host/path^$opts` becomes a domain rule on `host`; anything else is a
/// URL pattern kept verbatim.
pub fn parse_network_filter(line: &str) -> Rule {
    match line.strip_prefix("||") {
        Some(rest) => {
            let domain = rest.split('/').next().unwrap_or_default();
            let domain = domain.split('^').next().unwrap_or_default();
            Rule::DomainBlock {
                domain: domain.to_string(),
                raw_pattern: line.to_string(),
            }
        }
        None => Rule::PatternBlock {
            pattern: line.to_string(),
        },
    }
}

/// `scope##selector` or `##selector`. Anything that does not split into
/// exactly two parts becomes a global rule whose selector is the whole line.
pub fn parse_cosmetic_filter(line: &str) -> Rule {
    let parts: Vec<&str> = line.split("##").collect();
    if let [scope, selector] = parts.as_slice() {
        let scope = if scope.is_empty() {
            DomainScope::Any
        } else {
            DomainScope::Host((*scope).to_string())
        };
        return Rule::CosmeticHide {
            scope,
            selector: (*selector).to_string(),
        };
    }

    Rule::CosmeticHide {
        scope: DomainScope::Any,
        selector: line.to_string(),
    }
}

/// `0.0.0.0 domain` / `127.0.0.1 domain`.
pub fn parse_hosts_line(line: &str) -> Option<Rule> {
    if !is_hosts_line(line) {
        return None;
    }
    let domain = line.split_whitespace().nth(1)?;
    Some(Rule::HostBlock {
        domain: domain.to_string(),
    })
}
