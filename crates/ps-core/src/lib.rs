//! playshield Core Library
//!
//! This crate provides the rule model and the matching engine for the
//! playshield content blocker.
//!
//! # Architecture
//!
//! Filter lists are parsed (by `ps-compiler`) into typed [`Rule`]s and
//! collected into an immutable [`RuleSet`]. A [`Matcher`] answers the two
//! host queries against a rule set: whether an outgoing request should be
//! blocked, and which CSS selectors should be hidden on a page.
//!
//! # Modules
//!
//! - `types`: Rule model, match options and results
//! - `ruleset`: Immutable, queryable collection of rules
//! - `matcher`: Request and cosmetic matching
//! - `url`: Host extraction without allocations

pub mod types;
pub mod url;
pub mod ruleset;
pub mod matcher;

// Re-export commonly used types
pub use matcher::{CosmeticMatchResult, Matcher};
pub use ruleset::RuleSet;
pub use types::{DomainScope, ListRule, MatchDecision, MatchOptions, MatchResult, Rule};
