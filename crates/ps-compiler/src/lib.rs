//! playshield Filter List Compiler
//!
//! This crate turns ABP-style filter lists and hosts files into the typed
//! rules consumed by `ps-core`.

pub mod parser;
pub mod builder;

pub use builder::{ListStats, RuleSetBuilder};
pub use parser::{
    parse_filter_list, parse_filter_list_with, ExceptionPolicy, LineKind, ParseOptions,
    ParseStats, ParsedList,
};
