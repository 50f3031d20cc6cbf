//! Engine configuration
//!
//! Loaded from JSON, e.g.
//!
//! ```json
//! {
//!   "sources": [
//!     { "id": "easylist", "url": "https://easylist.to/easylist/easylist.txt" },
//!     { "id": "local", "file": "/etc/playshield/extra.txt" }
//!   ],
//!   "fetch": { "timeout_secs": 10 },
//!   "matching": { "hostname_anchored": false, "cosmetic_exceptions": "literal" }
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ps_compiler::parser::{ExceptionPolicy, ParseOptions};
use ps_core::types::MatchOptions;

use crate::error::ConfigError;

/// Where a filter list is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLocation {
    /// Fetched with an HTTP(S) GET
    Url(String),
    /// Read from the local filesystem
    File(PathBuf),
    /// List text supplied directly by the host
    Inline(String),
}

/// A filter list the engine loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterListSource {
    /// Must be unique among all sources
    pub id: String,
    #[serde(flatten)]
    pub location: SourceLocation,
}

impl FilterListSource {
    pub fn url(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location: SourceLocation::Url(url.into()),
        }
    }

    pub fn file(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            location: SourceLocation::File(path.into()),
        }
    }

    pub fn inline(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location: SourceLocation::Inline(text.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Extra attempts after a failed request
    pub retries: u32,
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            retries: 0,
            user_agent: concat!("playshield/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Match domain and host rules against the URL host only
    pub hostname_anchored: bool,
    /// Drop repeated selectors from cosmetic results
    pub dedupe_selectors: bool,
    pub cosmetic_exceptions: ExceptionPolicy,
}

impl MatchingConfig {
    pub fn match_options(&self) -> MatchOptions {
        let mut options = MatchOptions::empty();
        options.set(MatchOptions::HOSTNAME_ANCHORED, self.hostname_anchored);
        options.set(MatchOptions::DEDUPE_SELECTORS, self.dedupe_selectors);
        options
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            exceptions: self.cosmetic_exceptions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sources: Vec<FilterListSource>,
    pub fetch: FetchConfig,
    pub matching: MatchingConfig,
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.id.as_str()) {
                return Err(ConfigError::DuplicateSource(source.id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = EngineConfig::from_json_str(
            r###"{
                "sources": [
                    { "id": "easylist", "url": "https://easylist.to/easylist/easylist.txt" },
                    { "id": "local", "file": "/tmp/extra.txt" },
                    { "id": "user", "inline": "##.ad" }
                ],
                "fetch": { "timeout_secs": 5, "retries": 2 },
                "matching": { "hostname_anchored": true, "cosmetic_exceptions": "drop" }
            }"###,
        )
        .expect("config should parse");

        assert_eq!(config.sources.len(), 3);
        assert_eq!(
            config.sources[0],
            FilterListSource::url("easylist", "https://easylist.to/easylist/easylist.txt")
        );
        assert_eq!(config.sources[1], FilterListSource::file("local", "/tmp/extra.txt"));
        assert_eq!(config.sources[2], FilterListSource::inline("user", "##.ad"));
        assert_eq!(config.fetch.timeout(), Duration::from_secs(5));
        assert_eq!(config.fetch.retries, 2);
        assert!(config.fetch.user_agent.starts_with("playshield/"));
        assert_eq!(config.matching.match_options(), MatchOptions::HOSTNAME_ANCHORED);
        assert_eq!(config.matching.parse_options().exceptions, ExceptionPolicy::Drop);
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_json_str("{}").expect("empty config should parse");
        assert!(config.sources.is_empty());
        assert_eq!(config.fetch.timeout(), Duration::from_secs(20));
        assert_eq!(config.matching.match_options(), MatchOptions::empty());
        assert_eq!(config.matching.cosmetic_exceptions, ExceptionPolicy::Literal);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = EngineConfig::from_json_str(
            r#"{ "sources": [ { "id": "a", "inline": "" }, { "id": "a", "inline": "" } ] }"#,
        );
        assert!(matches!(result, Err(ConfigError::DuplicateSource(id)) if id == "a"));
    }

    #[test]
    fn test_rejects_unknown_location() {
        let result = EngineConfig::from_json_str(r#"{ "sources": [ { "id": "a", "ftp": "x" } ] }"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = EngineConfig::from_path(Path::new("/nonexistent/playshield.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
