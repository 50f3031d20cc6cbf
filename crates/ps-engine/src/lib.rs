//! playshield Filter Engine
//!
//! The piece a host application owns: it loads filter lists from the
//! configured sources, keeps the current rule set, and answers
//! `should_block_request` / `cosmetic_selectors_for` queries.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ps_engine::{EngineConfig, FilterEngine, FilterListSource};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig {
//!     sources: vec![FilterListSource::url(
//!         "easylist",
//!         "https://easylist.to/easylist/easylist.txt",
//!     )],
//!     ..EngineConfig::default()
//! };
//! let engine = Arc::new(FilterEngine::new(config)?);
//! engine.reload().await?;
//!
//! if engine.should_block_request("https://ads.example.com/banner.png") {
//!     // cancel the request
//! }
//! let css = engine.cosmetic_stylesheet_for("music.youtube.com");
//! # let _ = css;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;

pub use config::{EngineConfig, FetchConfig, FilterListSource, MatchingConfig, SourceLocation};
pub use engine::{FilterEngine, LoadStats};
pub use error::{ConfigError, LoadError, SourceFetchError};
pub use fetch::{HttpFetcher, ListFetcher};
