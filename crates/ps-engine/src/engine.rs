//! The host-facing filter engine.
//!
//! A [`FilterEngine`] is created once by the host application and shared
//! (usually as `Arc<FilterEngine>`) with whatever intercepts requests and
//! injects stylesheets. Loading builds a complete [`RuleSet`] off to the
//! side and publishes it by swapping a single pointer, so queries never see
//! a half-built set. Every load takes a generation number when it starts;
//! a load that finishes after a newer one has already published is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use tokio::task::JoinSet;

use ps_compiler::builder::{ListStats, RuleSetBuilder};
use ps_core::matcher::Matcher;
use ps_core::ruleset::RuleSet;
use ps_core::types::MatchResult;

use crate::config::{EngineConfig, FilterListSource};
use crate::error::{ConfigError, LoadError, SourceFetchError};
use crate::fetch::{HttpFetcher, ListFetcher};

/// Summary of a successful load.
#[derive(Debug)]
pub struct LoadStats {
    pub network_rules: usize,
    pub cosmetic_rules: usize,
    /// Lists that loaded, in source order
    pub lists: Vec<ListStats>,
    /// Sources that were skipped
    pub failures: Vec<SourceFetchError>,
    /// False when a newer load published first and this result was dropped
    pub published: bool,
    pub total_ms: f64,
}

impl LoadStats {
    pub fn sources_loaded(&self) -> usize {
        self.lists.len()
    }

    pub fn sources_failed(&self) -> usize {
        self.failures.len()
    }
}

/// The published rule set and the generation of the load that built it.
#[derive(Default)]
struct Published {
    generation: u64,
    rules: Option<Arc<RuleSet>>,
}

pub struct FilterEngine {
    config: EngineConfig,
    fetcher: Arc<dyn ListFetcher>,
    next_generation: AtomicU64,
    published: RwLock<Published>,
}

impl FilterEngine {
    /// Create an engine that fetches with [`HttpFetcher`].
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: EngineConfig, fetcher: Arc<dyn ListFetcher>) -> Self {
        Self {
            config,
            fetcher,
            next_generation: AtomicU64::new(0),
            published: RwLock::new(Published::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetch, parse and publish the given sources.
    ///
    /// Individual sources may fail; they are logged, recorded in the stats
    /// and skipped. Fails only if no source could be loaded, in which case
    /// the previously published rules (if any) stay in place. Overlapping
    /// loads publish in the order they were started.
    pub async fn load(&self, sources: &[FilterListSource]) -> Result<LoadStats, LoadError> {
        if sources.is_empty() {
            return Err(LoadError::NoSources);
        }

        let generation = self.next_generation();
        let start = Instant::now();
        let fetched = self.fetch_all(sources).await;

        let mut builder = RuleSetBuilder::new(self.config.matching.parse_options());
        let mut failures = Vec::new();

        for (idx, (source, result)) in sources.iter().zip(fetched).enumerate() {
            match result {
                Ok(text) => {
                    let list_id = u16::try_from(idx).unwrap_or(u16::MAX);
                    builder.add_list(list_id, &source.id, &text);
                }
                Err(err) => {
                    log::warn!("Skipping filter list '{}': {}", source.id, err);
                    failures.push(err);
                }
            }
        }

        if builder.list_count() == 0 {
            log::warn!("No filter list could be loaded; ad blocking is inactive");
            return Err(LoadError::AllSourcesFailed { failures });
        }

        let (rules, lists) = builder.build(self.config.matching.match_options());
        let network_rules = rules.network_len();
        let cosmetic_rules = rules.cosmetic_len();
        let published = self.publish(generation, rules);

        let stats = LoadStats {
            network_rules,
            cosmetic_rules,
            lists,
            failures,
            published,
            total_ms: start.elapsed().as_secs_f64() * 1000.0,
        };

        log::info!(
            "Loaded {}/{} filter lists: {} network rules, {} cosmetic rules ({:.1}ms)",
            stats.sources_loaded(),
            sources.len(),
            stats.network_rules,
            stats.cosmetic_rules,
            stats.total_ms
        );

        if !published {
            log::debug!("Discarded load {}: a newer load already published", generation);
        }

        Ok(stats)
    }

    /// Load the sources from the engine's configuration again.
    pub async fn reload(&self) -> Result<LoadStats, LoadError> {
        self.load(&self.config.sources).await
    }

    /// Fetch every source concurrently. Results come back in source order.
    async fn fetch_all(
        &self,
        sources: &[FilterListSource],
    ) -> Vec<Result<String, SourceFetchError>> {
        let mut tasks = JoinSet::new();
        for (idx, source) in sources.iter().cloned().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            tasks.spawn(async move {
                let result = fetcher.fetch(&source).await;
                (idx, result)
            });
        }

        let mut slots: Vec<Option<Result<String, SourceFetchError>>> =
            sources.iter().map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => {
                    if let Ok(text) = &result {
                        log::debug!("Fetched '{}' ({} bytes)", sources[idx].id, text.len());
                    }
                    slots[idx] = Some(result);
                }
                Err(err) => log::warn!("Fetch task failed: {}", err),
            }
        }

        slots
            .into_iter()
            .zip(sources)
            .map(|(slot, source)| {
                slot.unwrap_or_else(|| {
                    Err(SourceFetchError::Aborted {
                        id: source.id.clone(),
                    })
                })
            })
            .collect()
    }

    fn next_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish a fully built rule set, replacing the current one. Supersedes
    /// any load still in flight.
    pub fn install(&self, rules: RuleSet) {
        let generation = self.next_generation();
        self.publish(generation, rules);
    }

    /// Swap in `rules` unless a later generation has already been published.
    fn publish(&self, generation: u64, rules: RuleSet) -> bool {
        let rules = Arc::new(rules);
        let mut slot = self.published.write().unwrap_or_else(PoisonError::into_inner);
        if generation < slot.generation {
            return false;
        }
        slot.generation = generation;
        slot.rules = Some(rules);
        true
    }

    /// The currently published rule set.
    pub fn rules(&self) -> Option<Arc<RuleSet>> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .rules
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.rules().is_some()
    }

    /// Match a request, reporting which rule decided it.
    /// Allows everything until rules have been loaded.
    pub fn match_request(&self, url: &str) -> MatchResult {
        let Some(rules) = self.rules() else {
            return MatchResult::default();
        };

        let result = Matcher::new(&rules).match_request(url);
        if result.is_blocked() {
            log::trace!(
                "Blocked {} (rule {}, list {})",
                url,
                result.rule_id,
                result.list_id
            );
        }
        result
    }

    /// Whether the host should cancel a request to `url`.
    pub fn should_block_request(&self, url: &str) -> bool {
        self.match_request(url).is_blocked()
    }

    /// CSS selectors to hide on pages served from `hostname`.
    /// Empty until rules have been loaded.
    pub fn cosmetic_selectors_for(&self, hostname: &str) -> Vec<String> {
        match self.rules() {
            Some(rules) => Matcher::new(&rules).match_cosmetic(hostname).selectors,
            None => Vec::new(),
        }
    }

    /// Stylesheet hiding every selector for `hostname`, ready for injection.
    pub fn cosmetic_stylesheet_for(&self, hostname: &str) -> String {
        match self.rules() {
            Some(rules) => Matcher::new(&rules).match_cosmetic(hostname).stylesheet(),
            None => String::new(),
        }
    }
}
