//! WebAssembly bindings for playshield
//!
//! For hosts that live in JavaScript (the embedded browser shell). The host
//! fetches the list texts itself and hands them over; the engine is an
//! ordinary JS object owned by the host, not a module-level singleton.

use wasm_bindgen::prelude::*;

use ps_compiler::builder::{ListStats, RuleSetBuilder};
use ps_compiler::parser::{ExceptionPolicy, ParseOptions};
use ps_core::{Matcher, MatchOptions, RuleSet};

#[wasm_bindgen]
pub struct WasmFilterEngine {
    match_options: MatchOptions,
    parse_options: ParseOptions,
    rules: Option<RuleSet>,
}

/// Outcome of [`WasmFilterEngine::load_texts`].
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub network_rules: usize,
    pub cosmetic_rules: usize,
    pub lists: Vec<ListStats>,
    pub failed: usize,
}

#[wasm_bindgen]
impl WasmFilterEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(hostname_anchored: bool, drop_cosmetic_exceptions: bool) -> Self {
        let mut match_options = MatchOptions::empty();
        match_options.set(MatchOptions::HOSTNAME_ANCHORED, hostname_anchored);

        let exceptions = if drop_cosmetic_exceptions {
            ExceptionPolicy::Drop
        } else {
            ExceptionPolicy::Literal
        };

        Self {
            match_options,
            parse_options: ParseOptions { exceptions },
            rules: None,
        }
    }

    /// Load list texts (an array; `null` entries mark lists the host failed
    /// to fetch). Replaces the current rules unless nothing could be loaded.
    pub fn load_lists(&mut self, list_texts: JsValue) -> Result<JsValue, JsValue> {
        let list_array = js_sys::Array::from(&list_texts);
        let texts: Vec<Option<String>> = list_array.iter().map(|value| value.as_string()).collect();

        let summary = self.load_texts(&texts).map_err(|e| JsValue::from_str(&e))?;

        let js_result = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&js_result, &"networkRules".into(), &JsValue::from(summary.network_rules as u32));
        let _ = js_sys::Reflect::set(&js_result, &"cosmeticRules".into(), &JsValue::from(summary.cosmetic_rules as u32));
        let _ = js_sys::Reflect::set(&js_result, &"failed".into(), &JsValue::from(summary.failed as u32));

        let list_stats = js_sys::Array::new_with_length(summary.lists.len() as u32);
        for (i, list) in summary.lists.iter().enumerate() {
            let stat = js_sys::Object::new();
            let _ = js_sys::Reflect::set(&stat, &"listId".into(), &JsValue::from(list.list_id));
            let _ = js_sys::Reflect::set(&stat, &"lines".into(), &JsValue::from(list.stats.lines as u32));
            let _ = js_sys::Reflect::set(&stat, &"networkRules".into(), &JsValue::from(list.stats.network_rules() as u32));
            let _ = js_sys::Reflect::set(&stat, &"cosmeticRules".into(), &JsValue::from(list.stats.cosmetic as u32));
            let _ = js_sys::Reflect::set(&stat, &"skipped".into(), &JsValue::from(list.stats.skipped as u32));
            list_stats.set(i as u32, stat.into());
        }
        let _ = js_sys::Reflect::set(&js_result, &"listStats".into(), &list_stats);

        Ok(js_result.into())
    }

    pub fn is_initialized(&self) -> bool {
        self.rules.is_some()
    }

    pub fn should_block_request(&self, url: &str) -> bool {
        match &self.rules {
            Some(rules) => Matcher::new(rules).should_block(url),
            None => false,
        }
    }

    pub fn match_request(&self, url: &str) -> JsValue {
        let result = match &self.rules {
            Some(rules) => Matcher::new(rules).match_request(url),
            None => Default::default(),
        };

        let js_result = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&js_result, &"blocked".into(), &JsValue::from(result.is_blocked()));
        let _ = js_sys::Reflect::set(&js_result, &"ruleId".into(), &JsValue::from(result.rule_id));
        let _ = js_sys::Reflect::set(&js_result, &"listId".into(), &JsValue::from(result.list_id));
        js_result.into()
    }

    pub fn cosmetic_selectors_for(&self, hostname: &str) -> Vec<String> {
        match &self.rules {
            Some(rules) => Matcher::new(rules).match_cosmetic(hostname).selectors,
            None => Vec::new(),
        }
    }

    pub fn cosmetic_stylesheet_for(&self, hostname: &str) -> String {
        match &self.rules {
            Some(rules) => Matcher::new(rules).match_cosmetic(hostname).stylesheet(),
            None => String::new(),
        }
    }
}

impl WasmFilterEngine {
    /// Parse the given texts in order and publish the result.
    pub fn load_texts(&mut self, texts: &[Option<String>]) -> Result<LoadSummary, String> {
        if texts.is_empty() {
            return Err("No list texts provided".to_string());
        }

        let mut builder = RuleSetBuilder::new(self.parse_options);
        let mut failed = 0usize;

        for (idx, text) in texts.iter().enumerate() {
            let list_id = u16::try_from(idx).unwrap_or(u16::MAX);
            match text {
                Some(text) => {
                    builder.add_list(list_id, &format!("list-{}", idx), text);
                }
                None => {
                    failed += 1;
                    warn(&format!("Skipping filter list {}: not loaded", idx));
                }
            }
        }

        if builder.list_count() == 0 {
            return Err("No filter list could be loaded".to_string());
        }

        let (rules, lists) = builder.build(self.match_options);
        let summary = LoadSummary {
            network_rules: rules.network_len(),
            cosmetic_rules: rules.cosmetic_len(),
            lists,
            failed,
        };
        self.rules = Some(rules);

        Ok(summary)
    }
}

#[cfg(target_arch = "wasm32")]
fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn warn(message: &str) {
    log::warn!("{}", message);
}
