use std::collections::HashMap;
use std::fs;
use std::path::Path;

use kotoba_config::Config;
use kotoba_types::ConjugationRule;

/// Per-language conjugation rules, loaded from the profile's rule files.
///
/// The cache is owned by the search service and only ever mutated through
/// [`RuleCache::reload`], which the host invokes on a profile switch.
#[derive(Debug, Default)]
pub struct RuleCache {
    rules: HashMap<String, Vec<ConjugationRule>>,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rule files for every given language. Languages without a rule
    /// file simply stay absent from the cache; unreadable files are logged
    /// and skipped.
    pub fn load(config: &Config, languages: &[String]) -> Self {
        let mut cache = Self::new();
        for lang in languages {
            if let Some(rules) = load_language(config, lang) {
                tracing::debug!("loaded {} conjugation rules for {lang}", rules.len());
                cache.rules.insert(lang.clone(), rules);
            }
        }
        cache
    }

    /// Drop all cached rules and reload from disk.
    pub fn reload(&mut self, config: &Config, languages: &[String]) {
        self.rules.clear();
        *self = Self::load(config, languages);
    }

    pub fn rules(&self, language: &str) -> Option<&[ConjugationRule]> {
        self.rules.get(language).map(|r| r.as_slice())
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(|k| k.as_str())
    }
}

fn load_language(config: &Config, language: &str) -> Option<Vec<ConjugationRule>> {
    config
        .conjugation_paths(language)
        .iter()
        .find(|p| p.exists())
        .and_then(|path| read_rule_file(path))
}

fn read_rule_file(path: &Path) -> Option<Vec<ConjugationRule>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("failed to read conjugation file {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(rules) => Some(rules),
        Err(e) => {
            tracing::warn!("invalid conjugation file {}: {e}", path.display());
            None
        }
    }
}
