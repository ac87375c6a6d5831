use std::collections::HashMap;

use indexmap::IndexMap;
use kotoba_config::Config;
use kotoba_deinflect::{RuleCache, expand};
use kotoba_store::{DictStore, StoreError, clean_table_name};
use kotoba_types::{DictionaryHit, Entry, SearchMode, SearchRequest, SearchResult};
use unicode_normalization::UnicodeNormalization;

use crate::query;

/// Multi-dictionary search service. Owns the storage handle and the
/// conjugation rule cache; the host drives reloads on profile switches.
pub struct DictSearch {
    store: DictStore,
    config: Config,
    rules: RuleCache,
    #[cfg(test)]
    queries: std::sync::atomic::AtomicUsize,
}

impl DictSearch {
    /// Open the profile's database and load its conjugation rules.
    pub async fn open(config: Config) -> Result<Self, StoreError> {
        let store = DictStore::open(&config.db_path()).await?;
        let languages = store.list_languages().await?;
        let rules = RuleCache::load(&config, &languages);
        Ok(DictSearch {
            store,
            config,
            rules,
            #[cfg(test)]
            queries: std::sync::atomic::AtomicUsize::new(0),
        })
    }

    /// Wrap an already-open store. Rules start empty; call
    /// [`DictSearch::reload_conjugations`] to populate them.
    pub fn with_store(store: DictStore, config: Config) -> Self {
        DictSearch {
            store,
            config,
            rules: RuleCache::new(),
            #[cfg(test)]
            queries: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn store(&self) -> &DictStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drop and reload all cached conjugation rules (profile switch).
    pub async fn reload_conjugations(&mut self) -> Result<(), StoreError> {
        let languages = self.store.list_languages().await?;
        self.rules.reload(&self.config, &languages);
        Ok(())
    }

    /// Execute one search request across its dictionary group, in group
    /// order. Storage failures in a single dictionary degrade to an empty
    /// result for that dictionary; the rest of the group still runs.
    pub async fn search(&self, request: &SearchRequest) -> SearchResult {
        let base = base_terms(&request.term);
        let column = query::column(request.mode);
        let op = query::operator(request.mode);
        let total_limit = request.total_limit as usize;

        // Wildcarded term sets per language, computed once per request.
        let mut per_lang: HashMap<String, Vec<String>> = HashMap::new();
        let mut results: IndexMap<String, DictionaryHit> = IndexMap::new();
        let mut total = 0usize;

        for member in &request.group {
            if total >= total_limit {
                break;
            }
            if member.is_media() {
                results.insert(member.dict.clone(), DictionaryHit::Media(true));
                continue;
            }

            if !per_lang.contains_key(&member.lang) {
                let expanded = if request.deinflect {
                    match self.rules.rules(&member.lang) {
                        Some(rules) => expand(&base, rules),
                        None => base.clone(),
                    }
                } else {
                    base.clone()
                };
                per_lang.insert(
                    member.lang.clone(),
                    query::apply_wildcards(&expanded, request.mode),
                );
            }
            let patterns = &per_lang[&member.lang];

            let clause = query::predicate(column, op, patterns.len());
            let mut rows = self
                .query_dictionary(&member.dict, &clause, patterns, request.dict_limit)
                .await;

            // When the primary column finds nothing, the same patterns are
            // retried against the alternate-term and pronunciation columns;
            // the caller is not told which column matched.
            if rows.is_empty()
                && !request.mode.is_definition_like()
                && request.mode != SearchMode::Pronunciation
            {
                for fallback in ["altterm", "pronunciation"] {
                    let clause = query::predicate(fallback, op, patterns.len());
                    rows = self
                        .query_dictionary(&member.dict, &clause, patterns, request.dict_limit)
                        .await;
                    if !rows.is_empty() {
                        break;
                    }
                }
            }

            if rows.is_empty() {
                continue;
            }

            rows.truncate(total_limit - total);
            total += rows.len();
            results.insert(
                clean_table_name(&member.dict),
                DictionaryHit::Entries(rows),
            );
        }

        SearchResult {
            results,
            total_count: total,
        }
    }

    pub(crate) async fn query_dictionary(
        &self,
        table: &str,
        clause: &str,
        patterns: &[String],
        limit: u32,
    ) -> Vec<Entry> {
        #[cfg(test)]
        self.queries
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        match self.store.search_rows(table, clause, patterns, limit).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("search against {table} failed: {e}");
                Vec::new()
            }
        }
    }

    /// Number of storage queries issued so far.
    #[cfg(test)]
    fn query_count(&self) -> usize {
        self.queries.load(std::sync::atomic::Ordering::Relaxed)
    }
}

/// Base term set for a request: the NFC-normalized original plus its
/// lowercased and capitalized variants, deduplicated in that order. The
/// surface form is kept as supplied, whitespace included.
fn base_terms(term: &str) -> Vec<String> {
    let term: String = term.nfc().collect();
    let mut terms = vec![term.clone()];
    for variant in [term.to_lowercase(), capitalize(&term)] {
        if !terms.contains(&variant) {
            terms.push(variant);
        }
    }
    terms
}

/// First character uppercased, the rest lowercased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
