use std::env;

use serde::{Deserialize, Serialize};

/// Result caps applied to every search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Rows returned per dictionary.
    pub dict_limit: u32,
    /// Rows returned across the whole dictionary group.
    pub total_limit: u32,
}

impl SearchConfig {
    pub fn new() -> Self {
        let dict_limit = env::var("KOTOBA_DICT_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);

        let total_limit = env::var("KOTOBA_TOTAL_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);

        SearchConfig {
            dict_limit,
            total_limit,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new()
    }
}
