use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub mod search;

pub use search::SearchConfig;

/// Profile-scoped configuration: where the dictionary database and the
/// per-language conjugation rule files live, plus search limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub profile_dir: PathBuf,
    pub search: SearchConfig,
}

impl Config {
    pub fn new() -> Self {
        let profile_dir = env::var("KOTOBA_PROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_profile_dir());

        Config {
            profile_dir,
            search: SearchConfig::new(),
        }
    }

    /// Configuration rooted at an explicit profile directory (used when the
    /// host switches profiles).
    pub fn with_profile_dir(profile_dir: impl Into<PathBuf>) -> Self {
        Config {
            profile_dir: profile_dir.into(),
            search: SearchConfig::new(),
        }
    }

    /// Path of the SQLite file holding all dictionaries of this profile.
    pub fn db_path(&self) -> PathBuf {
        self.profile_dir.join("db").join("dictionaries.sqlite")
    }

    /// Candidate locations of a language's conjugation rule file, in lookup
    /// order: the shared `db/conjugation` folder first, then the rules
    /// bundled alongside the language's dictionaries.
    pub fn conjugation_paths(&self, language: &str) -> [PathBuf; 2] {
        [
            self.profile_dir
                .join("db")
                .join("conjugation")
                .join(format!("{language}.json")),
            self.profile_dir
                .join("dictionaries")
                .join(language)
                .join("conjugations.json"),
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_profile_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kotoba")
}
