use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Dictionary names reserved for external media sources. Group members with
/// one of these names are never backed by a storage table; search passes
/// them through as placeholders for the host to resolve.
pub const MEDIA_SOURCES: [&str; 2] = ["Google Images", "Forvo"];

/// One row of a dictionary table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entry {
    pub term: String,
    pub altterm: Option<String>,
    pub pronunciation: Option<String>,
    pub pos: Option<String>,
    pub definition: String,
    pub examples: Option<String>,
    pub audio: Option<String>,
    pub frequency: Option<i64>,
    pub star_count: Option<String>,
}

/// How imported entries are merged into note fields by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddType {
    Add,
    Overwrite,
    IfEmpty,
}

impl AddType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddType::Add => "add",
            AddType::Overwrite => "overwrite",
            AddType::IfEmpty => "if_empty",
        }
    }
}

impl FromStr for AddType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(AddType::Add),
            "overwrite" => Ok(AddType::Overwrite),
            "if_empty" => Ok(AddType::IfEmpty),
            other => Err(format!("unknown add type: {other}")),
        }
    }
}

/// Registry row for an installed dictionary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryInfo {
    /// Normalized registry name (unique).
    pub name: String,
    pub language_id: i64,
    /// Export field names, in order.
    pub fields: Vec<String>,
    pub add_type: AddType,
    /// Ordered subset of {term, altterm, pronunciation} used to render
    /// a result header.
    pub term_header: Vec<String>,
    pub duplicate_header: bool,
}

/// A single suffix-substitution rule loaded from a per-language rule file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConjugationRule {
    pub inflected: String,
    pub dict: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// Search modes supported by the lookup UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    Forward,
    Backward,
    Anywhere,
    Exact,
    Definition,
    Example,
    Pronunciation,
}

impl SearchMode {
    /// True for the modes that search definition text rather than terms.
    pub fn is_definition_like(&self) -> bool {
        matches!(self, SearchMode::Definition | SearchMode::Example)
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" => Ok(SearchMode::Forward),
            "backward" => Ok(SearchMode::Backward),
            "anywhere" => Ok(SearchMode::Anywhere),
            "exact" => Ok(SearchMode::Exact),
            "definition" => Ok(SearchMode::Definition),
            "example" => Ok(SearchMode::Example),
            "pronunciation" => Ok(SearchMode::Pronunciation),
            other => Err(format!("unknown search mode: {other}")),
        }
    }
}

/// One member of a dictionary group: a physical table reference (or media
/// placeholder name) plus the language it is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub dict: String,
    pub lang: String,
}

impl GroupMember {
    pub fn is_media(&self) -> bool {
        MEDIA_SOURCES.contains(&self.dict.as_str())
    }
}

/// One search request against an ordered dictionary group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub term: String,
    pub group: Vec<GroupMember>,
    pub mode: SearchMode,
    pub deinflect: bool,
    /// Row cap per dictionary.
    pub dict_limit: u32,
    /// Row cap across the whole group.
    pub total_limit: u32,
}

/// Per-dictionary outcome inside a search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DictionaryHit {
    Entries(Vec<Entry>),
    /// Placeholder for an external media source; resolved by the host.
    Media(bool),
}

impl DictionaryHit {
    pub fn len(&self) -> usize {
        match self {
            DictionaryHit::Entries(entries) => entries.len(),
            DictionaryHit::Media(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aggregated search result, keyed by cleaned dictionary display name in
/// the order dictionaries produced results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub results: IndexMap<String, DictionaryHit>,
    pub total_count: usize,
}
