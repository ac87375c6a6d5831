pub mod types;

pub use types::{
    AddType, ConjugationRule, DictionaryHit, DictionaryInfo, Entry, GroupMember, SearchMode,
    SearchRequest, SearchResult, MEDIA_SOURCES,
};
