use kotoba_store::{StoreError, clean_table_name, format_table_name};
use kotoba_types::Entry;

use crate::executor::DictSearch;

/// Exact-match lookup result for the batch export tool, bundled with the
/// dictionary's header settings so the exporter can render rows without a
/// second round trip.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub entries: Vec<Entry>,
    pub duplicate_header: bool,
    pub term_header: Vec<String>,
}

impl DictSearch {
    /// Look a term up in one dictionary for bulk export: exact equality
    /// tried against the term, alternate-term and pronunciation columns in
    /// turn, stopping at the first column that matches.
    pub async fn export_lookup(
        &self,
        term: &str,
        dictionary: &str,
    ) -> Result<ExportResult, StoreError> {
        let name = clean_table_name(dictionary);
        let info = self.store().dictionary_info(&name).await?;
        let table = format_table_name(info.language_id, &name);
        let patterns = vec![term.to_string()];
        let limit = self.config().search.dict_limit;

        let mut entries = Vec::new();
        for column in ["term", "altterm", "pronunciation"] {
            let clause = format!("{column} = ?");
            let rows = self
                .query_dictionary(&table, &clause, &patterns, limit)
                .await;
            if !rows.is_empty() {
                entries = rows;
                break;
            }
        }

        Ok(ExportResult {
            entries,
            duplicate_header: info.duplicate_header,
            term_header: info.term_header,
        })
    }
}
