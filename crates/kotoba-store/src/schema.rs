use kotoba_types::Entry;
use sqlx::sqlite::SqliteConnection;

use crate::error::StoreError;
use crate::names::{clean_table_name, format_table_name, normalize_dict_name};
use crate::store::DictStore;

/// Fixed column set of every dictionary table. `starCount` keeps its
/// camelCase spelling so existing database files stay readable.
const ENTRY_COLUMNS: &str =
    "term, altterm, pronunciation, pos, definition, examples, audio, frequency, starCount";

#[derive(sqlx::FromRow)]
struct EntryRow {
    term: String,
    altterm: Option<String>,
    pronunciation: Option<String>,
    pos: Option<String>,
    definition: String,
    examples: Option<String>,
    audio: Option<String>,
    frequency: Option<i64>,
    #[sqlx(rename = "starCount")]
    star_count: Option<String>,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        Entry {
            term: row.term,
            altterm: row.altterm,
            pronunciation: row.pronunciation,
            pos: row.pos,
            definition: row.definition,
            examples: row.examples,
            audio: row.audio,
            frequency: row.frequency,
            star_count: row.star_count,
        }
    }
}

/// Dictionary table provisioning and row access.
impl DictStore {
    /// Create a dictionary table and its five indexes. Idempotent.
    pub async fn create_dictionary_table(&self, table: &str) -> Result<(), StoreError> {
        let mut conn = self.pool().acquire().await?;
        create_table_ddl(&mut *conn, table)
            .await
            .map_err(StoreError::from)
    }

    /// Register and provision a new dictionary under `language`. The whole
    /// operation is transactional: on any failure nothing is left behind.
    /// Returns the normalized name the dictionary was stored under.
    pub async fn add_dictionary(
        &self,
        display_name: &str,
        language: &str,
        term_header: &[String],
    ) -> Result<String, StoreError> {
        let lid = self.language_id(language).await?;
        let name = normalize_dict_name(display_name);
        let header = serde_json::to_string(term_header)?;

        let mut tx = self.pool().begin().await.map_err(StoreError::transaction)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO dictionary_registry
                (name, language_id, fields, add_type, term_header, duplicate_header)
            VALUES (?, ?, '[]', 'add', ?, 0)
            "#,
        )
        .bind(&name)
        .bind(lid)
        .bind(&header)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            return Err(StoreError::transaction(e));
        }

        if let Err(e) = create_table_ddl(&mut *tx, &format_table_name(lid, &name)).await {
            return Err(StoreError::transaction(e));
        }

        tx.commit().await.map_err(StoreError::transaction)?;
        tracing::info!("dictionary added: {name} ({language})");
        Ok(name)
    }

    /// Remove a dictionary: its physical table and its registry row.
    /// Accepts either the registry name or the formatted table name. The
    /// trailing compaction is slow; keep this off interactive paths.
    pub async fn delete_dictionary(&self, name: &str) -> Result<(), StoreError> {
        let clean = clean_table_name(name);
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT language_id FROM dictionary_registry WHERE name = ?")
                .bind(&clean)
                .fetch_optional(self.pool())
                .await?;
        let (lid,) = row.ok_or_else(|| StoreError::NotFound(format!("dictionary '{clean}'")))?;

        let table = format_table_name(lid, &clean);
        let mut tx = self.pool().begin().await.map_err(StoreError::transaction)?;

        let dropped = sqlx::query(&format!("DROP TABLE IF EXISTS \"{table}\""))
            .execute(&mut *tx)
            .await;
        if let Err(e) = dropped {
            return Err(StoreError::transaction(e));
        }
        let deleted = sqlx::query("DELETE FROM dictionary_registry WHERE name = ?")
            .bind(&clean)
            .execute(&mut *tx)
            .await;
        if let Err(e) = deleted {
            return Err(StoreError::transaction(e));
        }

        tx.commit().await.map_err(StoreError::transaction)?;
        tracing::info!("dictionary deleted: {clean}");
        self.vacuum().await
    }

    /// Remove a language and everything registered under it: all physical
    /// tables matching the language's table prefix, the registry rows, and
    /// the language row itself. Irreversible.
    pub async fn delete_language(&self, name: &str) -> Result<(), StoreError> {
        let lid = self.language_id(name).await?;
        let tables = self.tables_like(&format!("l{lid}name%")).await?;

        let mut tx = self.pool().begin().await.map_err(StoreError::transaction)?;
        for table in &tables {
            if let Err(e) = sqlx::query(&format!("DROP TABLE IF EXISTS \"{table}\""))
                .execute(&mut *tx)
                .await
            {
                return Err(StoreError::transaction(e));
            }
        }
        for sql in [
            "DELETE FROM dictionary_registry WHERE language_id = ?",
            "DELETE FROM languages WHERE id = ?",
        ] {
            if let Err(e) = sqlx::query(sql).bind(lid).execute(&mut *tx).await {
                return Err(StoreError::transaction(e));
            }
        }
        tx.commit().await.map_err(StoreError::transaction)?;

        tracing::info!("language deleted: {name} ({} tables)", tables.len());
        self.vacuum().await
    }

    /// Bulk-insert imported entries into a dictionary table.
    pub async fn import_entries(&self, table: &str, entries: &[Entry]) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO \"{table}\" ({ENTRY_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        let mut tx = self.pool().begin().await.map_err(StoreError::transaction)?;
        for entry in entries {
            let inserted = sqlx::query(&sql)
                .bind(&entry.term)
                .bind(&entry.altterm)
                .bind(&entry.pronunciation)
                .bind(&entry.pos)
                .bind(&entry.definition)
                .bind(&entry.examples)
                .bind(&entry.audio)
                .bind(entry.frequency)
                .bind(&entry.star_count)
                .execute(&mut *tx)
                .await;
            if let Err(e) = inserted {
                return Err(StoreError::transaction(e));
            }
        }
        tx.commit().await.map_err(StoreError::transaction)?;
        Ok(())
    }

    /// Run a built predicate against one dictionary table, ordered by term
    /// length then frequency, capped at `limit` rows. `clause` must contain
    /// one positional placeholder per pattern.
    pub async fn search_rows(
        &self,
        table: &str,
        clause: &str,
        patterns: &[String],
        limit: u32,
    ) -> Result<Vec<Entry>, StoreError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM \"{table}\" WHERE {clause} \
             ORDER BY LENGTH(term) ASC, frequency ASC LIMIT ?"
        );
        let mut query = sqlx::query_as::<_, EntryRow>(&sql);
        for pattern in patterns {
            query = query.bind(pattern);
        }
        let rows = query.bind(limit).fetch_all(self.pool()).await?;
        Ok(rows.into_iter().map(Entry::from).collect())
    }

    /// Table names in sqlite_master matching a LIKE pattern.
    async fn tables_like(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE ?")
                .bind(pattern)
                .fetch_all(self.pool())
                .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

async fn create_table_ddl(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{table}" (
            term CHAR(40) NOT NULL,
            altterm CHAR(40),
            pronunciation CHAR(100),
            pos CHAR(40),
            definition TEXT,
            examples TEXT,
            audio TEXT,
            frequency MEDIUMINT,
            starCount TEXT
        )
        "#
    ))
    .execute(&mut *conn)
    .await?;

    let indexes = [
        ("it", "(term)"),
        ("itp", "(term, pronunciation)"),
        ("ia", "(altterm)"),
        ("iap", "(altterm, pronunciation)"),
        ("ip", "(pronunciation)"),
    ];
    for (prefix, columns) in indexes {
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS \"{prefix}{table}\" ON \"{table}\" {columns}"
        ))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_language(lang: &str) -> DictStore {
        let store = DictStore::open_in_memory().await.unwrap();
        store.add_languages(&[lang.to_string()]).await.unwrap();
        store
    }

    fn entry(term: &str, definition: &str, frequency: i64) -> Entry {
        Entry {
            term: term.to_string(),
            definition: definition.to_string(),
            frequency: Some(frequency),
            ..Entry::default()
        }
    }

    #[tokio::test]
    async fn add_dictionary_normalizes_name() {
        let store = store_with_language("English").await;
        let name = store
            .add_dictionary("[Test] Dict", "English", &["term".to_string()])
            .await
            .unwrap();
        assert_eq!(name, "Test_Dict");

        let tables = store.tables_like("l%nameTest_Dict").await.unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[tokio::test]
    async fn add_dictionary_unknown_language_is_not_found() {
        let store = DictStore::open_in_memory().await.unwrap();
        let err = store
            .add_dictionary("JMdict", "Japanese", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_dictionary_rolls_back() {
        let store = store_with_language("English").await;
        store.add_dictionary("Dict", "English", &[]).await.unwrap();
        let err = store.add_dictionary("Dict", "English", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Transaction { .. }));
        assert_eq!(store.list_dictionaries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_then_re_add_creates_fresh_table() {
        let store = store_with_language("Japanese").await;
        let name = store
            .add_dictionary("JMdict", "Japanese", &["term".to_string()])
            .await
            .unwrap();
        let lid = store.language_id("Japanese").await.unwrap();
        let table = format_table_name(lid, &name);
        store
            .import_entries(&table, &[entry("食べる", "to eat", 100)])
            .await
            .unwrap();

        store.delete_dictionary("JMdict").await.unwrap();
        assert!(store.tables_like(&table).await.unwrap().is_empty());
        assert!(store.list_dictionaries().await.unwrap().is_empty());

        store
            .add_dictionary("JMdict", "Japanese", &["term".to_string()])
            .await
            .unwrap();
        let rows = store
            .search_rows(&table, "term LIKE ?", &["%".to_string()], 10)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn delete_dictionary_accepts_table_name() {
        let store = store_with_language("Japanese").await;
        let name = store.add_dictionary("JMdict", "Japanese", &[]).await.unwrap();
        let lid = store.language_id("Japanese").await.unwrap();
        store
            .delete_dictionary(&format_table_name(lid, &name))
            .await
            .unwrap();
        assert!(store.list_dictionaries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_language_cascades() {
        let store = store_with_language("Japanese").await;
        store.add_languages(&["English".to_string()]).await.unwrap();
        store.add_dictionary("JMdict", "Japanese", &[]).await.unwrap();
        store.add_dictionary("Kenkyusha", "Japanese", &[]).await.unwrap();
        store.add_dictionary("Oxford", "English", &[]).await.unwrap();

        store.delete_language("Japanese").await.unwrap();

        assert_eq!(store.list_languages().await.unwrap(), vec!["English"]);
        let remaining = store.list_dictionaries_with_language().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].lang, "English");
        assert!(store.tables_like("l%nameJMdict").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_orders_by_term_length_then_frequency() {
        let store = store_with_language("Japanese").await;
        let name = store.add_dictionary("JMdict", "Japanese", &[]).await.unwrap();
        let lid = store.language_id("Japanese").await.unwrap();
        let table = format_table_name(lid, &name);
        store
            .import_entries(
                &table,
                &[
                    entry("食べ歩く", "to eat while walking", 500),
                    entry("食べる", "to eat", 300),
                    entry("食べす", "bogus short", 100),
                ],
            )
            .await
            .unwrap();

        let rows = store
            .search_rows(&table, "term LIKE ?", &["食べ%".to_string()], 10)
            .await
            .unwrap();
        let terms: Vec<&str> = rows.iter().map(|e| e.term.as_str()).collect();
        assert_eq!(terms, vec!["食べす", "食べる", "食べ歩く"]);
    }

    #[tokio::test]
    async fn search_against_missing_table_is_storage_error() {
        let store = DictStore::open_in_memory().await.unwrap();
        let err = store
            .search_rows("l1nameGone", "term LIKE ?", &["x%".to_string()], 10)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let store = store_with_language("English").await;
        let name = store
            .add_dictionary("Oxford", "English", &["term".to_string()])
            .await
            .unwrap();

        assert_eq!(store.fields(&name).await.unwrap(), Vec::<String>::new());
        assert_eq!(
            store.add_type(&name).await.unwrap(),
            kotoba_types::AddType::Add
        );
        assert!(!store.duplicate_header(&name).await.unwrap());

        store
            .set_fields(&name, &["Front".to_string(), "Back".to_string()])
            .await
            .unwrap();
        store
            .set_add_type(&name, kotoba_types::AddType::IfEmpty)
            .await
            .unwrap();
        store
            .set_term_header(&name, &["pronunciation".to_string()])
            .await
            .unwrap();
        store.set_duplicate_header(&name, true).await.unwrap();

        let info = store.dictionary_info(&name).await.unwrap();
        assert_eq!(info.fields, vec!["Front", "Back"]);
        assert_eq!(info.add_type, kotoba_types::AddType::IfEmpty);
        assert_eq!(info.term_header, vec!["pronunciation"]);
        assert!(info.duplicate_header);
    }

    #[tokio::test]
    async fn resolve_group_passes_media_sources_through() {
        let store = store_with_language("Japanese").await;
        store.add_dictionary("JMdict", "Japanese", &[]).await.unwrap();
        let lid = store.language_id("Japanese").await.unwrap();

        let group = store
            .resolve_group(&[
                "JMdict".to_string(),
                "Google Images".to_string(),
                "NotInstalled".to_string(),
            ])
            .await
            .unwrap();

        assert_eq!(group.len(), 2);
        assert_eq!(group[0].dict, format_table_name(lid, "JMdict"));
        assert_eq!(group[0].lang, "Japanese");
        assert_eq!(group[1].dict, "Google Images");
    }

    #[tokio::test]
    async fn default_groups_are_keyed_by_language() {
        let store = store_with_language("Japanese").await;
        store.add_languages(&["Korean".to_string()]).await.unwrap();
        store.add_dictionary("JMdict", "Japanese", &[]).await.unwrap();

        let groups = store.default_groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "Japanese");
        assert_eq!(groups[0].1.len(), 1);
    }
}
