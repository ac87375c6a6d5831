use std::str::FromStr;

use kotoba_types::{AddType, DictionaryInfo, GroupMember, MEDIA_SOURCES};

use crate::error::StoreError;
use crate::names::format_table_name;
use crate::store::DictStore;

/// Language registry and per-dictionary settings. All dictionary lookups
/// here are keyed by the normalized registry name.
impl DictStore {
    /// Register languages, ignoring names that already exist.
    pub async fn add_languages(&self, names: &[String]) -> Result<(), StoreError> {
        for name in names {
            let result = sqlx::query("INSERT OR IGNORE INTO languages (name) VALUES (?)")
                .bind(name)
                .execute(self.pool())
                .await?;
            if result.rows_affected() == 0 {
                tracing::warn!("language already registered: {name}");
            }
        }
        Ok(())
    }

    pub async fn language_id(&self, name: &str) -> Result<i64, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM languages WHERE name = ?")
            .bind(name)
            .fetch_optional(self.pool())
            .await?;
        row.map(|(id,)| id)
            .ok_or_else(|| StoreError::NotFound(format!("language '{name}'")))
    }

    pub async fn list_languages(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM languages ORDER BY id")
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Registry names of all dictionaries installed for a language.
    pub async fn dictionaries_for_language(&self, lang: &str) -> Result<Vec<String>, StoreError> {
        let lid = self.language_id(lang).await?;
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM dictionary_registry WHERE language_id = ?")
                .bind(lid)
                .fetch_all(self.pool())
                .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Physical table names of every installed dictionary.
    pub async fn list_dictionaries(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT name, language_id FROM dictionary_registry")
                .fetch_all(self.pool())
                .await?;
        Ok(rows
            .into_iter()
            .map(|(name, lid)| format_table_name(lid, &name))
            .collect())
    }

    pub async fn list_dictionaries_with_language(
        &self,
    ) -> Result<Vec<GroupMember>, StoreError> {
        let rows: Vec<(String, i64, String)> = sqlx::query_as(
            r#"
            SELECT r.name, r.language_id, l.name
            FROM dictionary_registry r
            INNER JOIN languages l ON l.id = r.language_id
            "#,
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows
            .into_iter()
            .map(|(name, lid, lang)| GroupMember {
                dict: format_table_name(lid, &name),
                lang,
            })
            .collect())
    }

    /// Resolve display names into group members, preserving order. Unknown
    /// names are dropped; media source names pass through as placeholders.
    pub async fn resolve_group(&self, names: &[String]) -> Result<Vec<GroupMember>, StoreError> {
        let installed = self.list_dictionaries_with_language().await?;
        let mut group = Vec::new();
        for name in names {
            if MEDIA_SOURCES.contains(&name.as_str()) {
                group.push(GroupMember {
                    dict: name.clone(),
                    lang: String::new(),
                });
                continue;
            }
            if let Some(member) = installed
                .iter()
                .find(|m| crate::names::clean_table_name(&m.dict) == *name)
            {
                group.push(member.clone());
            }
        }
        Ok(group)
    }

    /// One group per language holding all of that language's dictionaries,
    /// skipping languages with none installed.
    pub async fn default_groups(&self) -> Result<Vec<(String, Vec<GroupMember>)>, StoreError> {
        let installed = self.list_dictionaries_with_language().await?;
        let mut groups = Vec::new();
        for lang in self.list_languages().await? {
            let members: Vec<GroupMember> = installed
                .iter()
                .filter(|m| m.lang == lang)
                .cloned()
                .collect();
            if !members.is_empty() {
                groups.push((lang, members));
            }
        }
        Ok(groups)
    }

    pub async fn dictionary_info(&self, name: &str) -> Result<DictionaryInfo, StoreError> {
        let row: Option<(String, i64, String, String, String, i64)> = sqlx::query_as(
            r#"
            SELECT name, language_id, fields, add_type, term_header, duplicate_header
            FROM dictionary_registry WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool())
        .await?;

        let (name, language_id, fields, add_type, term_header, duplicate_header) =
            row.ok_or_else(|| StoreError::NotFound(format!("dictionary '{name}'")))?;

        let add_type = AddType::from_str(&add_type).unwrap_or_else(|e| {
            tracing::warn!("registry row for {name}: {e}, defaulting to add");
            AddType::Add
        });

        Ok(DictionaryInfo {
            name,
            language_id,
            fields: serde_json::from_str(&fields)?,
            add_type,
            term_header: serde_json::from_str(&term_header)?,
            duplicate_header: duplicate_header != 0,
        })
    }

    pub async fn fields(&self, name: &str) -> Result<Vec<String>, StoreError> {
        let value: String = self.setting(name, "fields").await?;
        Ok(serde_json::from_str(&value)?)
    }

    pub async fn set_fields(&self, name: &str, fields: &[String]) -> Result<(), StoreError> {
        self.set_setting(name, "fields", &serde_json::to_string(fields)?)
            .await
    }

    pub async fn add_type(&self, name: &str) -> Result<AddType, StoreError> {
        let value: String = self.setting(name, "add_type").await?;
        Ok(AddType::from_str(&value).unwrap_or(AddType::Add))
    }

    pub async fn set_add_type(&self, name: &str, add_type: AddType) -> Result<(), StoreError> {
        self.set_setting(name, "add_type", add_type.as_str()).await
    }

    pub async fn term_header(&self, name: &str) -> Result<Vec<String>, StoreError> {
        let value: String = self.setting(name, "term_header").await?;
        Ok(serde_json::from_str(&value)?)
    }

    pub async fn set_term_header(&self, name: &str, header: &[String]) -> Result<(), StoreError> {
        self.set_setting(name, "term_header", &serde_json::to_string(header)?)
            .await
    }

    pub async fn duplicate_header(&self, name: &str) -> Result<bool, StoreError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT duplicate_header FROM dictionary_registry WHERE name = ?")
                .bind(name)
                .fetch_optional(self.pool())
                .await?;
        row.map(|(v,)| v != 0)
            .ok_or_else(|| StoreError::NotFound(format!("dictionary '{name}'")))
    }

    pub async fn set_duplicate_header(&self, name: &str, value: bool) -> Result<(), StoreError> {
        sqlx::query("UPDATE dictionary_registry SET duplicate_header = ? WHERE name = ?")
            .bind(value as i64)
            .bind(name)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Term headers of every dictionary, keyed by registry name.
    pub async fn term_headers(&self) -> Result<Vec<(String, Vec<String>)>, StoreError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT name, term_header FROM dictionary_registry")
                .fetch_all(self.pool())
                .await?;
        rows.into_iter()
            .map(|(name, header)| Ok((name, serde_json::from_str(&header)?)))
            .collect()
    }

    /// Duplicate-header flags of every dictionary, keyed by registry name.
    pub async fn duplicate_headers(&self) -> Result<Vec<(String, bool)>, StoreError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT name, duplicate_header FROM dictionary_registry")
                .fetch_all(self.pool())
                .await?;
        Ok(rows.into_iter().map(|(name, v)| (name, v != 0)).collect())
    }

    pub async fn add_type_and_fields(
        &self,
        name: &str,
    ) -> Result<(AddType, Vec<String>), StoreError> {
        let info = self.dictionary_info(name).await?;
        Ok((info.add_type, info.fields))
    }

    async fn setting(&self, name: &str, column: &str) -> Result<String, StoreError> {
        let sql = format!("SELECT {column} FROM dictionary_registry WHERE name = ?");
        let row: Option<(String,)> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(self.pool())
            .await?;
        row.map(|(v,)| v)
            .ok_or_else(|| StoreError::NotFound(format!("dictionary '{name}'")))
    }

    async fn set_setting(&self, name: &str, column: &str, value: &str) -> Result<(), StoreError> {
        let sql = format!("UPDATE dictionary_registry SET {column} = ? WHERE name = ?");
        sqlx::query(&sql)
            .bind(value)
            .bind(name)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
