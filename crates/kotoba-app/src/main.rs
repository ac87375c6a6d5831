use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kotoba_config::Config;
use kotoba_search::DictSearch;
use kotoba_store::{clean_table_name, format_table_name, normalize_dict_name};
use kotoba_types::{AddType, Entry, SearchMode, SearchRequest};

#[derive(Parser)]
#[command(name = "kotoba", about = "Multilingual dictionary search")]
struct Cli {
    /// Profile directory (defaults to the platform data dir)
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage languages
    Lang {
        #[command(subcommand)]
        command: LangCommand,
    },
    /// Manage dictionaries
    Dict {
        #[command(subcommand)]
        command: DictCommand,
    },
    /// Import entries from a JSON file into a dictionary
    Import { dictionary: String, file: PathBuf },
    /// Search a term across a dictionary group
    Search {
        term: String,
        /// Dictionary display names; searches every installed dictionary
        /// when omitted
        #[arg(long = "dict")]
        dicts: Vec<String>,
        /// forward | backward | anywhere | exact | definition | example |
        /// pronunciation
        #[arg(long, default_value = "forward")]
        mode: String,
        #[arg(long)]
        deinflect: bool,
        /// Per-dictionary row cap
        #[arg(long)]
        limit: Option<u32>,
        /// Total row cap across the group
        #[arg(long)]
        max: Option<u32>,
    },
    /// Exact lookup in one dictionary, as the batch exporter performs it
    Export { term: String, dictionary: String },
}

#[derive(Subcommand)]
enum LangCommand {
    Add { names: Vec<String> },
    List,
    /// Remove a language and every dictionary installed under it
    Delete { name: String },
}

#[derive(Subcommand)]
enum DictCommand {
    Add {
        name: String,
        language: String,
        /// Header columns, ordered subset of term/altterm/pronunciation
        #[arg(long = "header", default_values_t = [String::from("term")])]
        term_header: Vec<String>,
    },
    List,
    Delete {
        name: String,
    },
    /// Show or change per-dictionary settings
    AddType {
        name: String,
        value: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.profile {
        Some(dir) => Config::with_profile_dir(dir),
        None => Config::new(),
    };
    let search = DictSearch::open(config).await?;

    match cli.command {
        Command::Lang { command } => lang(&search, command).await?,
        Command::Dict { command } => dict(&search, command).await?,
        Command::Import { dictionary, file } => import(&search, &dictionary, &file).await?,
        Command::Search {
            term,
            dicts,
            mode,
            deinflect,
            limit,
            max,
        } => run_search(&search, &term, &dicts, &mode, deinflect, limit, max).await?,
        Command::Export { term, dictionary } => {
            let result = search.export_lookup(&term, &dictionary).await?;
            println!("{}", serde_json::to_string_pretty(&result.entries)?);
        }
    }
    Ok(())
}

async fn lang(search: &DictSearch, command: LangCommand) -> anyhow::Result<()> {
    let store = search.store();
    match command {
        LangCommand::Add { names } => store.add_languages(&names).await?,
        LangCommand::List => {
            for name in store.list_languages().await? {
                println!("{name}");
            }
        }
        LangCommand::Delete { name } => store.delete_language(&name).await?,
    }
    Ok(())
}

async fn dict(search: &DictSearch, command: DictCommand) -> anyhow::Result<()> {
    let store = search.store();
    match command {
        DictCommand::Add {
            name,
            language,
            term_header,
        } => {
            let final_name = store.add_dictionary(&name, &language, &term_header).await?;
            println!("{final_name}");
        }
        DictCommand::List => {
            for member in store.list_dictionaries_with_language().await? {
                println!("{}\t{}", kotoba_store::clean_table_name(&member.dict), member.lang);
            }
        }
        DictCommand::Delete { name } => store.delete_dictionary(&name).await?,
        DictCommand::AddType { name, value } => {
            let name = registry_name(&name);
            match value {
                Some(value) => {
                    let add_type =
                        AddType::from_str(&value).map_err(|e| anyhow::anyhow!(e))?;
                    store.set_add_type(&name, add_type).await?;
                }
                None => println!("{}", store.add_type(&name).await?.as_str()),
            }
        }
    }
    Ok(())
}

/// Registry name for a dictionary named on the command line. Accepts the
/// display name as typed at `dict add`, the stored registry name, or a
/// formatted table name.
fn registry_name(arg: &str) -> String {
    normalize_dict_name(&clean_table_name(arg))
}

async fn import(search: &DictSearch, dictionary: &str, file: &PathBuf) -> anyhow::Result<()> {
    let store = search.store();
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let entries: Vec<Entry> = serde_json::from_str(&data)?;
    let info = store.dictionary_info(&registry_name(dictionary)).await?;
    let table = format_table_name(info.language_id, &info.name);
    store.import_entries(&table, &entries).await?;
    tracing::info!("imported {} entries into {dictionary}", entries.len());
    Ok(())
}

async fn run_search(
    search: &DictSearch,
    term: &str,
    dicts: &[String],
    mode: &str,
    deinflect: bool,
    limit: Option<u32>,
    max: Option<u32>,
) -> anyhow::Result<()> {
    let store = search.store();
    let group = if dicts.is_empty() {
        store.list_dictionaries_with_language().await?
    } else {
        store.resolve_group(dicts).await?
    };
    let request = SearchRequest {
        term: term.to_string(),
        group,
        mode: SearchMode::from_str(mode).map_err(|e| anyhow::anyhow!(e))?,
        deinflect,
        dict_limit: limit.unwrap_or(search.config().search.dict_limit),
        total_limit: max.unwrap_or(search.config().search.total_limit),
    };
    let result = search.search(&request).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_name_accepts_display_and_table_forms() {
        assert_eq!(registry_name("[Test] Dict"), "Test_Dict");
        assert_eq!(registry_name("Test_Dict"), "Test_Dict");
        assert_eq!(registry_name("l3nameTest_Dict"), "Test_Dict");
    }

    #[tokio::test]
    async fn import_resolves_the_display_name_as_typed() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::with_profile_dir(tmp.path());
        let search = DictSearch::open(config).await.unwrap();
        let store = search.store();
        store.add_languages(&["English".to_string()]).await.unwrap();
        store
            .add_dictionary("[Test] Dict", "English", &["term".to_string()])
            .await
            .unwrap();

        let file = tmp.path().join("entries.json");
        std::fs::write(&file, r#"[{"term": "cat", "definition": "feline"}]"#).unwrap();
        import(&search, "[Test] Dict", &file).await.unwrap();

        let info = store.dictionary_info("Test_Dict").await.unwrap();
        let table = format_table_name(info.language_id, &info.name);
        let rows = store
            .search_rows(&table, "term = ?", &["cat".to_string()], 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].term, "cat");
    }
}
