use once_cell::sync::Lazy;
use regex::Regex;

/// Fallback for names that are empty or normalize to nothing.
pub const FALLBACK_NAME: &str = "unnamed_dictionary";

/// Maximum length of a normalized name, in characters.
const MAX_NAME_CHARS: usize = 100;

static TABLE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^l\d+name").expect("table prefix pattern"));

/// Normalize a user-supplied dictionary name into a storage-safe
/// identifier. One classification pass over the input: bracket, quote and
/// punctuation characters are dropped, path separators and whitespace
/// become underscores, full-width stops become ASCII dots, control
/// characters are removed. The result is capped at 100 characters;
/// empty results fall back to a fixed placeholder. Total and idempotent.
pub fn normalize_dict_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut kept = 0usize;
    for ch in name.chars() {
        if kept >= MAX_NAME_CHARS {
            break;
        }
        let before = out.len();
        match ch {
            '[' | ']' | '(' | ')' | '{' | '}' | '<' | '>' => {}
            '\'' | '"' | '`' | '´' => {}
            '*' | '?' | '!' | '@' | '#' | '$' | '%' | '^' | '&' | '=' | '+' | ',' | ';' | '~' => {}
            '/' | '\\' | '|' | ':' => out.push('_'),
            ' ' | '　' => out.push('_'),
            '．' | '。' => out.push('.'),
            c if c.is_control() => {}
            c => out.push(c),
        }
        if out.len() > before {
            kept += 1;
        }
    }

    if out.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        out
    }
}

/// Physical table name for a dictionary: `l{language_id}name{name}`.
pub fn format_table_name(language_id: i64, name: &str) -> String {
    format!("l{language_id}name{name}")
}

/// Strip the `l<digits>name` prefix from a table name, recovering the
/// registry name. Inverse of [`format_table_name`] for any name that does
/// not itself match the prefix pattern. Names without the prefix pass
/// through unchanged.
pub fn clean_table_name(table_name: &str) -> String {
    TABLE_PREFIX.replace(table_name, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_and_quotes_are_stripped() {
        assert_eq!(normalize_dict_name("[Test] Dict"), "Test_Dict");
        assert_eq!(normalize_dict_name("\"quoted\" (name)"), "quoted_name");
    }

    #[test]
    fn separators_become_underscores() {
        assert_eq!(normalize_dict_name("a/b\\c|d:e"), "a_b_c_d_e");
        assert_eq!(normalize_dict_name("full　width"), "full_width");
    }

    #[test]
    fn fullwidth_stops_become_ascii() {
        assert_eq!(normalize_dict_name("辞書。第２版"), "辞書.第２版");
    }

    #[test]
    fn empty_and_all_stripped_fall_back() {
        assert_eq!(normalize_dict_name(""), FALLBACK_NAME);
        assert_eq!(normalize_dict_name("[]()!!"), FALLBACK_NAME);
    }

    #[test]
    fn normalization_is_idempotent() {
        for name in ["[Test] Dict", "a/b:c", "辞書。", "", "plain", &"x".repeat(300)] {
            let once = normalize_dict_name(name);
            assert_eq!(normalize_dict_name(&once), once);
        }
    }

    #[test]
    fn long_names_are_truncated_to_100_chars() {
        let long = "あ".repeat(250);
        assert_eq!(normalize_dict_name(&long).chars().count(), 100);
    }

    #[test]
    fn control_characters_are_removed() {
        assert_eq!(normalize_dict_name("a\u{0}b\u{1F}c\u{7F}d"), "abcd");
    }

    #[test]
    fn format_and_clean_round_trip() {
        for name in ["JMdict", "Test_Dict", "辞書.第２版"] {
            let normalized = normalize_dict_name(name);
            let table = format_table_name(12, &normalized);
            assert_eq!(clean_table_name(&table), normalized);
        }
    }

    #[test]
    fn clean_leaves_unprefixed_names_alone() {
        assert_eq!(clean_table_name("JMdict"), "JMdict");
        assert_eq!(clean_table_name("lexicon"), "lexicon");
    }

    #[test]
    fn clean_strips_only_the_leading_prefix() {
        assert_eq!(clean_table_name("l5namel3namex"), "l3namex");
    }
}
