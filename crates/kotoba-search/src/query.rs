use kotoba_types::SearchMode;

/// Column a search mode matches against.
pub fn column(mode: SearchMode) -> &'static str {
    match mode {
        SearchMode::Definition | SearchMode::Example => "definition",
        SearchMode::Pronunciation => "pronunciation",
        _ => "term",
    }
}

/// Comparison operator for a search mode.
pub fn operator(mode: SearchMode) -> &'static str {
    match mode {
        SearchMode::Exact => "=",
        _ => "LIKE",
    }
}

/// Decorate terms with the LIKE wildcards of a search mode. Backward
/// search requires at least one character before the suffix, so it is not
/// a plain suffix match.
pub fn apply_wildcards(terms: &[String], mode: SearchMode) -> Vec<String> {
    terms
        .iter()
        .map(|t| match mode {
            SearchMode::Forward | SearchMode::Pronunciation => format!("{t}%"),
            SearchMode::Backward => format!("%_{t}"),
            SearchMode::Anywhere | SearchMode::Definition | SearchMode::Example => {
                format!("%{t}%")
            }
            SearchMode::Exact => t.clone(),
        })
        .collect()
}

/// OR-disjunction of `column op ?`, one condition per pattern, bound
/// positionally in pattern order.
pub fn predicate(column: &str, op: &str, count: usize) -> String {
    let mut clause = String::new();
    for idx in 0..count {
        if idx > 0 {
            clause.push_str(" OR ");
        }
        clause.push_str(&format!("{column} {op} ?"));
    }
    clause
}
