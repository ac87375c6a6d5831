use kotoba_types::ConjugationRule;

/// Expand a set of surface terms into candidate dictionary forms.
///
/// For every term and every rule whose inflected suffix matches, the
/// rightmost occurrence of the suffix is replaced with each of the rule's
/// dictionary forms. A rule may carry a prefix; when the candidate starts
/// with it, the prefix-stripped candidate is emitted as well. Candidates of
/// one character or less are dropped. The original terms always come first,
/// so exact-surface matching survives even when no rule applies.
pub fn expand(terms: &[String], rules: &[ConjugationRule]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();

    for term in terms {
        for rule in rules {
            if !term.ends_with(&rule.inflected) {
                continue;
            }
            for form in &rule.dict {
                let deinflected = replace_last(term, &rule.inflected, form);
                if let Some(prefix) = &rule.prefix {
                    if let Some(stripped) = deinflected.strip_prefix(prefix.as_str()) {
                        let stripped = stripped.to_string();
                        if !candidates.contains(&stripped) {
                            candidates.push(stripped);
                        }
                    }
                }
                if !candidates.contains(&deinflected) {
                    candidates.push(deinflected);
                }
            }
        }
    }

    candidates.retain(|c| c.chars().count() > 1);

    let mut out = terms.to_vec();
    for candidate in candidates {
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// Replace the rightmost occurrence of `old` in `s` with `new`.
fn replace_last(s: &str, old: &str, new: &str) -> String {
    match s.rfind(old) {
        Some(pos) => format!("{}{}{}", &s[..pos], new, &s[pos + old.len()..]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(inflected: &str, dict: &[&str], prefix: Option<&str>) -> ConjugationRule {
        ConjugationRule {
            inflected: inflected.to_string(),
            dict: dict.iter().map(|s| s.to_string()).collect(),
            prefix: prefix.map(|s| s.to_string()),
        }
    }

    #[test]
    fn masu_form_yields_dictionary_form() {
        let terms = vec!["食べます".to_string()];
        let rules = vec![rule("ます", &["る"], None)];
        let out = expand(&terms, &rules);
        assert!(out.contains(&"食べます".to_string()));
        assert!(out.contains(&"食べる".to_string()));
    }

    #[test]
    fn originals_survive_when_no_rule_matches() {
        let terms = vec!["cat".to_string()];
        let rules = vec![rule("ます", &["る"], None)];
        assert_eq!(expand(&terms, &rules), vec!["cat".to_string()]);
    }

    #[test]
    fn only_rightmost_suffix_occurrence_is_replaced() {
        let terms = vec!["tatata".to_string()];
        let rules = vec![rule("ta", &["xx"], None)];
        let out = expand(&terms, &rules);
        assert!(out.contains(&"tataxx".to_string()));
        assert!(!out.contains(&"xxtata".to_string()));
    }

    #[test]
    fn prefix_is_stripped_when_candidate_starts_with_it() {
        let terms = vec!["不明だった".to_string()];
        let rules = vec![rule("だった", &["だ"], Some("不"))];
        let out = expand(&terms, &rules);
        assert!(out.contains(&"不明だ".to_string()));
        assert!(out.contains(&"明だ".to_string()));
    }

    #[test]
    fn single_char_candidates_are_dropped() {
        let terms = vec!["ます".to_string()];
        let rules = vec![rule("ます", &["る"], None)];
        let out = expand(&terms, &rules);
        assert_eq!(out, vec!["ます".to_string()]);
    }

    #[test]
    fn candidates_are_unique() {
        let terms = vec!["走ります".to_string()];
        let rules = vec![rule("ります", &["る"], None), rule("ます", &["る", "る"], None)];
        let out = expand(&terms, &rules);
        let runs = out.iter().filter(|t| *t == "走る").count();
        assert_eq!(runs, 1);
        assert!(out.contains(&"走りる".to_string()));
    }
}
