use unicode_normalization::UnicodeNormalization;

/// Lower-cases, strips combining accents and trims, so that "Éléonore " and "eleonore" compare equal.
pub fn normalize_text(value: &str) -> String {
    value
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Case- and accent-insensitive substring match. An empty query matches everything; a missing value matches only
/// an empty query.
pub fn matches_query(value: Option<&str>, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let value = value.unwrap_or_default();
    let raw = value.to_lowercase();
    if raw.contains(query.to_lowercase().trim()) {
        return true;
    }
    normalize_text(value).contains(&normalize_text(query))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn folds_accents_and_case() {
        assert_eq!(normalize_text("  Éléonore "), "eleonore");
        assert!(matches_query(Some("Hélène Dupré"), "helene"));
        assert!(matches_query(Some("helene"), "HÉLÈNE"));
        assert!(!matches_query(Some("helene"), "marc"));
    }

    #[test]
    fn empty_queries_match_everything() {
        assert!(matches_query(None, ""));
        assert!(matches_query(Some("x"), "   "));
        assert!(!matches_query(None, "x"));
    }
}
