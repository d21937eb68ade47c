// ============================================================
// Layer 4 — English Stopwords
// ============================================================
// NLTK's English stopword list, minus the negations "no",
// "nor" and "not" which flip a tweet's sentiment. The list
// already carries the fragments left once apostrophes are
// stripped ("didn", "ll", "ve", ...).

use once_cell::sync::Lazy;
use std::collections::HashSet;
use stop_words::{get, LANGUAGE};

/// Negations carry sentiment and are never dropped.
const KEPT: [&str; 3] = ["no", "nor", "not"];

// NLTK's list also spells out forms like "don't"; after cleaning
// only the apostrophe-free fragments can ever match
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    get(LANGUAGE::English)
        .iter()
        .copied()
        .filter(|w| !w.contains('\'') && !KEPT.contains(w))
        .collect()
});

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_words_are_stopwords() {
        assert!(is_stopword("the"));
        assert!(is_stopword("didn"));
        assert!(is_stopword("ve"));
    }

    #[test]
    fn test_apostrophe_forms_are_not_kept() {
        assert!(!is_stopword("don't"));
        assert!(STOPWORDS.iter().all(|w| !w.contains('\'')));
    }

    #[test]
    fn test_negations_are_kept() {
        assert!(!is_stopword("not"));
        assert!(!is_stopword("no"));
        assert!(!is_stopword("nor"));
        assert!(!is_stopword("cannot"));
    }
}
