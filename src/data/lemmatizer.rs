// ============================================================
// Layer 4 — Rule-based Noun Lemmatizer
// ============================================================
// Reduces plural nouns to their singular form:
//
//   "games" → "game"     "parties" → "party"
//   "boxes" → "box"      "classes" → "class"
//   "children" → "child" "movies"  → "movie"
//
// Every rule only fires on words ending in 's' and never
// produces a word that another rule would rewrite, so
// lemmatize(lemmatize(w)) == lemmatize(w).

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Irregular plurals plus '-ies' nouns whose singular ends in '-ie'
/// and '-ches' nouns whose singular ends in '-che'.
static IRREGULAR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("people", "person"),
        ("mice", "mouse"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("leaves", "leaf"),
        ("lives", "life"),
        ("wives", "wife"),
        ("knives", "knife"),
        ("halves", "half"),
        ("wolves", "wolf"),
        ("shelves", "shelf"),
        ("thieves", "thief"),
        ("movies", "movie"),
        ("cookies", "cookie"),
        ("zombies", "zombie"),
        ("selfies", "selfie"),
        ("hoodies", "hoodie"),
        ("goodies", "goodie"),
        ("rookies", "rookie"),
        ("brownies", "brownie"),
        ("calories", "calorie"),
        ("lies", "lie"),
        ("ties", "tie"),
        ("pies", "pie"),
        ("dies", "die"),
        ("aches", "ache"),
        ("headaches", "headache"),
        ("caches", "cache"),
        ("niches", "niche"),
        ("avalanches", "avalanche"),
    ]
    .into_iter()
    .collect()
});

/// Words ending in 's' that are not plurals.
static INVARIANT: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "always", "perhaps", "news", "series", "species", "yes", "thus", "plus",
        "chaos", "lens", "whereas", "sometimes", "afterwards", "towards",
        "besides", "physics", "politics", "economics", "mathematics",
        "athletics", "christmas", "texas", "vegas", "atlas", "canvas", "alias",
        "bias", "gas", "pancreas", "los", "las", "ps",
    ]
    .into_iter()
    .collect()
});

/// Shortest word the suffix rules will touch.
const MIN_RULE_LEN: usize = 4;

/// Return the lemma of a single lowercase ASCII token.
pub fn lemmatize(word: &str) -> String {
    let lemma = strip_plural(word);
    // A rule can land on an irregular plural ("childrens" → "children").
    IRREGULAR.get(lemma.as_str()).map_or(lemma, |l| (*l).to_string())
}

fn strip_plural(word: &str) -> String {
    if let Some(lemma) = IRREGULAR.get(word) {
        return (*lemma).to_string();
    }
    if word.len() < MIN_RULE_LEN || !word.ends_with('s') || INVARIANT.contains(word) {
        return word.to_string();
    }

    if word.ends_with("sses") {
        return word[..word.len() - 2].to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["xes", "shes", "ches", "zzes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    word[..word.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        assert_eq!(lemmatize("games"), "game");
        assert_eq!(lemmatize("parties"), "party");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("watches"), "watch");
        assert_eq!(lemmatize("classes"), "class");
    }

    #[test]
    fn test_irregular_plurals() {
        assert_eq!(lemmatize("children"), "child");
        assert_eq!(lemmatize("movies"), "movie");
        assert_eq!(lemmatize("headaches"), "headache");
        assert_eq!(lemmatize("childrens"), "child");
    }

    #[test]
    fn test_non_plurals_are_kept() {
        for w in ["bus", "analysis", "glass", "news", "was", "love", "christmas"] {
            assert_eq!(lemmatize(w), w);
        }
    }

    #[test]
    fn test_lemmatize_is_idempotent() {
        let words = [
            "games", "parties", "boxes", "classes", "children", "movies", "glasses",
            "buzzes", "wishes", "bus", "series", "cats", "dogs", "ideas", "xs", "peoples",
        ];
        for w in words {
            let once = lemmatize(w);
            assert_eq!(lemmatize(&once), once, "not idempotent for {w}");
        }
    }
}
