// ============================================================
// Layer 4 — Contraction Expansion
// ============================================================
// Expands English contractions in lowercase text:
//
//   "i can't believe it's over" → "i cannot believe it is over"
//
// Whole-word irregular forms are looked up first, then the
// regular suffixes are rewritten. A trailing "'s" that is not
// in the table is treated as a possessive and dropped.
// Expects apostrophes already normalised to ASCII '\''.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static CONTRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]*'[a-z]+").expect("valid contraction pattern"));

static IRREGULAR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("ain't",   "am not"),
        ("can't",   "cannot"),
        ("won't",   "will not"),
        ("shan't",  "shall not"),
        ("let's",   "let us"),
        ("y'all",   "you all"),
        ("ma'am",   "madam"),
        ("o'clock", "of the clock"),
        ("'cause",  "because"),
        ("it's",    "it is"),
        ("he's",    "he is"),
        ("she's",   "she is"),
        ("that's",  "that is"),
        ("there's", "there is"),
        ("here's",  "here is"),
        ("what's",  "what is"),
        ("where's", "where is"),
        ("who's",   "who is"),
        ("how's",   "how is"),
        ("when's",  "when is"),
        ("why's",   "why is"),
    ]
    .into_iter()
    .collect()
});

/// Expand every contraction found in `text`.
pub fn expand(text: &str) -> String {
    if !text.contains('\'') {
        return text.to_string();
    }
    CONTRACTION
        .replace_all(text, |caps: &Captures| expand_word(&caps[0]))
        .into_owned()
}

fn expand_word(word: &str) -> String {
    if let Some(full) = IRREGULAR.get(word) {
        return (*full).to_string();
    }
    if let Some(stem) = word.strip_suffix("n't") {
        return format!("{stem} not");
    }

    let Some((stem, suffix)) = word.split_once('\'') else {
        return word.to_string();
    };
    let expansion = match suffix {
        "re" => "are",
        "ve" => "have",
        "ll" => "will",
        "d"  => "would",
        "m"  => "am",
        "s"  => "",
        other => other,
    };
    if expansion.is_empty() {
        stem.to_string()
    } else {
        format!("{stem} {expansion}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irregular_forms() {
        assert_eq!(expand("i can't"), "i cannot");
        assert_eq!(expand("won't stop"), "will not stop");
        assert_eq!(expand("it's late"), "it is late");
    }

    #[test]
    fn test_regular_suffixes() {
        assert_eq!(expand("don't"), "do not");
        assert_eq!(expand("we're here"), "we are here");
        assert_eq!(expand("they've gone"), "they have gone");
        assert_eq!(expand("you'll see"), "you will see");
        assert_eq!(expand("i'd go"), "i would go");
        assert_eq!(expand("i'm fine"), "i am fine");
    }

    #[test]
    fn test_possessive_is_dropped() {
        assert_eq!(expand("john's game"), "john game");
    }

    #[test]
    fn test_text_without_apostrophes_is_untouched() {
        assert_eq!(expand("nothing to see"), "nothing to see");
    }

    #[test]
    fn test_punctuation_next_to_contraction() {
        assert_eq!(expand("don't!"), "do not!");
    }
}
