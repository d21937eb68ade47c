// ============================================================
// Layer 4 — Tweet Cleaner
// ============================================================
// Turns raw tweet text into the normalised token string that
// both vectorizers consume.
//
// Cleaning steps (applied in order):
//   1. Normalise apostrophes, whitespace and control chars
//   2. Lowercase
//   3. Remove URLs and e-mail addresses
//   4. Expand contractions ("can't" → "cannot")
//   5. Replace everything except a-z with a space
//      (digits, punctuation, emoji, '@' and '#')
//   6. Drop stopwords, lemmatize, drop stopwords again
//      (a lemma can itself be a stopword)
//   7. Join the surviving tokens with single spaces
//
// Output never contains characters that steps 1-5 rewrite and
// every token is a lemmatizer fixed point, so cleaning an
// already-cleaned string returns it unchanged.
//
// Example:
//   "I LOVE this!! http://x.com" → "love"

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::{contractions, lemmatizer::lemmatize, stopwords::is_stopword};
use crate::domain::record::{CleanRecord, RawRecord};

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:https?://|www\.)\S+").expect("valid url pattern"));

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}").expect("valid email pattern")
});

pub struct TextCleaner;

impl TextCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Clean a single text. Empty or all-noise input gives "".
    pub fn clean(&self, text: &str) -> String {
        // ── Step 1-2: character normalisation ────────────────────────────────
        let normalised: String = text
            .chars()
            .map(|c| match c {
                '\u{2019}' | '\u{2018}' | '\u{00B4}' | '`' => '\'',
                '\t' | '\r' | '\n' | '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_control() => ' ',
                c => c,
            })
            .collect::<String>()
            .to_lowercase();

        // ── Step 3: links and addresses ──────────────────────────────────────
        let without_urls   = URL.replace_all(&normalised, " ");
        let without_emails = EMAIL.replace_all(&without_urls, " ");

        // ── Step 4: contractions ─────────────────────────────────────────────
        let expanded = contractions::expand(&without_emails);

        // ── Step 5: letters only ─────────────────────────────────────────────
        let letters: String = expanded
            .chars()
            .map(|c| if c.is_ascii_lowercase() { c } else { ' ' })
            .collect();

        // ── Step 6-7: tokens ─────────────────────────────────────────────────
        letters
            .split_whitespace()
            .filter(|token| !is_stopword(token))
            .map(lemmatize)
            .filter(|lemma| !is_stopword(lemma))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Clean every record, dropping the Irrelevant ones.
    pub fn clean_records(&self, records: Vec<RawRecord>) -> Vec<CleanRecord> {
        let total = records.len();
        let cleaned: Vec<CleanRecord> = records
            .into_iter()
            .filter_map(|r| {
                let sentiment = r.label.sentiment()?;
                let clean_text = self.clean(&r.text);
                Some(CleanRecord { text: r.text, clean_text, sentiment })
            })
            .collect();

        let empty = cleaned.iter().filter(|r| r.clean_text.is_empty()).count();
        tracing::info!(
            "Cleaned {} records ({} irrelevant dropped, {} empty after cleaning)",
            cleaned.len(),
            total - cleaned.len(),
            empty
        );
        cleaned
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}
