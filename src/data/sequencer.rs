// ============================================================
// Layer 4 — Sequence Encoder
// ============================================================
// Maps cleaned text to fixed-length sequences of vocabulary
// indices for the LSTM classifier.
//
// Vocabulary layout (fitted on the TRAINING corpus only):
//
//   0      <PAD>   padding, never produced by a word
//   1      <OOV>   every word not seen during fit
//   2..    words by descending frequency (ties alphabetical)
//
// The vocabulary is stored as a HuggingFace WordLevel
// tokenizer so it can be saved as a standard tokenizer.json
// and reloaded for inference.
//
// Encoding truncates at the end and pads at the end:
//
//   fitted on "great game great fun" + "game over", max_len = 5
//   (game=2, great=3, fun=4, over=5)
//   "great game great fun"        → [3, 2, 3, 4, 0]
//   "great game great fun a b c"  → [3, 2, 3, 4, 1]

use std::collections::HashMap;
use std::str::FromStr;
use tokenizers::Tokenizer;

use crate::error::{PipelineError, Result};

pub const PAD_TOKEN: &str = "<PAD>";
pub const OOV_TOKEN: &str = "<OOV>";
pub const PAD_ID: u32 = 0;
pub const OOV_ID: u32 = 1;

/// Default sequence length fed to the LSTM.
pub const DEFAULT_MAX_LEN: usize = 50;

/// One padded sequence plus how many leading entries are real tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSequence {
    pub ids:    Vec<u32>,
    pub length: usize,
}

#[derive(Debug, Clone)]
pub struct SequenceEncoder {
    tokenizer: Tokenizer,
    max_len:   usize,
}

impl SequenceEncoder {
    /// Build the vocabulary from training documents.
    /// `max_words` caps the vocabulary size, special tokens included.
    pub fn fit<S: AsRef<str>>(
        docs:      &[S],
        max_len:   usize,
        max_words: Option<usize>,
    ) -> Result<Self> {
        if docs.is_empty() {
            return Err(PipelineError::EmptyCorpus("sequence encoder"));
        }

        let mut freq: HashMap<&str, usize> = HashMap::new();
        for doc in docs {
            for word in doc.as_ref().split_whitespace() {
                *freq.entry(word).or_insert(0) += 1;
            }
        }

        let mut words: Vec<(&str, usize)> = freq
            .into_iter()
            .filter(|(w, _)| *w != PAD_TOKEN && *w != OOV_TOKEN)
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        if let Some(cap) = max_words {
            words.truncate(cap.saturating_sub(2));
        }
        if words.is_empty() {
            tracing::warn!("Sequence vocabulary is empty; every token will map to {OOV_TOKEN}");
        }

        let mut vocab = serde_json::Map::new();
        vocab.insert(PAD_TOKEN.to_string(), PAD_ID.into());
        vocab.insert(OOV_TOKEN.to_string(), OOV_ID.into());
        for (i, (word, _)) in words.iter().enumerate() {
            vocab.insert((*word).to_string(), (i as u32 + 2).into());
        }

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": { "type": "WhitespaceSplit" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": OOV_TOKEN
            }
        });

        let tokenizer = Tokenizer::from_str(&tokenizer_json.to_string())
            .map_err(|e| PipelineError::Tokenizer(e.to_string()))?;

        tracing::info!(
            "Sequence vocabulary fitted on {} documents: {} entries, max_len={}",
            docs.len(),
            words.len() + 2,
            max_len
        );
        Ok(Self { tokenizer, max_len })
    }

    /// Wrap a tokenizer previously produced by `fit`.
    pub fn from_tokenizer(tokenizer: Tokenizer, max_len: usize) -> Self {
        Self { tokenizer, max_len }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Rows of the embedding matrix: highest index + 1.
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(false)
    }

    pub fn vocab(&self) -> HashMap<String, u32> {
        self.tokenizer.get_vocab(false)
    }

    /// Encode one document to exactly `max_len` ids.
    pub fn encode(&self, doc: &str) -> Result<EncodedSequence> {
        let encoding = self
            .tokenizer
            .encode(doc, false)
            .map_err(|e| PipelineError::Tokenizer(e.to_string()))?;

        let mut ids: Vec<u32> = encoding.get_ids().iter().copied().take(self.max_len).collect();
        let length = ids.len();
        ids.resize(self.max_len, PAD_ID);
        Ok(EncodedSequence { ids, length })
    }

    pub fn encode_all<S: AsRef<str>>(&self, docs: &[S]) -> Result<Vec<EncodedSequence>> {
        docs.iter().map(|d| self.encode(d.as_ref())).collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn encoder(max_len: usize) -> SequenceEncoder {
        SequenceEncoder::fit(&["great game great fun", "game over"], max_len, None).unwrap()
    }

    #[test]
    fn test_indices_follow_frequency() {
        let e = encoder(5);
        let vocab = e.vocab();
        assert_eq!(vocab[PAD_TOKEN], PAD_ID);
        assert_eq!(vocab[OOV_TOKEN], OOV_ID);
        // game (2) and great (2) tie → alphabetical, then fun, over
        assert_eq!(vocab["game"], 2);
        assert_eq!(vocab["great"], 3);
        assert_eq!(vocab["fun"], 4);
        assert_eq!(vocab["over"], 5);
        assert_eq!(e.vocab_size(), 6);
    }

    #[test]
    fn test_encodes_to_fixed_length() {
        let e = encoder(5);
        assert_eq!(e.encode("great game great fun").unwrap().ids, vec![3, 2, 3, 4, 0]);
        assert_eq!(e.encode("great game great fun a b c").unwrap().ids, vec![3, 2, 3, 4, 1]);
    }

    #[test]
    fn test_pads_at_the_end() {
        let e = encoder(6);
        let s = e.encode("great fun").unwrap();
        assert_eq!(s.ids, vec![3, 4, 0, 0, 0, 0]);
        assert_eq!(s.length, 2);
    }

    #[test]
    fn test_truncates_at_the_end() {
        let e = encoder(3);
        let s = e.encode("fun over game great").unwrap();
        assert_eq!(s.ids, vec![4, 5, 2]);
        assert_eq!(s.length, 3);
    }

    #[test]
    fn test_unseen_words_map_to_oov() {
        let e = encoder(4);
        let s = e.encode("great unseen").unwrap();
        assert_eq!(s.ids, vec![3, OOV_ID, 0, 0]);
    }

    #[test]
    fn test_every_sequence_has_configured_length() {
        let e = encoder(7);
        let docs = ["", "great", "a b c d e f g h i j k l", "game game game game game game game"];
        for s in e.encode_all(&docs).unwrap() {
            assert_eq!(s.ids.len(), 7);
            assert!(s.length <= 7);
        }
    }

    #[test]
    fn test_max_words_caps_vocabulary() {
        let e = SequenceEncoder::fit(&["a a a b b c"], 10, Some(4)).unwrap();
        assert_eq!(e.vocab_size(), 4);
        assert_eq!(e.encode("c").unwrap().ids[0], OOV_ID);
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let empty: [&str; 0] = [];
        assert!(SequenceEncoder::fit(&empty, 5, None).is_err());
    }
}
