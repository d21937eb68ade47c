// ============================================================
// Layer 4 — TF-IDF Vectorizer
// ============================================================
// Bag-of-words features for the dense classifier.
//
// fit():
//   - count unigrams + bigrams over the TRAINING corpus only
//   - keep the `max_features` most frequent terms
//     (ties broken alphabetically so fits are reproducible)
//   - number the kept terms in alphabetical order
//   - idf(t) = ln((1 + n_docs) / (1 + df(t))) + 1
//
// transform():
//   - raw term counts × idf, then L2-normalised
//   - terms outside the fitted vocabulary are ignored, so a
//     held-out document can never add a column
//
// Vectors are kept sparse; the batcher densifies one batch
// at a time.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{PipelineError, Result};

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 10_000;

/// A document vector with only its non-zero entries stored.
/// `indices` is strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values:  Vec<f32>,
}

impl SparseVector {
    /// Write the vector into a zeroed dense row.
    pub fn scatter_into(&self, row: &mut [f32]) {
        for (&i, &v) in self.indices.iter().zip(&self.values) {
            row[i as usize] = v;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: usize,
    ngram_range:  (usize, usize),
    vocabulary:   HashMap<String, u32>,
    idf:          Vec<f32>,
}

impl TfidfVectorizer {
    /// Unigrams and bigrams, capped at `max_features` terms.
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            ngram_range: (1, 2),
            vocabulary:  HashMap::new(),
            idf:         Vec::new(),
        }
    }

    /// Number of feature columns. Zero until fitted.
    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary(&self) -> &HashMap<String, u32> {
        &self.vocabulary
    }

    fn ngrams(&self, doc: &str) -> Vec<String> {
        let tokens: Vec<&str> = doc.split_whitespace().collect();
        let mut grams = Vec::new();
        for n in self.ngram_range.0..=self.ngram_range.1 {
            if tokens.len() < n {
                break;
            }
            grams.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        grams
    }

    /// Learn vocabulary and idf weights from the training documents.
    pub fn fit<S: AsRef<str>>(&mut self, docs: &[S]) -> Result<()> {
        if docs.is_empty() {
            return Err(PipelineError::EmptyCorpus("tf-idf vectorizer"));
        }

        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq:  HashMap<String, usize> = HashMap::new();

        for doc in docs {
            let grams = self.ngrams(doc.as_ref());
            let unique: HashSet<&String> = grams.iter().collect();
            for g in unique {
                *doc_freq.entry(g.clone()).or_insert(0) += 1;
            }
            for g in grams {
                *term_freq.entry(g).or_insert(0) += 1;
            }
        }

        if term_freq.is_empty() {
            return Err(PipelineError::EmptyCorpus("tf-idf vocabulary"));
        }

        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        terms.sort();

        let n_docs = docs.len() as f32;
        self.idf = terms
            .iter()
            .map(|t| {
                let df = doc_freq[t] as f32;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t, i as u32))
            .collect();

        tracing::info!(
            "TF-IDF fitted on {} documents: {} features",
            docs.len(),
            self.dim()
        );
        Ok(())
    }

    /// Vectorize one document against the fitted vocabulary.
    pub fn transform_one(&self, doc: &str) -> SparseVector {
        let mut counts: HashMap<u32, f32> = HashMap::new();
        for g in self.ngrams(doc) {
            if let Some(&col) = self.vocabulary.get(&g) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(u32, f32)> = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * self.idf[col as usize]))
            .collect();
        entries.sort_by_key(|(col, _)| *col);

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, v) in entries.iter_mut() {
                *v /= norm;
            }
        }

        let (indices, values) = entries.into_iter().unzip();
        SparseVector { indices, values }
    }

    pub fn transform<S: AsRef<str>>(&self, docs: &[S]) -> Vec<SparseVector> {
        docs.iter().map(|d| self.transform_one(d.as_ref())).collect()
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}
