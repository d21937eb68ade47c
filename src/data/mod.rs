// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw CSV rows to burn tensor batches.
//
//   CSV files
//       │
//       ▼
//   CsvLoader        → reads text,label rows
//       │
//       ▼
//   TextCleaner      → lowercase, strip noise, expand
//       │               contractions, lemmatize, drop stopwords
//       ├──────────────────────────┐
//       ▼                          ▼
//   TfidfVectorizer           SequenceEncoder ──► EmbeddingLoader
//   (dense model)             (LSTM model)        (GloVe / Word2Vec)
//       │                          │
//       ▼                          ▼
//   SentimentDataset<TfidfSample>  SentimentDataset<SequenceSample>
//       │                          │
//       ▼                          ▼
//   TfidfBatcher              SequenceBatcher
//       │                          │
//       └────────────┬─────────────┘
//                    ▼
//              burn DataLoader → training loop
//
// Vectorizers are fitted on the training split only.

/// Reads labelled tweets from CSV
pub mod loader;

/// Normalises raw tweet text
pub mod preprocessor;

/// Contraction table used by the cleaner
pub mod contractions;

/// Plural → singular noun rules used by the cleaner
pub mod lemmatizer;

/// English stopword list used by the cleaner
pub mod stopwords;

/// TF-IDF bag-of-words features
pub mod tfidf;

/// Word → index sequences with padding
pub mod sequencer;

/// GloVe / Word2Vec embedding matrices
pub mod embeddings;

/// Implements Burn's Dataset trait for both sample types
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
