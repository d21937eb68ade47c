// ============================================================
// Layer 4 — Pre-trained Embedding Loader
// ============================================================
// Builds the LSTM's embedding matrix from a pre-trained
// word-vector file.
//
// Supported formats:
//
//   GloVe (text)       one vector per line
//     the 0.418 0.24968 -0.41242 ...
//
//   Word2Vec (binary)  "<count> <dim>\n" header, then per word
//     <word bytes><space><dim × f32 little-endian>[\n]
//
// Only vectors for words in the sequence vocabulary are kept.
// Matrix rows for vocabulary words missing from the file stay
// zero. Without a configured width, a GloVe file takes the
// most common width among its first lines. Malformed GloVe
// lines (bad number, wrong width) are skipped and counted; a
// bad Word2Vec header, a truncated record, or a file with no
// usable vectors is an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbeddingFormat {
    Glove,
    Word2Vec,
}

impl EmbeddingFormat {
    /// Vector width of the files the pipeline is usually run with.
    pub fn default_dim(self) -> usize {
        match self {
            EmbeddingFormat::Glove    => 50,
            EmbeddingFormat::Word2Vec => 300,
        }
    }
}

/// Dense `[rows, dim]` matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    rows: usize,
    dim:  usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    pub fn zeros(rows: usize, dim: usize) -> Self {
        Self { rows, dim, data: vec![0.0; rows * dim] }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    fn set_row(&mut self, index: usize, values: &[f32]) {
        self.data[index * self.dim..(index + 1) * self.dim].copy_from_slice(values);
    }
}

#[cfg(test)]
impl EmbeddingMatrix {
    /// Wrap row-major data; None if `data` is not `rows * dim` long.
    pub fn from_vec(rows: usize, dim: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == rows * dim).then_some(Self { rows, dim, data })
    }

    pub fn row(&self, index: usize) -> &[f32] {
        &self.data[index * self.dim..(index + 1) * self.dim]
    }
}

/// What happened while reading an embedding file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbeddingStats {
    /// Well-formed vectors found in the file.
    pub vectors_read: usize,
    /// Vocabulary rows that received a vector.
    pub matched:      usize,
    /// Lines skipped as malformed.
    pub malformed:    usize,
}

pub struct EmbeddingLoader {
    path:   PathBuf,
    format: EmbeddingFormat,
    dim:    Option<usize>,
}

impl EmbeddingLoader {
    /// `dim = None` takes the width from the file itself.
    pub fn new(path: impl Into<PathBuf>, format: EmbeddingFormat, dim: Option<usize>) -> Self {
        Self { path: path.into(), format, dim }
    }

    /// Build a `[vocab_size, dim]` matrix indexed by `vocab`.
    pub fn build_matrix(
        &self,
        vocab:      &HashMap<String, u32>,
        vocab_size: usize,
    ) -> Result<(EmbeddingMatrix, EmbeddingStats)> {
        let file = File::open(&self.path)
            .map_err(|source| PipelineError::Io { path: self.path.clone(), source })?;
        let reader = BufReader::new(file);

        let mut found: HashMap<u32, Vec<f32>> = HashMap::new();
        let mut keep = |word: &str, vector: Vec<f32>| {
            if let Some(&idx) = vocab.get(word) {
                if (idx as usize) < vocab_size {
                    found.entry(idx).or_insert(vector);
                }
            }
        };

        let (dim, mut stats) = match self.format {
            EmbeddingFormat::Glove    => self.read_glove(reader, &mut keep)?,
            EmbeddingFormat::Word2Vec => self.read_word2vec(reader, &mut keep)?,
        };

        if stats.vectors_read == 0 {
            return Err(PipelineError::embedding(&self.path, "no valid vectors found"));
        }

        let mut matrix = EmbeddingMatrix::zeros(vocab_size, dim);
        for (idx, vector) in &found {
            matrix.set_row(*idx as usize, vector);
        }
        stats.matched = found.len();

        tracing::info!(
            "Found {} word vectors in '{}' ({} matched of {} vocabulary rows, {} malformed skipped)",
            stats.vectors_read,
            self.path.display(),
            stats.matched,
            vocab_size,
            stats.malformed
        );
        Ok((matrix, stats))
    }

    fn read_glove<R: BufRead>(
        &self,
        reader: R,
        keep:   &mut impl FnMut(&str, Vec<f32>),
    ) -> Result<(usize, EmbeddingStats)> {
        let mut stats  = EmbeddingStats::default();
        let mut dim    = self.dim;
        let mut sample = Vec::with_capacity(WIDTH_SAMPLE);

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| PipelineError::Io { path: self.path.clone(), source })?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else { continue };

            let vector: std::result::Result<Vec<f32>, _> = parts.map(str::parse::<f32>).collect();
            let vector = match vector {
                Ok(v) if !v.is_empty() => v,
                _ => {
                    tracing::debug!("Skipping malformed embedding line {}", line_no + 1);
                    stats.malformed += 1;
                    continue;
                }
            };

            match dim {
                Some(expected) => accept(&mut stats, &mut *keep, word, vector, expected),
                None => {
                    sample.push((word.to_string(), vector));
                    if sample.len() == WIDTH_SAMPLE {
                        let width = dominant_width(&sample);
                        dim = Some(width);
                        for (w, v) in sample.drain(..) {
                            accept(&mut stats, &mut *keep, &w, v, width);
                        }
                    }
                }
            }
        }

        // Files shorter than the sample
        if dim.is_none() && !sample.is_empty() {
            let width = dominant_width(&sample);
            dim = Some(width);
            for (w, v) in sample.drain(..) {
                accept(&mut stats, &mut *keep, &w, v, width);
            }
        }

        if stats.malformed > 0 {
            tracing::warn!(
                "Skipped {} malformed lines in '{}'",
                stats.malformed,
                self.path.display()
            );
        }
        let dim = dim.unwrap_or_else(|| self.format.default_dim());
        Ok((dim, stats))
    }

    fn read_word2vec<R: BufRead>(
        &self,
        mut reader: R,
        keep:       &mut impl FnMut(&str, Vec<f32>),
    ) -> Result<(usize, EmbeddingStats)> {
        let io_err = |source| PipelineError::Io { path: self.path.clone(), source };

        let mut header = String::new();
        reader.read_line(&mut header).map_err(io_err)?;
        let mut fields = header.split_whitespace().map(str::parse::<usize>);
        let (count, dim) = match (fields.next(), fields.next()) {
            (Some(Ok(count)), Some(Ok(dim))) if dim > 0 => (count, dim),
            _ => {
                return Err(PipelineError::embedding(
                    &self.path,
                    format!("bad word2vec header '{}'", header.trim()),
                ))
            }
        };
        if let Some(expected) = self.dim {
            if expected != dim {
                return Err(PipelineError::embedding(
                    &self.path,
                    format!("vectors have {dim} dimensions, expected {expected}"),
                ));
            }
        }

        let mut stats = EmbeddingStats::default();
        let mut word  = Vec::new();
        let mut bytes = vec![0u8; dim * 4];

        for i in 0..count {
            word.clear();
            let n = reader.read_until(b' ', &mut word).map_err(io_err)?;
            if n == 0 || word.last() != Some(&b' ') {
                return Err(PipelineError::embedding(
                    &self.path,
                    format!("truncated after {i} of {count} vectors"),
                ));
            }
            word.pop();

            reader.read_exact(&mut bytes).map_err(|_| {
                PipelineError::embedding(&self.path, format!("truncated vector #{}", i + 1))
            })?;
            let vector: Vec<f32> = bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();

            let text = String::from_utf8_lossy(&word);
            let text = text.trim_start_matches(['\n', '\r']);
            stats.vectors_read += 1;
            keep(text, vector);
        }
        Ok((dim, stats))
    }
}

/// Leading GloVe lines used to pick the vector width when none is configured.
const WIDTH_SAMPLE: usize = 100;

/// Most common vector width in `sample`; ties go to the one seen first.
fn dominant_width(sample: &[(String, Vec<f32>)]) -> usize {
    let mut counts: Vec<(usize, usize)> = Vec::new();
    for (_, v) in sample {
        match counts.iter_mut().find(|(w, _)| *w == v.len()) {
            Some((_, c)) => *c += 1,
            None => counts.push((v.len(), 1)),
        }
    }
    counts
        .iter()
        .rev()
        .max_by_key(|(_, c)| *c)
        .map_or(0, |(w, _)| *w)
}

fn accept(
    stats:    &mut EmbeddingStats,
    keep:     &mut impl FnMut(&str, Vec<f32>),
    word:     &str,
    vector:   Vec<f32>,
    expected: usize,
) {
    if vector.len() == expected {
        stats.vectors_read += 1;
        keep(word, vector);
    } else {
        tracing::debug!("Skipping '{}': {} values, expected {}", word, vector.len(), expected);
        stats.malformed += 1;
    }
}
