use std::collections::{BTreeMap, HashMap};

use log::info;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::text::tokenize;
use crate::model_manager::ModelError;

/// A document as `(term index, weight)` pairs sorted by term index.
pub type SparseRow = Vec<(usize, f64)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Keep only the most frequent terms across the corpus
    pub max_features: Option<usize>,
    /// Smallest and largest n-gram length, inclusive
    pub ngram_range: (usize, usize),
    /// Terms in fewer documents are dropped
    pub min_df: usize,
    /// Terms in more than this fraction of documents are dropped
    pub max_df: f64,
    /// Use `1 + ln(tf)` instead of raw counts
    pub sublinear_tf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: Some(5000),
            ngram_range: (1, 2),
            min_df: 2,
            max_df: 0.8,
            sublinear_tf: true,
        }
    }
}

/// TF-IDF weighting over word n-grams with smoothed IDF and L2-normalized rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocabulary: HashMap<String, usize>,
    terms: Vec<String>,
    idf: Array1<f64>,
}

impl TfidfVectorizer {
    /// Word n-grams of a document, unigrams first.
    pub fn analyze(&self, doc: &str) -> Vec<String> {
        analyze(doc, self.config.ngram_range)
    }

    /// Learns the vocabulary and IDF weights from a corpus.
    ///
    /// # Errors
    /// `ModelError::Training` when the corpus is empty or pruning leaves no terms.
    pub fn fit<S: AsRef<str>>(docs: &[S], config: VectorizerConfig) -> Result<Self, ModelError> {
        if docs.is_empty() {
            return Err(ModelError::Training("cannot fit a vectorizer on an empty corpus".into()));
        }
        let n_docs = docs.len();

        // term -> (document frequency, corpus frequency)
        let mut stats: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for doc in docs {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for term in analyze(doc.as_ref(), config.ngram_range) {
                *counts.entry(term).or_insert(0) += 1;
            }
            for (term, count) in counts {
                let entry = stats.entry(term).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += count;
            }
        }

        let max_doc_count = config.max_df * n_docs as f64;
        let mut kept: Vec<(String, usize, usize)> = stats
            .into_iter()
            .filter(|(_, (df, _))| *df >= config.min_df && (*df as f64) <= max_doc_count)
            .map(|(term, (df, tf))| (term, df, tf))
            .collect();

        if let Some(limit) = config.max_features {
            if kept.len() > limit {
                // most frequent first, alphabetical among equals
                kept.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
                kept.truncate(limit);
                kept.sort_by(|a, b| a.0.cmp(&b.0));
            }
        }

        if kept.is_empty() {
            return Err(ModelError::Training(
                "After pruning, no terms remain. Try a lower min_df or a higher max_df.".into(),
            ));
        }

        let n = n_docs as f64;
        let idf = Array1::from_iter(kept.iter().map(|(_, df, _)| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0));
        let terms: Vec<String> = kept.into_iter().map(|(term, _, _)| term).collect();
        let vocabulary = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        info!("Vectorizer fitted on {} documents, {} terms kept", n_docs, terms.len());
        Ok(Self {
            config,
            vocabulary,
            terms,
            idf,
        })
    }

    /// TF-IDF weights of one document. Out-of-vocabulary terms are ignored.
    pub fn transform(&self, doc: &str) -> SparseRow {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for term in self.analyze(doc) {
            if let Some(&i) = self.vocabulary.get(&term) {
                *counts.entry(i).or_insert(0) += 1;
            }
        }

        let mut row: SparseRow = counts
            .into_iter()
            .map(|(i, count)| {
                let tf = if self.config.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                (i, tf * self.idf[i])
            })
            .collect();

        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 1e-10 {
            for (_, w) in row.iter_mut() {
                *w /= norm;
            }
        }
        row
    }

    /// Vocabulary terms by feature index.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn n_features(&self) -> usize {
        self.terms.len()
    }

    pub fn idf(&self) -> &Array1<f64> {
        &self.idf
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }
}

fn analyze(doc: &str, (min_n, max_n): (usize, usize)) -> Vec<String> {
    let tokens = tokenize(doc);
    let mut grams = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n == 1 {
            grams.extend(tokens.iter().map(|t| t.to_string()));
        } else {
            grams.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
    }
    grams
}
