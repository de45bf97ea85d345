use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

lazy_static! {
    static ref TOKEN_REGEX: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

/// Sparse row: `(feature index, value)` pairs sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

/// Unigram + bigram TF-IDF with smoothed IDF and L2-normalised rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learns the vocabulary from `documents`. Terms seen in fewer than
    /// `min_df` documents are dropped; of the rest, the `max_features` most
    /// frequent are kept.
    pub fn fit(documents: &[String], min_df: usize, max_features: usize) -> Self {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        let mut term_frequency: HashMap<String, usize> = HashMap::new();

        for document in documents {
            let terms = analyze(document);
            let mut seen = HashSet::new();
            for term in terms {
                *term_frequency.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.clone()) {
                    *document_frequency.entry(term).or_insert(0) += 1;
                }
            }
        }

        let mut candidates: Vec<(String, usize)> = term_frequency
            .into_iter()
            .filter(|(term, _)| document_frequency[term] >= min_df.max(1))
            .collect();
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        candidates.truncate(max_features);

        let mut terms: Vec<String> = candidates.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = documents.len() as f64;
        let idf = terms
            .iter()
            .map(|term| ((1.0 + n) / (1.0 + document_frequency[term] as f64)).ln() + 1.0)
            .collect();
        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        log::debug!("TF-IDF vocabulary fitted on {} documents", documents.len());

        Self { vocabulary, idf }
    }

    pub fn feature_count(&self) -> usize {
        self.idf.len()
    }

    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(document) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVector = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in row.iter_mut() {
                *value /= norm;
            }
        }
        row
    }
}

/// Tokens of two or more word characters, followed by adjacent bigrams.
fn analyze(document: &str) -> Vec<String> {
    let tokens: Vec<&str> = TOKEN_REGEX.find_iter(document).map(|m| m.as_str()).collect();
    let mut terms: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    terms
}

/// Value of feature `index` in a sparse row.
pub fn feature_value(row: &SparseVector, index: usize) -> f64 {
    row.binary_search_by_key(&index, |(i, _)| *i)
        .map(|pos| row[pos].1)
        .unwrap_or(0.0)
}
