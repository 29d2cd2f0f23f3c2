//! TF-IDF vectorizer over word n-grams.

use std::collections::{BTreeMap, HashMap};

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use super::sparse::{SparseMatrix, SparseRow};
use crate::error::{Result, TriageError};

/// Tokens shorter than this are ignored.
const MIN_TOKEN_CHARS: usize = 2;

/// TF-IDF settings. Fitting produces an immutable [`TfIdfModel`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfIdfVectorizer {
    /// Inclusive n-gram range.
    pub ngram_range: (usize, usize),
    /// Terms present in fewer documents are dropped.
    pub min_df: usize,
    /// Terms present in more than this fraction of documents are dropped.
    pub max_df: f64,
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        TfIdfVectorizer {
            ngram_range: (1, 3),
            min_df: 2,
            max_df: 0.8,
        }
    }
}

impl TfIdfVectorizer {
    pub fn new(ngram_range: (usize, usize), min_df: usize, max_df: f64) -> Self {
        TfIdfVectorizer {
            ngram_range,
            min_df,
            max_df,
        }
    }

    fn validate(&self) -> Result<()> {
        let (low, high) = self.ngram_range;
        if low == 0 || low > high {
            return Err(TriageError::invalid_config(format!(
                "invalid ngram range ({low}, {high})"
            )));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(TriageError::invalid_config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        Ok(())
    }

    /// Learn vocabulary and idf weights from normalized documents.
    pub fn fit(&self, documents: &[String]) -> Result<TfIdfModel> {
        self.validate()?;
        let n_documents = documents.len();
        if n_documents == 0 {
            return Err(TriageError::feature("cannot fit TF-IDF on zero documents"));
        }

        let mut document_frequency: AHashMap<String, usize> = AHashMap::new();
        for doc in documents {
            let unique: AHashSet<String> = ngrams(doc, self.ngram_range).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let max_doc_count = self.max_df * n_documents as f64;
        if max_doc_count < self.min_df as f64 {
            return Err(TriageError::feature(format!(
                "max_df allows at most {max_doc_count:.1} documents, fewer than min_df = {}",
                self.min_df
            )));
        }

        // Sorted so that column indices do not depend on hashing.
        let kept: BTreeMap<String, usize> = document_frequency
            .into_iter()
            .filter(|(_, df)| *df >= self.min_df && (*df as f64) <= max_doc_count)
            .collect();
        if kept.is_empty() {
            return Err(TriageError::feature(
                "empty vocabulary after document frequency pruning",
            ));
        }

        let mut vocabulary = HashMap::with_capacity(kept.len());
        let mut terms = Vec::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (index, (term, df)) in kept.into_iter().enumerate() {
            // IDF = ln((N + 1) / (df + 1)) + 1
            idf.push(((n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
            vocabulary.insert(term.clone(), index);
            terms.push(term);
        }

        Ok(TfIdfModel {
            ngram_range: self.ngram_range,
            vocabulary,
            terms,
            idf,
            n_documents,
        })
    }
}

/// Fitted vocabulary and inverse document frequencies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TfIdfModel {
    ngram_range: (usize, usize),
    vocabulary: HashMap<String, usize>,
    terms: Vec<String>,
    idf: Vec<f64>,
    n_documents: usize,
}

impl TfIdfModel {
    /// Transform a document into an L2-normalized TF-IDF row.
    ///
    /// Terms outside the vocabulary contribute nothing.
    pub fn transform(&self, document: &str) -> SparseRow {
        let mut counts: AHashMap<usize, f64> = AHashMap::new();
        for term in ngrams(document, self.ngram_range) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut row = SparseRow::from_pairs(
            counts
                .into_iter()
                .map(|(index, count)| (index, count * self.idf[index]))
                .collect(),
        );
        // Norm over the sorted row so the result does not depend on map order.
        let norm = row.norm();
        if norm == 0.0 {
            return SparseRow::default();
        }
        row.values.iter_mut().for_each(|w| *w /= norm);
        row
    }

    pub fn transform_all(&self, documents: &[String]) -> SparseMatrix {
        let rows = documents.iter().map(|doc| self.transform(doc)).collect();
        SparseMatrix::new(rows, self.vocabulary_size())
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    pub fn is_consistent(&self) -> bool {
        self.terms.len() == self.idf.len()
            && self.vocabulary.len() == self.terms.len()
            && self
                .terms
                .iter()
                .enumerate()
                .all(|(i, term)| self.vocabulary.get(term) == Some(&i))
    }
}

/// Word n-grams of whitespace tokens with at least two characters.
fn ngrams(document: &str, (low, high): (usize, usize)) -> Vec<String> {
    let tokens: Vec<&str> = document
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .collect();

    let mut grams = Vec::new();
    for n in low..=high {
        if n > tokens.len() {
            break;
        }
        grams.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    grams
}
