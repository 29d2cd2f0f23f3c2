//! TF-IDF followed by SVD, fitted together.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::svd::{SvdProjection, TruncatedSvd};
use super::tfidf::{TfIdfModel, TfIdfVectorizer};
use crate::error::Result;

/// Unfitted vectorization settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizationStage {
    pub tfidf: TfIdfVectorizer,
    pub svd: TruncatedSvd,
}

impl VectorizationStage {
    pub fn new(tfidf: TfIdfVectorizer, svd: TruncatedSvd) -> Self {
        VectorizationStage { tfidf, svd }
    }

    /// Fit on normalized documents.
    pub fn fit(&self, documents: &[String]) -> Result<FittedVectorizer> {
        let tfidf = self.tfidf.fit(documents)?;
        let matrix = tfidf.transform_all(documents);
        let svd = self.svd.fit(&matrix)?;
        debug!(
            documents = documents.len(),
            vocabulary = tfidf.vocabulary_size(),
            rank = svd.rank(),
            "fitted vectorization stage"
        );
        Ok(FittedVectorizer { tfidf, svd })
    }
}

/// Fitted vocabulary, idf weights and projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedVectorizer {
    tfidf: TfIdfModel,
    svd: SvdProjection,
}

impl FittedVectorizer {
    /// Dense embedding of one normalized document.
    pub fn embed(&self, document: &str) -> Array1<f64> {
        self.svd.transform(&self.tfidf.transform(document))
    }

    pub fn dimensions(&self) -> usize {
        self.svd.n_components()
    }

    pub fn tfidf(&self) -> &TfIdfModel {
        &self.tfidf
    }

    pub fn svd(&self) -> &SvdProjection {
        &self.svd
    }

    pub fn is_consistent(&self) -> bool {
        self.tfidf.is_consistent()
            && self.svd.is_consistent()
            && self.svd.n_features() == self.tfidf.vocabulary_size()
    }
}
