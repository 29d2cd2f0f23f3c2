//! Text embedding: TF-IDF over word n-grams followed by truncated SVD.
//!
//! ```text
//! normalized text → TfIdfModel → SparseRow → SvdProjection → dense embedding
//! ```

pub mod sparse;
pub mod stage;
pub mod svd;
pub mod tfidf;

pub use sparse::{SparseMatrix, SparseRow};
pub use stage::{FittedVectorizer, VectorizationStage};
pub use svd::{SvdProjection, TruncatedSvd};
pub use tfidf::{TfIdfModel, TfIdfVectorizer};
