//! Error types for the review-triage library.
//!
//! All fallible operations return [`Result`], whose error side is
//! [`TriageError`]. Model specific failures are described by
//! [`MLError`](crate::ml::MLError) and converted on the way out.
//!
//! # Examples
//!
//! ```
//! use review_triage::error::{Result, TriageError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(TriageError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

use crate::ml::MLError;

/// The main error type for review-triage operations.
#[derive(Error, Debug)]
pub enum TriageError {
    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Text analysis errors (char filters, tokenizers, token filters).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Lexicon loading or validation errors.
    #[error("Lexicon error: {0}")]
    Lexicon(String),

    /// Feature construction errors (vectorization, scaling, assembly).
    #[error("Feature error: {0}")]
    Feature(String),

    /// A star rating outside of the exact set {1, 2, 3, 4, 5}.
    #[error("Invalid rating: {0} (expected one of 1, 2, 3, 4, 5)")]
    InvalidRating(i64),

    /// Not enough usable training data to fit the pipeline.
    #[error("Insufficient training data: {0}")]
    InsufficientTrainingData(String),

    /// Prediction requested with a state that was never produced by fit.
    #[error("Pipeline not fitted: {0}")]
    NotFitted(String),

    /// A fitted state that is inconsistent with this build of the pipeline.
    #[error("Invalid pipeline state: {0}")]
    InvalidState(String),

    /// Model errors.
    #[error(transparent)]
    Model(#[from] MLError),

    /// Dataset parsing errors.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// CSV errors.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary serialization errors.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with TriageError.
pub type Result<T> = std::result::Result<T, TriageError>;

impl From<bincode::Error> for TriageError {
    fn from(err: bincode::Error) -> Self {
        TriageError::SerializationError(err.to_string())
    }
}

impl TriageError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        TriageError::Analysis(msg.into())
    }

    /// Create a new lexicon error.
    pub fn lexicon<S: Into<String>>(msg: S) -> Self {
        TriageError::Lexicon(msg.into())
    }

    /// Create a new feature error.
    pub fn feature<S: Into<String>>(msg: S) -> Self {
        TriageError::Feature(msg.into())
    }

    /// Create a new insufficient training data error.
    pub fn insufficient_data<S: Into<String>>(msg: S) -> Self {
        TriageError::InsufficientTrainingData(msg.into())
    }

    /// Create a new not fitted error.
    pub fn not_fitted<S: Into<String>>(msg: S) -> Self {
        TriageError::NotFitted(msg.into())
    }

    /// Create a new invalid state error.
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        TriageError::InvalidState(msg.into())
    }

    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        TriageError::Dataset(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TriageError::Other(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        TriageError::Other(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        TriageError::Other(format!("Invalid argument: {}", msg.into()))
    }
}
