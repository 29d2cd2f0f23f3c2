//! # review-triage
//!
//! Multi-label classification of customer product reviews into nine
//! problem categories from free text and a star rating.
//!
//! ## Pipeline
//!
//! - Text normalization through an analysis chain of char filters, a
//!   tokenizer and token filters ending in lemmas
//! - Lexical signals: emoji counts, polarity, trigger vocabularies, phrase
//!   lists, regex detectors and the rating bucket
//! - TF-IDF over word 1-3 grams projected to a dense embedding by a
//!   truncated SVD
//! - Nine independent gradient boosted tree classifiers
//! - A rating-driven correction overlay
//!
//! ```no_run
//! use review_triage::pipeline::{PipelineConfig, ReviewPipeline};
//! use review_triage::dataset;
//!
//! let pipeline = ReviewPipeline::new(PipelineConfig::default())?;
//! let state = pipeline.fit(&dataset::read_training("train.csv")?)?;
//! let labeled = pipeline.predict(&dataset::read_records("batch.csv")?, &state)?;
//! dataset::write_predictions("predicted.csv", &labeled)?;
//! # Ok::<(), review_triage::error::TriageError>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod correction;
pub mod dataset;
pub mod error;
pub mod feature;
pub mod lexicon;
pub mod ml;
pub mod pipeline;
pub mod record;
pub mod signal;
pub mod vectorize;

pub mod prelude {
    pub use crate::correction::LabelCorrector;
    pub use crate::error::{Result, TriageError};
    pub use crate::lexicon::Lexicon;
    pub use crate::pipeline::{FittedPipelineState, PipelineConfig, ReviewPipeline};
    pub use crate::record::{Label, LabelSet, LabeledReview, ReviewRecord, TrainingExample};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
