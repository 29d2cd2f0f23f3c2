//! Fit and predict over batches of reviews.
//!
//! [`ReviewPipeline`] wires the normalizer, the lexical signal extractor,
//! the vectorization stage, the scaler, the per-label classifiers and the
//! label corrector together. Fitting yields an immutable
//! [`FittedPipelineState`] that any number of predictions may share.

pub mod config;
pub mod orchestrator;
pub mod state;

pub use config::PipelineConfig;
pub use orchestrator::{PredictionSummary, ReviewPipeline};
pub use state::{FitMetadata, FittedPipelineState, STATE_FORMAT_VERSION};
