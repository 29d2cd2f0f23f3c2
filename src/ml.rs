//! Gradient boosted tree classifiers.
//!
//! One [`GradientBoostedTrees`] model per label, each trained with a
//! second-order logistic objective on the assembled feature vectors, and a
//! [`MultiLabelClassifier`] that owns the per-label models.

pub mod booster;
pub mod multilabel;
pub mod tree;

pub use booster::{
    BinaryClassifier, BoosterParams, GradientBoostedTrees, ModelMetadata, TrainingStats,
};
pub use multilabel::MultiLabelClassifier;
pub use tree::RegressionTree;

/// Machine learning error types.
#[derive(Debug, thiserror::Error)]
pub enum MLError {
    #[error("Model not trained: {message}")]
    ModelNotTrained { message: String },

    #[error("Invalid feature vector: {message}")]
    InvalidFeatureVector { message: String },

    #[error("Training data insufficient: need at least {min_samples} samples, got {actual}")]
    InsufficientTrainingData { min_samples: usize, actual: usize },

    #[error("Invalid hyperparameter: {message}")]
    InvalidHyperparameter { message: String },
}
