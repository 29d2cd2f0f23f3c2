//! Configuration for fitting the pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::ml::BoosterParams;
use crate::vectorize::VectorizationStage;

/// Settings of every fitted stage.
///
/// Missing fields in a JSON document fall back to the defaults, so a file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// TF-IDF and SVD settings.
    pub vectorizer: VectorizationStage,
    /// Hyperparameters shared by the nine label models.
    pub booster: BoosterParams,
    /// Featurize records and train labels on the rayon pool.
    pub parallel: bool,
    /// Size of a dedicated thread pool.
    /// If None, the global rayon pool is used.
    pub threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vectorizer: VectorizationStage::default(),
            booster: BoosterParams::default(),
            parallel: true,
            threads: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Reject settings that can never fit.
    pub fn validate(&self) -> Result<()> {
        self.booster.validate()?;
        if self.vectorizer.svd.n_components == 0 {
            return Err(TriageError::invalid_config("n_components must be positive"));
        }
        if self.threads == Some(0) {
            return Err(TriageError::invalid_config("threads must be positive"));
        }
        Ok(())
    }
}
