//! The immutable result of fitting the pipeline.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::PipelineConfig;
use crate::error::{Result, TriageError};
use crate::feature::{FeatureAssembler, ScalerState};
use crate::ml::MultiLabelClassifier;
use crate::record::Label;
use crate::signal::SIGNAL_COUNT;
use crate::vectorize::FittedVectorizer;

/// Layout version of persisted states. Bumped whenever the feature layout
/// or any serialized structure changes.
pub const STATE_FORMAT_VERSION: u32 = 2;

/// Facts about the fit that produced a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitMetadata {
    pub fitted_at: DateTime<Utc>,
    /// Training examples that had a non-empty revue.
    pub documents: usize,
    /// Training examples dropped for an empty revue.
    pub dropped: usize,
    /// Positive examples per label, in [`Label::ALL`] order.
    pub label_positives: [usize; Label::COUNT],
}

/// Vocabulary, idf weights, projection, scaler and the nine models.
///
/// Only [`ReviewPipeline::fit`](super::ReviewPipeline::fit) and
/// [`FittedPipelineState::load`] create one. Nothing mutates it afterwards,
/// so one state can be shared by concurrent predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipelineState {
    format_version: u32,
    config: PipelineConfig,
    lexicon_version: String,
    vectorizer: FittedVectorizer,
    scaler: ScalerState,
    classifier: MultiLabelClassifier,
    metadata: FitMetadata,
}

impl FittedPipelineState {
    pub(crate) fn new(
        config: PipelineConfig,
        lexicon_version: String,
        vectorizer: FittedVectorizer,
        scaler: ScalerState,
        classifier: MultiLabelClassifier,
        metadata: FitMetadata,
    ) -> Self {
        Self {
            format_version: STATE_FORMAT_VERSION,
            config,
            lexicon_version,
            vectorizer,
            scaler,
            classifier,
            metadata,
        }
    }

    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn lexicon_version(&self) -> &str {
        &self.lexicon_version
    }

    pub fn vectorizer(&self) -> &FittedVectorizer {
        &self.vectorizer
    }

    pub fn scaler(&self) -> &ScalerState {
        &self.scaler
    }

    pub fn classifier(&self) -> &MultiLabelClassifier {
        &self.classifier
    }

    pub fn metadata(&self) -> &FitMetadata {
        &self.metadata
    }

    /// Layout of the feature vectors the classifiers were trained on.
    pub fn assembler(&self) -> FeatureAssembler {
        FeatureAssembler::new(self.vectorizer.dimensions(), self.scaler.width())
    }

    /// Check that the state can serve predictions.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != STATE_FORMAT_VERSION {
            return Err(TriageError::invalid_state(format!(
                "state format version {} is not supported (expected {})",
                self.format_version, STATE_FORMAT_VERSION
            )));
        }
        if !self.classifier.is_trained() {
            return Err(TriageError::not_fitted(format!(
                "expected {} trained label models",
                Label::COUNT
            )));
        }
        if !self.vectorizer.is_consistent() {
            return Err(TriageError::invalid_state(
                "vocabulary and projection disagree",
            ));
        }
        if self.scaler.width() != SIGNAL_COUNT {
            return Err(TriageError::invalid_state(format!(
                "scaler has {} columns, expected {SIGNAL_COUNT}",
                self.scaler.width()
            )));
        }
        let expected = self.assembler().dimensions();
        if self.classifier.n_features() != Some(expected) {
            return Err(TriageError::invalid_state(format!(
                "classifiers do not all consume {expected} features"
            )));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let state: FittedPipelineState = bincode::deserialize(bytes)?;
        state.validate()?;
        Ok(state)
    }

    /// Write the state to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writer.write_all(&self.to_bytes()?)?;
        writer.flush()?;
        Ok(())
    }

    /// Read and validate a state written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut bytes = Vec::new();
        BufReader::new(File::open(path.as_ref())?).read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::StandardScaler;
    use crate::ml::BoosterParams;
    use crate::pipeline::ReviewPipeline;
    use crate::record::{LabelSet, ReviewRecord, TrainingExample};
    use crate::vectorize::{TruncatedSvd, VectorizationStage};
    use ndarray::array;

    fn pipeline() -> ReviewPipeline {
        ReviewPipeline::new(PipelineConfig {
            booster: BoosterParams {
                n_estimators: 5,
                ..Default::default()
            },
            parallel: false,
            ..Default::default()
        })
        .unwrap()
    }

    fn examples() -> Vec<TrainingExample> {
        let rows: [(&str, i64, Label); 8] = [
            ("arrived broken, want a refund", 1, Label::ProduitEndommage),
            ("bottle arrived broken and leaking", 1, Label::ProduitEndommage),
            ("the bottle was leaking everywhere", 2, Label::ProduitEndommage),
            ("wrong color, not as pictured", 2, Label::ProduitNonConforme),
            ("fake product, not as described", 1, Label::ProduitNonConforme),
            ("love it, works great", 5, Label::AucunProbleme),
            ("love the smell, great product", 5, Label::AucunProbleme),
            ("great value, love the bottle", 4, Label::AucunProbleme),
        ];
        rows.iter()
            .enumerate()
            .map(|(i, (text, rating, label))| {
                let mut labels = LabelSet::empty();
                labels.set(*label, true);
                TrainingExample::new(ReviewRecord::new(i as u64, "Review", *text, *rating), labels)
            })
            .collect()
    }

    fn fitted() -> FittedPipelineState {
        pipeline().fit(&examples()).unwrap()
    }

    fn other_vectorizer(n_components: usize) -> FittedVectorizer {
        let documents: Vec<String> = ["alpha beta", "alpha beta gamma", "delta epsilon", "delta"]
            .iter()
            .map(|d| d.to_string())
            .collect();
        VectorizationStage {
            svd: TruncatedSvd::new(n_components),
            ..Default::default()
        }
        .fit(&documents)
        .unwrap()
    }

    #[test]
    fn test_fitted_state_is_valid() {
        let state = fitted();
        state.validate().unwrap();
        assert_eq!(state.format_version(), STATE_FORMAT_VERSION);
        assert_eq!(state.assembler().dimensions(), 20 + SIGNAL_COUNT);
    }

    #[test]
    fn test_unknown_format_version_is_rejected() {
        let mut state = fitted();
        state.format_version = STATE_FORMAT_VERSION + 1;
        assert!(matches!(state.validate(), Err(TriageError::InvalidState(_))));

        let bytes = state.to_bytes().unwrap();
        assert!(matches!(
            FittedPipelineState::from_bytes(&bytes),
            Err(TriageError::InvalidState(_))
        ));
    }

    #[test]
    fn test_untrained_classifier_is_not_fitted() {
        let mut state = fitted();
        state.classifier = serde_json::from_str(r#"{"models": []}"#).unwrap();
        assert!(matches!(state.validate(), Err(TriageError::NotFitted(_))));
    }

    #[test]
    fn test_vocabulary_and_projection_must_agree() {
        let mut state = fitted();
        let mut value = serde_json::to_value(&state.vectorizer).unwrap();
        value["svd"] = serde_json::to_value(other_vectorizer(20).svd()).unwrap();
        state.vectorizer = serde_json::from_value(value).unwrap();
        assert!(!state.vectorizer.is_consistent());
        assert!(matches!(state.validate(), Err(TriageError::InvalidState(_))));
    }

    #[test]
    fn test_scaler_width_must_match_signals() {
        let mut state = fitted();
        state.scaler = StandardScaler::fit(&array![[1.0, 2.0, 3.0], [2.0, 3.0, 4.0]]).unwrap();
        assert!(matches!(state.validate(), Err(TriageError::InvalidState(_))));
    }

    #[test]
    fn test_classifier_width_must_match_features() {
        let mut state = fitted();
        state.vectorizer = other_vectorizer(5);
        assert!(state.vectorizer.is_consistent());
        assert_eq!(state.assembler().dimensions(), 5 + SIGNAL_COUNT);
        assert!(matches!(state.validate(), Err(TriageError::InvalidState(_))));
    }

    #[test]
    fn test_predict_and_load_refuse_broken_states() {
        let pipeline = pipeline();
        let mut state = pipeline.fit(&examples()).unwrap();
        state.classifier = serde_json::from_str(r#"{"models": []}"#).unwrap();

        let records = vec![ReviewRecord::new("1", "Broken", "arrived broken", 1)];
        assert!(matches!(
            pipeline.predict(&records, &state),
            Err(TriageError::NotFitted(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.bin");
        state.save(&path).unwrap();
        assert!(matches!(
            FittedPipelineState::load(&path),
            Err(TriageError::NotFitted(_))
        ));
    }
}
