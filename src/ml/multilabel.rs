//! One independent booster per label.

use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::MLError;
use super::booster::{BinaryClassifier, BoosterParams, GradientBoostedTrees};
use crate::error::Result;
use crate::record::{Label, LabelSet};

/// Nine binary classifiers in [`Label::ALL`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiLabelClassifier {
    models: Vec<GradientBoostedTrees>,
}

impl MultiLabelClassifier {
    /// Train one model per label. With `parallel` the labels are trained on
    /// the rayon pool; each model owns its seeded RNG so the result is the
    /// same either way.
    pub fn fit(
        x: ArrayView2<'_, f64>,
        targets: &[LabelSet],
        params: &BoosterParams,
        parallel: bool,
    ) -> Result<Self> {
        if x.nrows() != targets.len() {
            return Err(MLError::InvalidFeatureVector {
                message: format!("{} rows but {} label sets", x.nrows(), targets.len()),
            }
            .into());
        }

        let train = |label: Label| -> Result<GradientBoostedTrees> {
            let y: Vec<bool> = targets.iter().map(|set| set.get(label)).collect();
            let mut model = GradientBoostedTrees::new(label.as_str(), *params);
            model.fit(x, &y)?;
            debug!(
                label = label.as_str(),
                positives = y.iter().filter(|v| **v).count(),
                loss = model.training_stats().map(|s| s.final_training_loss),
                "trained label model"
            );
            Ok(model)
        };

        let models = if parallel {
            Label::ALL
                .par_iter()
                .map(|label| train(*label))
                .collect::<Result<Vec<_>>>()?
        } else {
            Label::ALL
                .iter()
                .map(|label| train(*label))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(MultiLabelClassifier { models })
    }

    /// Positive-class probability of every label.
    pub fn predict_proba(&self, x: ArrayView1<'_, f64>) -> Result<[f64; Label::COUNT]> {
        self.ensure_complete()?;
        let mut probabilities = [0.0; Label::COUNT];
        for (slot, model) in probabilities.iter_mut().zip(&self.models) {
            *slot = model.predict_proba(x)?;
        }
        Ok(probabilities)
    }

    /// Thresholded predictions (probability ≥ 0.5).
    pub fn predict(&self, x: ArrayView1<'_, f64>) -> Result<LabelSet> {
        let probabilities = self.predict_proba(x)?;
        Ok(LabelSet::from_array(probabilities.map(|p| p >= 0.5)))
    }

    pub fn model(&self, label: Label) -> Option<&GradientBoostedTrees> {
        self.models.get(label.index())
    }

    pub fn models(&self) -> &[GradientBoostedTrees] {
        &self.models
    }

    /// Feature width shared by all models, if they agree.
    pub fn n_features(&self) -> Option<usize> {
        let first = self.models.first()?.n_features();
        self.models
            .iter()
            .all(|m| m.n_features() == first)
            .then_some(first)
    }

    /// All nine models are present, trained and in label order.
    pub fn is_trained(&self) -> bool {
        self.models.len() == Label::COUNT
            && self
                .models
                .iter()
                .zip(Label::ALL)
                .all(|(m, label)| m.is_trained() && m.name() == label.as_str() && m.is_consistent())
    }

    fn ensure_complete(&self) -> Result<()> {
        if self.is_trained() {
            Ok(())
        } else {
            Err(MLError::ModelNotTrained {
                message: format!("expected {} trained label models", Label::COUNT),
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array, s};

    fn data() -> (Array2<f64>, Vec<LabelSet>) {
        let x = Array2::from_shape_fn((30, 2), |(i, j)| {
            if j == 0 { i as f64 } else { (i % 3) as f64 }
        });
        let targets = (0..30)
            .map(|i| {
                let mut set = LabelSet::empty();
                set.set(Label::RetourClient, i >= 15);
                set.set(Label::AucunProbleme, i < 15);
                set
            })
            .collect();
        (x, targets)
    }

    #[test]
    fn test_fit_predict() {
        let (x, targets) = data();
        let params = BoosterParams {
            n_estimators: 20,
            ..Default::default()
        };
        let classifier = MultiLabelClassifier::fit(x.view(), &targets, &params, false).unwrap();
        assert!(classifier.is_trained());
        assert_eq!(classifier.n_features(), Some(2));

        let high = classifier.predict(array![28.0, 1.0].view()).unwrap();
        assert!(high.retour_client);
        assert!(!high.aucun_probleme);
        assert!(!high.non_tenu);

        let low = classifier.predict(array![1.0, 1.0].view()).unwrap();
        assert!(low.aucun_probleme);
        assert!(!low.retour_client);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (x, targets) = data();
        let params = BoosterParams {
            n_estimators: 10,
            ..Default::default()
        };
        let sequential = MultiLabelClassifier::fit(x.view(), &targets, &params, false).unwrap();
        let parallel = MultiLabelClassifier::fit(x.view(), &targets, &params, true).unwrap();
        for row in x.rows() {
            assert_eq!(
                sequential.predict_proba(row).unwrap(),
                parallel.predict_proba(row).unwrap()
            );
        }
    }

    #[test]
    fn test_mismatched_lengths() {
        let (x, targets) = data();
        let params = BoosterParams::default();
        assert!(MultiLabelClassifier::fit(x.slice(s![..3, ..]), &targets, &params, false).is_err());
    }
}
