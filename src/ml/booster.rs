//! Gradient boosted trees for binary classification.

use std::collections::HashMap;
use std::time::Instant;

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::MLError;
use super::tree::{GradientPairs, RegressionTree, TreeParams};
use crate::error::Result;

/// Probabilities are clipped to this distance from 0 and 1.
const PROBABILITY_EPSILON: f64 = 1e-6;
/// Lower bound on a row hessian.
const MIN_HESSIAN: f64 = 1e-16;

/// Trait for binary classification models.
pub trait BinaryClassifier: Send + Sync {
    /// Train on the rows of `x` with boolean targets `y`.
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[bool]) -> Result<()>;

    /// Probability of the positive class.
    fn predict_proba(&self, x: ArrayView1<'_, f64>) -> Result<f64>;

    /// Positive when the probability is at least 0.5.
    fn predict(&self, x: ArrayView1<'_, f64>) -> Result<bool> {
        Ok(self.predict_proba(x)? >= 0.5)
    }

    /// Check if the model is trained.
    fn is_trained(&self) -> bool;
}

/// Boosting hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// Fraction of rows sampled for each tree.
    pub subsample: f64,
    /// Fraction of columns sampled for each tree.
    pub colsample_bytree: f64,
    pub reg_lambda: f64,
    pub min_child_weight: f64,
    pub seed: u64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        BoosterParams {
            n_estimators: 100,
            max_depth: 3,
            learning_rate: 0.15,
            subsample: 0.8,
            colsample_bytree: 0.8,
            reg_lambda: 1.0,
            min_child_weight: 1.0,
            seed: 42,
        }
    }
}

impl BoosterParams {
    pub fn validate(&self) -> std::result::Result<(), MLError> {
        let invalid = |message: String| Err(MLError::InvalidHyperparameter { message });
        if self.n_estimators == 0 {
            return invalid("n_estimators must be positive".to_string());
        }
        if !(self.learning_rate > 0.0) {
            return invalid(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        for (name, value) in [
            ("subsample", self.subsample),
            ("colsample_bytree", self.colsample_bytree),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return invalid(format!("{name} must be in (0, 1], got {value}"));
            }
        }
        if self.reg_lambda < 0.0 || self.min_child_weight < 0.0 {
            return invalid("reg_lambda and min_child_weight must be non-negative".to_string());
        }
        Ok(())
    }

    fn hyperparameters(&self) -> HashMap<String, f64> {
        HashMap::from([
            ("n_estimators".to_string(), self.n_estimators as f64),
            ("max_depth".to_string(), self.max_depth as f64),
            ("learning_rate".to_string(), self.learning_rate),
            ("subsample".to_string(), self.subsample),
            ("colsample_bytree".to_string(), self.colsample_bytree),
            ("reg_lambda".to_string(), self.reg_lambda),
            ("min_child_weight".to_string(), self.min_child_weight),
        ])
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            reg_lambda: self.reg_lambda,
            min_child_weight: self.min_child_weight,
            learning_rate: self.learning_rate,
        }
    }
}

/// Model metadata for tracking model information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier.
    pub name: String,
    /// Training timestamp.
    pub trained_at: chrono::DateTime<chrono::Utc>,
    /// Number of training examples used.
    pub training_examples: usize,
    /// Number of positive examples.
    pub positive_examples: usize,
    /// Model hyperparameters.
    pub hyperparameters: HashMap<String, f64>,
    /// Metrics on the training set.
    pub training_metrics: HashMap<String, f64>,
}

/// Training statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Log loss after each boosting round.
    pub training_losses: Vec<f64>,
    /// Number of boosting rounds completed.
    pub iterations: usize,
    /// Training time in milliseconds.
    pub training_time_ms: u64,
    /// Final training loss.
    pub final_training_loss: f64,
}

/// Second-order gradient boosting with logistic loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    name: String,
    params: BoosterParams,
    /// Prior log-odds of the positive class.
    base_score: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
    training_stats: Option<TrainingStats>,
    metadata: Option<ModelMetadata>,
}

impl GradientBoostedTrees {
    pub fn new<S: Into<String>>(name: S, params: BoosterParams) -> Self {
        GradientBoostedTrees {
            name: name.into(),
            params,
            base_score: 0.0,
            trees: Vec::new(),
            n_features: 0,
            training_stats: None,
            metadata: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &BoosterParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn training_stats(&self) -> Option<&TrainingStats> {
        self.training_stats.as_ref()
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }

    /// Raw score before the sigmoid.
    pub fn margin(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict(x)).sum::<f64>()
    }

    /// Every tree only refers to features the model was trained with.
    pub fn is_consistent(&self) -> bool {
        self.trees
            .iter()
            .all(|t| t.max_feature().is_none_or(|f| f < self.n_features))
    }
}

impl BinaryClassifier for GradientBoostedTrees {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[bool]) -> Result<()> {
        self.params.validate()?;
        let (n, n_features) = x.dim();
        if n != y.len() {
            return Err(MLError::InvalidFeatureVector {
                message: format!("{n} rows but {} targets", y.len()),
            }
            .into());
        }
        if n < 2 {
            return Err(MLError::InsufficientTrainingData {
                min_samples: 2,
                actual: n,
            }
            .into());
        }
        if n_features == 0 {
            return Err(MLError::InvalidFeatureVector {
                message: "rows must have a non-zero width".to_string(),
            }
            .into());
        }

        let start_time = Instant::now();
        let targets: Array1<f64> = y.iter().map(|&v| if v { 1.0 } else { 0.0 }).collect();
        let positives = y.iter().filter(|v| **v).count();

        let prior = (positives as f64 / n as f64)
            .clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
        let base_score = (prior / (1.0 - prior)).ln();

        let tree_params = self.params.tree_params();
        let n_rows = ((n as f64 * self.params.subsample).round() as usize).clamp(1, n);
        let n_cols =
            ((n_features as f64 * self.params.colsample_bytree).round() as usize).clamp(1, n_features);

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut margins = Array1::from_elem(n, base_score);
        let mut trees = Vec::with_capacity(self.params.n_estimators);
        let mut training_losses = Vec::with_capacity(self.params.n_estimators);
        for round in 0..self.params.n_estimators {
            let probabilities = margins.mapv(sigmoid);
            let grad = (&probabilities - &targets).to_vec();
            let hess = probabilities.mapv(|p| (p * (1.0 - p)).max(MIN_HESSIAN)).to_vec();

            let mut rows = sample(&mut rng, n, n_rows).into_vec();
            rows.sort_unstable();
            let mut columns = sample(&mut rng, n_features, n_cols).into_vec();
            columns.sort_unstable();

            let pairs = GradientPairs {
                grad: &grad,
                hess: &hess,
            };
            let tree = RegressionTree::fit(x, &pairs, &rows, &columns, &tree_params);
            for (margin, row) in margins.iter_mut().zip(x.rows()) {
                *margin += tree.predict(row);
            }
            trees.push(tree);

            let loss = log_loss(&margins, &targets);
            trace!(model = %self.name, round, loss, "boosting round");
            training_losses.push(loss);
        }

        let accuracy = margins
            .iter()
            .zip(y)
            .filter(|(m, t)| (sigmoid(**m) >= 0.5) == **t)
            .count() as f64
            / n as f64;
        let final_training_loss = training_losses.last().copied().unwrap_or(0.0);

        self.base_score = base_score;
        self.trees = trees;
        self.n_features = n_features;
        self.training_stats = Some(TrainingStats {
            iterations: training_losses.len(),
            training_losses,
            training_time_ms: start_time.elapsed().as_millis() as u64,
            final_training_loss,
        });
        self.metadata = Some(ModelMetadata {
            name: self.name.clone(),
            trained_at: chrono::Utc::now(),
            training_examples: n,
            positive_examples: positives,
            hyperparameters: self.params.hyperparameters(),
            training_metrics: HashMap::from([
                ("logloss".to_string(), final_training_loss),
                ("accuracy".to_string(), accuracy),
            ]),
        });

        Ok(())
    }

    fn predict_proba(&self, x: ArrayView1<'_, f64>) -> Result<f64> {
        if !self.is_trained() {
            return Err(MLError::ModelNotTrained {
                message: self.name.clone(),
            }
            .into());
        }
        if x.len() != self.n_features {
            return Err(MLError::InvalidFeatureVector {
                message: format!("expected {} features, got {}", self.n_features, x.len()),
            }
            .into());
        }
        Ok(sigmoid(self.margin(x)))
    }

    fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn log_loss(margins: &Array1<f64>, targets: &Array1<f64>) -> f64 {
    let total: f64 = margins
        .iter()
        .zip(targets)
        .map(|(&m, &t)| {
            let p = sigmoid(m).clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
            -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
        })
        .sum();
    total / margins.len() as f64
}
