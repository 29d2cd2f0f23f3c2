//! Batch fit and predict.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::config::PipelineConfig;
use super::state::{FitMetadata, FittedPipelineState};
use crate::analysis::analyzer::ReviewAnalyzer;
use crate::correction::LabelCorrector;
use crate::error::{Result, TriageError};
use crate::feature::{FeatureAssembler, FeatureVector, StandardScaler};
use crate::lexicon::Lexicon;
use crate::ml::MultiLabelClassifier;
use crate::record::{Label, LabelSet, LabeledReview, ReviewRecord, TrainingExample};
use crate::signal::{LexicalSignalExtractor, LexicalSignals, SIGNAL_COUNT};

/// A record reduced to what the fitted stages consume.
struct PreparedRecord {
    normalized: String,
    signals: LexicalSignals,
}

/// Per-label positive counts over one predicted batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PredictionSummary {
    /// Records handed to predict.
    pub input_records: usize,
    /// Records that came out labeled.
    pub labeled_records: usize,
    /// Positive count per label, in [`Label::ALL`] order.
    pub label_counts: [usize; Label::COUNT],
}

impl PredictionSummary {
    pub fn from_reviews(input_records: usize, reviews: &[LabeledReview]) -> Self {
        let mut label_counts = [0; Label::COUNT];
        for review in reviews {
            for (count, flag) in label_counts.iter_mut().zip(review.labels.to_array()) {
                *count += usize::from(flag);
            }
        }
        Self {
            input_records,
            labeled_records: reviews.len(),
            label_counts,
        }
    }

    /// Records dropped for an empty revue.
    pub fn dropped(&self) -> usize {
        self.input_records - self.labeled_records
    }

    pub fn count(&self, label: Label) -> usize {
        self.label_counts[label.index()]
    }

    /// `(label, count)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, usize)> + '_ {
        Label::ALL.into_iter().zip(self.label_counts.iter().copied())
    }
}

/// Orchestrates featurization, classification and correction.
pub struct ReviewPipeline {
    config: PipelineConfig,
    lexicon: Arc<Lexicon>,
    analyzer: ReviewAnalyzer,
    extractor: LexicalSignalExtractor,
    corrector: LabelCorrector,
    thread_pool: Option<ThreadPool>,
}

impl std::fmt::Debug for ReviewPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewPipeline")
            .field("config", &self.config)
            .field("lexicon_version", &self.lexicon.version)
            .field("extractor", &self.extractor)
            .finish()
    }
}

impl ReviewPipeline {
    /// Pipeline over the built-in lexicon.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_lexicon(config, Arc::new(Lexicon::builtin()?))
    }

    pub fn with_lexicon(config: PipelineConfig, lexicon: Arc<Lexicon>) -> Result<Self> {
        config.validate()?;
        let analyzer = ReviewAnalyzer::new(&lexicon)?;
        let extractor = LexicalSignalExtractor::from_lexicon(&lexicon)?;

        let thread_pool = match config.threads {
            Some(threads) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("review-triage-{i}"))
                    .build()
                    .map_err(|e| {
                        TriageError::other(format!("Failed to create thread pool: {e}"))
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            config,
            lexicon,
            analyzer,
            extractor,
            corrector: LabelCorrector::new(),
            thread_pool,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn analyzer(&self) -> &ReviewAnalyzer {
        &self.analyzer
    }

    pub fn extractor(&self) -> &LexicalSignalExtractor {
        &self.extractor
    }

    /// Fit every stage on labeled examples.
    ///
    /// Examples without a revue are dropped first. Fails without producing
    /// any state when fewer than two distinct documents remain or when a
    /// stage cannot be fitted.
    pub fn fit(&self, examples: &[TrainingExample]) -> Result<FittedPipelineState> {
        let start = Instant::now();
        info!(examples = examples.len(), "fitting pipeline");

        let prepared = self.map_batch(examples, |example| self.prepare(&example.record))?;
        let (prepared, targets): (Vec<PreparedRecord>, Vec<LabelSet>) = prepared
            .into_iter()
            .zip(examples)
            .filter_map(|(row, example)| row.map(|row| (row, example.labels)))
            .unzip();
        let dropped = examples.len() - prepared.len();
        if dropped > 0 {
            debug!(dropped, "dropped training examples with an empty review");
        }

        if prepared.is_empty() {
            return Err(TriageError::insufficient_data(
                "no training example has a non-empty review",
            ));
        }
        let distinct: HashSet<&str> = prepared.iter().map(|p| p.normalized.as_str()).collect();
        if distinct.len() < 2 {
            return Err(TriageError::insufficient_data(format!(
                "need at least 2 distinct documents, got {}",
                distinct.len()
            )));
        }

        let documents: Vec<String> = prepared.iter().map(|p| p.normalized.clone()).collect();
        let vectorizer = self.config.vectorizer.fit(&documents)?;

        let signal_rows = Array2::from_shape_fn((prepared.len(), SIGNAL_COUNT), |(i, j)| {
            prepared[i].signals.values()[j]
        });
        let scaler = StandardScaler::fit(&signal_rows)?;
        debug!(columns = scaler.width(), "fitted signal scaler");

        let assembler = FeatureAssembler::new(vectorizer.dimensions(), scaler.width());
        let features = self.map_batch(&prepared, |row| {
            let embedding = vectorizer.embed(&row.normalized);
            let scaled = scaler.transform(ArrayView1::from(row.signals.values()))?;
            assembler.assemble(embedding.view(), scaled.view())
        })?;
        let features = assembler.stack(&features)?;

        let classifier = self.install(|| {
            MultiLabelClassifier::fit(
                features.view(),
                &targets,
                &self.config.booster,
                self.config.parallel,
            )
        })?;

        let mut label_positives = [0; Label::COUNT];
        for labels in &targets {
            for (count, flag) in label_positives.iter_mut().zip(labels.to_array()) {
                *count += usize::from(flag);
            }
        }

        let state = FittedPipelineState::new(
            self.config.clone(),
            self.lexicon.version.clone(),
            vectorizer,
            scaler,
            classifier,
            FitMetadata {
                fitted_at: chrono::Utc::now(),
                documents: prepared.len(),
                dropped,
                label_positives,
            },
        );
        state.validate()?;

        info!(
            documents = prepared.len(),
            vocabulary = state.vectorizer().tfidf().vocabulary_size(),
            features = assembler.dimensions(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "pipeline fitted"
        );
        Ok(state)
    }

    /// Label every record that has a revue.
    ///
    /// Records without a revue are absent from the output. The output keeps
    /// the input order.
    pub fn predict(
        &self,
        records: &[ReviewRecord],
        state: &FittedPipelineState,
    ) -> Result<Vec<LabeledReview>> {
        state.validate()?;
        if state.lexicon_version() != self.lexicon.version {
            warn!(
                fitted = state.lexicon_version(),
                current = %self.lexicon.version,
                "lexicon version differs from the one used at fit time"
            );
        }

        let start = Instant::now();
        let labeled = self.map_batch(records, |record| {
            let Some(features) = self.featurize(record, state)? else {
                return Ok(None);
            };
            Ok(Some(LabeledReview {
                record: record.clone(),
                labels: state.classifier().predict(features.view())?,
            }))
        })?;
        let mut labeled: Vec<LabeledReview> = labeled.into_iter().flatten().collect();
        self.corrector.correct_all(&mut labeled);

        let summary = PredictionSummary::from_reviews(records.len(), &labeled);
        info!(
            records = summary.input_records,
            labeled = summary.labeled_records,
            dropped = summary.dropped(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "batch predicted"
        );
        for (label, count) in summary.iter() {
            debug!(label = label.as_str(), count, "label count");
        }
        Ok(labeled)
    }

    /// Feature vector of one record, or `None` when it has no revue.
    pub fn featurize(
        &self,
        record: &ReviewRecord,
        state: &FittedPipelineState,
    ) -> Result<Option<FeatureVector>> {
        let Some(prepared) = self.prepare(record)? else {
            return Ok(None);
        };
        let embedding = state.vectorizer().embed(&prepared.normalized);
        let scaled = state.scaler().transform(ArrayView1::from(prepared.signals.values()))?;
        state.assembler().assemble(embedding.view(), scaled.view()).map(Some)
    }

    /// Normalized text and raw lexical signals of a record.
    pub fn inspect(&self, record: &ReviewRecord) -> Result<Option<(String, LexicalSignals)>> {
        Ok(self
            .prepare(record)?
            .map(|prepared| (prepared.normalized, prepared.signals)))
    }

    fn prepare(&self, record: &ReviewRecord) -> Result<Option<PreparedRecord>> {
        let Some(revue) = record.revue() else {
            return Ok(None);
        };
        let normalized = self.analyzer.normalize(&revue)?;
        let signals = self.extractor.extract(&revue, record.rating)?;
        Ok(Some(PreparedRecord {
            normalized,
            signals,
        }))
    }

    /// Map a batch in order, on the rayon pool when parallel.
    fn map_batch<T, U, F>(&self, items: &[T], f: F) -> Result<Vec<U>>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> Result<U> + Sync + Send,
    {
        if self.config.parallel {
            self.install(|| items.par_iter().map(&f).collect())
        } else {
            items.iter().map(&f).collect()
        }
    }

    fn install<R, OP>(&self, op: OP) -> R
    where
        R: Send,
        OP: FnOnce() -> R + Send,
    {
        match &self.thread_pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
