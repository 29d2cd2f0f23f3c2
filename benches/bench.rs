//! Criterion benchmarks for review-triage.
//!
//! Covers the stages that dominate a batch:
//! - Text normalization
//! - Lexical signal extraction
//! - Vectorization fitting
//! - Pipeline fit and batch prediction, sequential and parallel

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use review_triage::analysis::analyzer::ReviewAnalyzer;
use review_triage::lexicon::Lexicon;
use review_triage::ml::BoosterParams;
use review_triage::pipeline::{PipelineConfig, ReviewPipeline};
use review_triage::record::{Label, LabelSet, ReviewRecord, TrainingExample};
use review_triage::signal::LexicalSignalExtractor;
use review_triage::vectorize::VectorizationStage;

const FRAGMENTS: [(&str, Label); 8] = [
    ("the bottle arrived broken and leaking", Label::ProduitEndommage),
    ("I want a refund, sending it back", Label::RetourClient),
    ("wrong color and not as pictured", Label::ProduitNonConforme),
    ("cheap material, poor quality overall", Label::MauvaiseQualite),
    ("does not work, no improvement after two weeks", Label::NonTenu),
    ("gave me a rash and made me break out!", Label::ProduitDangereux),
    ("love it, works great 😍", Label::AucunProbleme),
    ("seller never answered my messages", Label::SavSallerProbleme),
];

/// Generate labeled reviews for benchmarking.
fn generate_examples(count: usize) -> Vec<TrainingExample> {
    (0..count)
        .map(|i| {
            let (first, label) = FRAGMENTS[i % FRAGMENTS.len()];
            let (second, _) = FRAGMENTS[(i * 7 + 3) % FRAGMENTS.len()];
            let rating = if label == Label::AucunProbleme { 5 } else { 1 + (i % 3) as i64 };
            let mut labels = LabelSet::empty();
            labels.set(label, true);
            TrainingExample::new(
                ReviewRecord::new(i as u64, format!("Review {i}"), format!("{first}. {second}"), rating),
                labels,
            )
        })
        .collect()
}

fn bench_config(parallel: bool) -> PipelineConfig {
    PipelineConfig {
        booster: BoosterParams {
            n_estimators: 30,
            ..Default::default()
        },
        parallel,
        ..Default::default()
    }
}

/// Benchmark text normalization and signal extraction.
fn bench_featurization(c: &mut Criterion) {
    let mut group = c.benchmark_group("featurization");
    let lexicon = Lexicon::builtin().unwrap();
    let analyzer = ReviewAnalyzer::new(&lexicon).unwrap();
    let extractor = LexicalSignalExtractor::from_lexicon(&lexicon).unwrap();
    let examples = generate_examples(100);
    let revues: Vec<String> = examples.iter().filter_map(|e| e.record.revue()).collect();

    group.bench_function("normalize_single_review", |b| {
        b.iter(|| black_box(analyzer.normalize(black_box(&revues[0]))))
    });

    group.throughput(Throughput::Elements(revues.len() as u64));
    group.bench_function("normalize_batch", |b| {
        b.iter(|| {
            for revue in &revues {
                let _ = black_box(analyzer.normalize(black_box(revue)));
            }
        })
    });

    group.bench_function("extract_signals_batch", |b| {
        b.iter(|| {
            for revue in &revues {
                let _ = black_box(extractor.extract(black_box(revue), 2));
            }
        })
    });

    group.finish();
}

/// Benchmark fitting the TF-IDF and SVD stage.
fn bench_vectorization(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorization");
    group.sample_size(20);

    let lexicon = Lexicon::builtin().unwrap();
    let analyzer = ReviewAnalyzer::new(&lexicon).unwrap();
    let documents: Vec<String> = generate_examples(500)
        .iter()
        .filter_map(|e| e.record.revue())
        .map(|revue| analyzer.normalize(&revue).unwrap())
        .collect();

    group.throughput(Throughput::Elements(documents.len() as u64));
    group.bench_function("fit_tfidf_svd", |b| {
        b.iter(|| black_box(VectorizationStage::default().fit(black_box(&documents))))
    });

    group.finish();
}

/// Benchmark fit and predict over a batch.
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    let examples = generate_examples(300);
    let records: Vec<ReviewRecord> = examples.iter().map(|e| e.record.clone()).collect();

    for parallel in [false, true] {
        let name = if parallel { "parallel" } else { "sequential" };
        let pipeline = ReviewPipeline::new(bench_config(parallel)).unwrap();

        group.bench_function(format!("fit_{name}"), |b| {
            b.iter(|| black_box(pipeline.fit(black_box(&examples))))
        });

        let state = pipeline.fit(&examples).unwrap();
        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_function(format!("predict_{name}"), |b| {
            b.iter(|| black_box(pipeline.predict(black_box(&records), &state)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_featurization, bench_vectorization, bench_pipeline);
criterion_main!(benches);
