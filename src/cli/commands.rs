//! Command implementations for the review-triage CLI.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::dataset;
use crate::error::{Result, TriageError};
use crate::lexicon::Lexicon;
use crate::pipeline::{FittedPipelineState, PipelineConfig, PredictionSummary, ReviewPipeline};
use crate::record::ReviewRecord;

/// Execute a CLI command, describing what was being done when it fails.
///
/// The library error stays reachable through `downcast_ref::<TriageError>()`.
pub fn run_command(args: TriageArgs) -> anyhow::Result<()> {
    let action = match &args.command {
        Command::Train(train_args) => format!("training on {}", train_args.data.display()),
        Command::Predict(predict_args) => format!(
            "labeling {} with {}",
            predict_args.input.display(),
            predict_args.model.display()
        ),
        Command::Run(run_args) => format!(
            "training on {} and labeling {}",
            run_args.data.display(),
            run_args.input.display()
        ),
        Command::Inspect(_) => "inspecting review".to_string(),
    };
    execute_command(args).context(action)
}

/// Execute a CLI command.
pub fn execute_command(args: TriageArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Predict(predict_args) => predict(predict_args.clone(), &args),
        Command::Run(run_args) => run(run_args.clone(), &args),
        Command::Inspect(inspect_args) => inspect(inspect_args.clone(), &args),
    }
}

/// Output file used when none is given.
pub fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "predicted_batch_{}.csv",
        Utc::now().format("%Y%m%d_%H%M%S")
    ))
}

fn load_lexicon(path: Option<&Path>) -> Result<Arc<Lexicon>> {
    let lexicon = match path {
        Some(path) => Lexicon::from_path(path)?,
        None => Lexicon::builtin()?,
    };
    Ok(Arc::new(lexicon))
}

fn load_config(options: &FitOptions) -> Result<PipelineConfig> {
    let mut config = match &options.config {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };
    if options.threads.is_some() {
        config.threads = options.threads;
    }
    if options.sequential {
        config.parallel = false;
    }
    config.validate()?;
    Ok(config)
}

/// Fit from a labeled file; the returned state is ready to predict.
fn fit_from_file(
    pipeline: &ReviewPipeline,
    data: &Path,
    model: Option<&Path>,
    cli_args: &TriageArgs,
) -> Result<(FittedPipelineState, TrainingResult)> {
    if cli_args.verbosity() > 1 {
        println!("Reading training data from: {}", data.display());
    }
    let start_time = Instant::now();
    let examples = dataset::read_training(data)?;
    let state = pipeline.fit(&examples)?;

    if let Some(model) = model {
        state.save(model)?;
    }

    let result = TrainingResult {
        model_path: model.map(|m| m.to_string_lossy().to_string()),
        documents: state.metadata().documents,
        dropped: state.metadata().dropped,
        vocabulary_size: state.vectorizer().tfidf().vocabulary_size(),
        feature_dimensions: state.assembler().dimensions(),
        lexicon_version: state.lexicon_version().to_string(),
        label_positives: LabelCount::from_counts(&state.metadata().label_positives),
        duration_ms: start_time.elapsed().as_millis() as u64,
    };
    Ok((state, result))
}

/// Label a file and write the predictions.
fn predict_file(
    pipeline: &ReviewPipeline,
    state: &FittedPipelineState,
    input: &Path,
    output: Option<PathBuf>,
    cli_args: &TriageArgs,
) -> Result<PredictionResult> {
    if cli_args.verbosity() > 1 {
        println!("Reading records from: {}", input.display());
    }
    let start_time = Instant::now();
    let records = dataset::read_records(input)?;
    let labeled = pipeline.predict(&records, state)?;

    let output = output.unwrap_or_else(default_output_path);
    dataset::write_predictions(&output, &labeled)?;

    let summary = PredictionSummary::from_reviews(records.len(), &labeled);
    Ok(PredictionResult::new(
        output.to_string_lossy().to_string(),
        &summary,
        start_time.elapsed().as_millis() as u64,
    ))
}

/// Fit and save a state.
fn train(args: TrainArgs, cli_args: &TriageArgs) -> Result<()> {
    let config = load_config(&args.fit)?;
    let pipeline = ReviewPipeline::with_lexicon(config, load_lexicon(args.lexicon.as_deref())?)?;
    let (_, result) = fit_from_file(&pipeline, &args.data, Some(&args.model), cli_args)?;
    output_result("Pipeline fitted successfully", &result, cli_args)
}

/// Label a batch with a saved state.
fn predict(args: PredictArgs, cli_args: &TriageArgs) -> Result<()> {
    if cli_args.verbosity() > 1 {
        println!("Loading fitted state from: {}", args.model.display());
    }
    let state = FittedPipelineState::load(&args.model)?;
    let pipeline =
        ReviewPipeline::with_lexicon(state.config().clone(), load_lexicon(args.lexicon.as_deref())?)?;
    let result = predict_file(&pipeline, &state, &args.input, args.output, cli_args)?;
    output_result("Batch labeled successfully", &result, cli_args)
}

/// Fit, then label a batch.
fn run(args: RunArgs, cli_args: &TriageArgs) -> Result<()> {
    let config = load_config(&args.fit)?;
    let pipeline = ReviewPipeline::with_lexicon(config, load_lexicon(args.lexicon.as_deref())?)?;
    let (state, training) = fit_from_file(&pipeline, &args.data, args.model.as_deref(), cli_args)?;
    let prediction = predict_file(&pipeline, &state, &args.input, args.output, cli_args)?;
    output_result(
        "Batch labeled successfully",
        &RunResult {
            training,
            prediction,
        },
        cli_args,
    )
}

/// Show how one review is seen by the pipeline.
fn inspect(args: InspectArgs, cli_args: &TriageArgs) -> Result<()> {
    let pipeline = ReviewPipeline::with_lexicon(
        PipelineConfig {
            parallel: false,
            ..Default::default()
        },
        load_lexicon(args.lexicon.as_deref())?,
    )?;
    let record = ReviewRecord::new("inspect", args.title, args.text, args.rating);

    let result = match pipeline.inspect(&record)? {
        Some((normalized, signals)) => InspectionResult {
            revue: record.revue(),
            normalized: Some(normalized),
            signals: signals
                .named()
                .map(|(name, value)| SignalValue {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        },
        None => {
            return Err(TriageError::invalid_argument(
                "title and text are both empty; the review would be dropped",
            ));
        }
    };
    output_result("Review inspected", &result, cli_args)
}
