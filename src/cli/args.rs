//! Command line argument parsing for the review-triage CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// review-triage - multi-label problem classification for product reviews
#[derive(Parser, Debug, Clone)]
#[command(name = "review-triage")]
#[command(about = "Classify customer product reviews into problem categories")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TriageArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug, 4=trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TriageArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n + 1,
            }
        }
    }

    /// Default log filter for the verbosity level.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity() {
            0 => "error",
            1 => "warn",
            2 => "info",
            3 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fit the pipeline on labeled reviews and save the fitted state
    Train(TrainArgs),

    /// Label reviews with a saved state
    Predict(PredictArgs),

    /// Fit on labeled reviews, then label a batch in one go
    Run(RunArgs),

    /// Show the normalized text and lexical signals of one review
    Inspect(InspectArgs),
}

/// Options shared by the commands that fit.
#[derive(Parser, Debug, Clone, Default)]
pub struct FitOptions {
    /// Pipeline configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Number of worker threads
    #[arg(long, env = "REVIEW_TRIAGE_THREADS")]
    pub threads: Option<usize>,

    /// Run every stage on the calling thread
    #[arg(long)]
    pub sequential: bool,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Labeled reviews (CSV or JSONL)
    #[arg(short, long, value_name = "DATA_FILE")]
    pub data: PathBuf,

    /// Where to write the fitted state
    #[arg(short, long, value_name = "MODEL_FILE")]
    pub model: PathBuf,

    /// Lexicon file replacing the built-in tables
    #[arg(long, value_name = "LEXICON_FILE")]
    pub lexicon: Option<PathBuf>,

    #[command(flatten)]
    pub fit: FitOptions,
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Fitted state written by `train`
    #[arg(short, long, value_name = "MODEL_FILE")]
    pub model: PathBuf,

    /// Reviews to label (CSV or JSONL)
    #[arg(short, long, value_name = "INPUT_FILE")]
    pub input: PathBuf,

    /// Output file (defaults to predicted_batch_<timestamp>.csv)
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// Lexicon file replacing the built-in tables
    #[arg(long, value_name = "LEXICON_FILE")]
    pub lexicon: Option<PathBuf>,
}

/// Arguments for fit-then-predict
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Labeled reviews (CSV or JSONL)
    #[arg(short, long, value_name = "DATA_FILE")]
    pub data: PathBuf,

    /// Reviews to label (CSV or JSONL)
    #[arg(short, long, value_name = "INPUT_FILE")]
    pub input: PathBuf,

    /// Output file (defaults to predicted_batch_<timestamp>.csv)
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// Also save the fitted state here
    #[arg(short, long, value_name = "MODEL_FILE")]
    pub model: Option<PathBuf>,

    /// Lexicon file replacing the built-in tables
    #[arg(long, value_name = "LEXICON_FILE")]
    pub lexicon: Option<PathBuf>,

    #[command(flatten)]
    pub fit: FitOptions,
}

/// Arguments for inspecting one review
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Review title
    #[arg(long, default_value = "")]
    pub title: String,

    /// Review body
    #[arg(long, default_value = "")]
    pub text: String,

    /// Star rating (1-5)
    #[arg(short, long)]
    pub rating: i64,

    /// Lexicon file replacing the built-in tables
    #[arg(long, value_name = "LEXICON_FILE")]
    pub lexicon: Option<PathBuf>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
