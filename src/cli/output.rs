//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, TriageArgs};
use crate::error::Result;
use crate::pipeline::PredictionSummary;
use crate::record::Label;

/// Count attached to one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

impl LabelCount {
    pub fn from_counts(counts: &[usize; Label::COUNT]) -> Vec<LabelCount> {
        Label::ALL
            .iter()
            .zip(counts)
            .map(|(label, count)| LabelCount {
                label: label.as_str().to_string(),
                count: *count,
            })
            .collect()
    }
}

/// Result structure for training.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingResult {
    pub model_path: Option<String>,
    pub documents: usize,
    pub dropped: usize,
    pub vocabulary_size: usize,
    pub feature_dimensions: usize,
    pub lexicon_version: String,
    pub label_positives: Vec<LabelCount>,
    pub duration_ms: u64,
}

/// Result structure for prediction.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResult {
    pub output_path: String,
    pub input_records: usize,
    pub labeled_records: usize,
    pub dropped: usize,
    pub label_counts: Vec<LabelCount>,
    pub duration_ms: u64,
}

impl PredictionResult {
    pub fn new(output_path: String, summary: &PredictionSummary, duration_ms: u64) -> Self {
        Self {
            output_path,
            input_records: summary.input_records,
            labeled_records: summary.labeled_records,
            dropped: summary.dropped(),
            label_counts: LabelCount::from_counts(&summary.label_counts),
            duration_ms,
        }
    }
}

/// Fit followed by prediction.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResult {
    pub training: TrainingResult,
    pub prediction: PredictionResult,
}

/// One named lexical signal.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignalValue {
    pub name: String,
    pub value: f64,
}

/// Normalized text and signals of one review.
#[derive(Debug, Serialize, Deserialize)]
pub struct InspectionResult {
    pub revue: Option<String>,
    pub normalized: Option<String>,
    pub signals: Vec<SignalValue>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &TriageArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &TriageArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }
    let value = serde_json::to_value(result)?;
    for line in human_lines(&value, 0) {
        println!("{line}");
    }
    Ok(())
}

/// Render a JSON value as indented `key: value` lines. Arrays of
/// `{name, value}`-like pairs are rendered as aligned rows.
fn human_lines(value: &serde_json::Value, indent: usize) -> Vec<String> {
    let spaces = "  ".repeat(indent);
    let mut lines = Vec::new();
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                match val {
                    serde_json::Value::Object(_) => {
                        lines.push(format!("{spaces}{key}:"));
                        lines.extend(human_lines(val, indent + 1));
                    }
                    serde_json::Value::Array(items) if items.iter().all(is_pair) => {
                        lines.push(format!("{spaces}{key}:"));
                        let width = items
                            .iter()
                            .filter_map(pair)
                            .map(|(name, _)| name.len())
                            .max()
                            .unwrap_or(0);
                        for (name, v) in items.iter().filter_map(pair) {
                            lines.push(format!("{spaces}  {name:<width$}  {}", format_value(v)));
                        }
                    }
                    _ => lines.push(format!("{spaces}{key}: {}", format_value(val))),
                }
            }
        }
        _ => lines.push(format!("{spaces}{}", format_value(value))),
    }
    lines
}

fn is_pair(value: &serde_json::Value) -> bool {
    pair(value).is_some()
}

/// An object with exactly two fields, one of them a string.
fn pair(value: &serde_json::Value) -> Option<(&str, &serde_json::Value)> {
    let obj = value.as_object()?;
    if obj.len() != 2 {
        return None;
    }
    let mut fields = obj.values();
    let (first, second) = (fields.next()?, fields.next()?);
    match (first.as_str(), second.as_str()) {
        (Some(name), _) => Some((name, second)),
        (None, Some(name)) => Some((name, first)),
        (None, None) => None,
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &TriageArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{f:.4}"),
            _ => n.to_string(),
        },
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "-".to_string(),
    }
}
