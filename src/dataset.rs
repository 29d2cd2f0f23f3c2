//! File adapters for review records.
//!
//! Two formats are understood, chosen by file extension:
//!
//! - CSV (`.csv`) with a header row naming `id`, `title`, `text`, `rating`
//!   and, for training data, the nine label columns.
//! - JSON Lines (`.jsonl`, `.ndjson`, `.json`), one object per line with the
//!   same field names.
//!
//! Label cells accept `0`, `1`, `true` and `false`. Missing title or text
//! cells read as empty strings.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Result, TriageError};
use crate::record::{Label, LabelSet, LabeledReview, RecordId, ReviewRecord, TrainingExample};

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    JsonLines,
}

impl DatasetFormat {
    /// Pick the format from the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(DatasetFormat::Csv),
            Some("jsonl" | "ndjson" | "json") => Ok(DatasetFormat::JsonLines),
            _ => Err(TriageError::dataset(format!(
                "cannot infer format of '{}' (expected .csv or .jsonl)",
                path.display()
            ))),
        }
    }
}

/// Read unlabeled records.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<ReviewRecord>> {
    let path = path.as_ref();
    match DatasetFormat::from_path(path)? {
        DatasetFormat::Csv => read_csv(path, |row| row.record()),
        DatasetFormat::JsonLines => read_json_lines(path, record_from_json),
    }
}

/// Read records with their nine ground-truth labels.
pub fn read_training<P: AsRef<Path>>(path: P) -> Result<Vec<TrainingExample>> {
    let path = path.as_ref();
    match DatasetFormat::from_path(path)? {
        DatasetFormat::Csv => read_csv(path, |row| {
            Ok(TrainingExample::new(row.record()?, row.labels()?))
        }),
        DatasetFormat::JsonLines => read_json_lines(path, |object| {
            Ok(TrainingExample::new(
                record_from_json(object)?,
                labels_from_json(object)?,
            ))
        }),
    }
}

/// Write labeled reviews. CSV label cells are written as `0`/`1`.
pub fn write_predictions<P: AsRef<Path>>(path: P, reviews: &[LabeledReview]) -> Result<()> {
    let path = path.as_ref();
    match DatasetFormat::from_path(path)? {
        DatasetFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)?;
            let mut header = vec!["id", "title", "text", "rating"];
            header.extend(Label::ALL.iter().map(|label| label.as_str()));
            writer.write_record(&header)?;
            for review in reviews {
                let mut row = vec![
                    review.record.id.to_string(),
                    review.record.title.clone(),
                    review.record.text.clone(),
                    review.record.rating.to_string(),
                ];
                row.extend(
                    review
                        .labels
                        .to_array()
                        .iter()
                        .map(|flag| u8::from(*flag).to_string()),
                );
                writer.write_record(&row)?;
            }
            writer.flush()?;
        }
        DatasetFormat::JsonLines => {
            let mut writer = BufWriter::new(File::create(path)?);
            for review in reviews {
                serde_json::to_writer(&mut writer, review)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

/// Parse a label cell.
pub fn parse_flag(cell: &str) -> Option<bool> {
    match cell.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// One CSV row with its header positions.
struct CsvRow<'a> {
    line: u64,
    header: &'a csv::StringRecord,
    record: &'a csv::StringRecord,
}

impl CsvRow<'_> {
    fn cell(&self, column: &str) -> Option<&str> {
        self.header
            .iter()
            .position(|name| name.trim() == column)
            .and_then(|i| self.record.get(i))
    }

    fn required(&self, column: &str) -> Result<&str> {
        self.cell(column).ok_or_else(|| {
            TriageError::dataset(format!("line {}: missing '{column}' column", self.line))
        })
    }

    fn record(&self) -> Result<ReviewRecord> {
        let rating = self.required("rating")?;
        let rating = rating.trim().parse::<i64>().map_err(|_| {
            TriageError::dataset(format!("line {}: rating '{rating}' is not an integer", self.line))
        })?;
        Ok(ReviewRecord {
            id: RecordId(self.required("id")?.to_string()),
            title: self.cell("title").unwrap_or_default().to_string(),
            text: self.cell("text").unwrap_or_default().to_string(),
            rating,
        })
    }

    fn labels(&self) -> Result<LabelSet> {
        let mut labels = LabelSet::empty();
        for label in Label::ALL {
            let cell = self.required(label.as_str())?;
            let flag = parse_flag(cell).ok_or_else(|| {
                TriageError::dataset(format!(
                    "line {}: '{cell}' is not a valid {label} flag",
                    self.line
                ))
            })?;
            labels.set(label, flag);
        }
        Ok(labels)
    }
}

fn read_csv<T, F>(path: &Path, parse: F) -> Result<Vec<T>>
where
    F: Fn(&CsvRow<'_>) -> Result<T>,
{
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let header = reader.headers()?.clone();
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        rows.push(parse(&CsvRow {
            line,
            header: &header,
            record: &record,
        })?);
    }
    Ok(rows)
}

fn read_json_lines<T, F>(path: &Path, parse: F) -> Result<Vec<T>>
where
    F: Fn(&Map<String, Value>) -> Result<T>,
{
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)?;
        let Value::Object(object) = value else {
            return Err(TriageError::dataset(format!(
                "line {}: expected a JSON object",
                index + 1
            )));
        };
        rows.push(parse(&object).map_err(|e| match e {
            TriageError::Dataset(msg) => TriageError::dataset(format!("line {}: {msg}", index + 1)),
            other => other,
        })?);
    }
    Ok(rows)
}

fn record_from_json(object: &Map<String, Value>) -> Result<ReviewRecord> {
    Ok(serde_json::from_value(Value::Object(object.clone()))?)
}

fn labels_from_json(object: &Map<String, Value>) -> Result<LabelSet> {
    let mut labels = LabelSet::empty();
    for label in Label::ALL {
        let flag = match object.get(label.as_str()) {
            Some(Value::Bool(flag)) => Some(*flag),
            Some(Value::Number(n)) => match n.as_u64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            Some(Value::String(s)) => parse_flag(s),
            _ => None,
        };
        let flag = flag.ok_or_else(|| {
            TriageError::dataset(format!("missing or invalid '{label}' flag"))
        })?;
        labels.set(label, flag);
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_header() -> String {
        Label::ALL.map(|l| l.as_str()).join(",")
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(DatasetFormat::from_path("a.csv").unwrap(), DatasetFormat::Csv);
        assert_eq!(DatasetFormat::from_path("a.JSONL").unwrap(), DatasetFormat::JsonLines);
        assert!(DatasetFormat::from_path("a.txt").is_err());
        assert!(DatasetFormat::from_path("noext").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag("yes"), None);
    }

    #[test]
    fn test_read_training_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        std::fs::write(
            &path,
            format!(
                "id,title,text,rating,{}\n7,Broken,\"arrived broken, sadly\",1,0,0,0,1,true,0,0,0,false\n8,,,5,0,0,0,0,0,0,1,0,0\n",
                label_header()
            ),
        )
        .unwrap();

        let examples = read_training(&path).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].record.id.as_str(), "7");
        assert_eq!(examples[0].record.text, "arrived broken, sadly");
        assert!(examples[0].labels.produit_endommage);
        assert!(examples[0].labels.retour_client);
        assert_eq!(examples[0].labels.count(), 2);
        assert!(examples[1].record.revue().is_none());
        assert!(examples[1].labels.aucun_probleme);
    }

    #[test]
    fn test_invalid_label_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        std::fs::write(
            &path,
            format!("id,title,text,rating,{}\n1,a,b,1,2,0,0,0,0,0,0,0,0\n", label_header()),
        )
        .unwrap();
        assert!(matches!(read_training(&path), Err(TriageError::Dataset(_))));
    }

    #[test]
    fn test_read_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        std::fs::write(
            &path,
            "{\"id\": 1, \"title\": \"Great\", \"text\": \"love it\", \"rating\": 5}\n\n{\"id\": \"b\", \"title\": null, \"rating\": 2}\n",
        )
        .unwrap();
        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_str(), "1");
        assert_eq!(records[1].title, "");
        assert_eq!(records[1].text, "");
    }

    #[test]
    fn test_write_predictions_csv_and_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let mut labels = LabelSet::empty();
        labels.set(Label::AucunProbleme, true);
        let reviews = vec![LabeledReview {
            record: ReviewRecord::new("1", "Great", "love it", 5),
            labels,
        }];

        let csv_path = dir.path().join("out.csv");
        write_predictions(&csv_path, &reviews).unwrap();
        let content = std::fs::read_to_string(&csv_path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), format!("id,title,text,rating,{}", label_header()));
        assert_eq!(lines.next().unwrap(), "1,Great,love it,5,0,0,0,0,0,0,1,0,0");

        let jsonl_path = dir.path().join("out.jsonl");
        write_predictions(&jsonl_path, &reviews).unwrap();
        let examples = read_training(&jsonl_path).unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].labels, labels);
    }
}
