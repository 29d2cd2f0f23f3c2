//! Lexicon-based polarity scoring.
//!
//! Each polar word yields an assessment. An intensifier right before a polar
//! word scales it, and a negation before that flips and halves it. Every
//! exclamation mark multiplies the latest assessment by 1.25, clamped to
//! [-1, 1]. The score is the mean of all assessments, clamped to [-1, 1], or 0
//! when the text holds no polar word.

use std::collections::{HashMap, HashSet};

use unicode_segmentation::UnicodeSegmentation;

use super::SignalDetector;
use crate::lexicon::SentimentTables;

const NEGATION_FACTOR: f64 = -0.5;
const EXCLAMATION_FACTOR: f64 = 1.25;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Segment<'a> {
    Word(&'a str),
    Exclamation,
}

/// Words and exclamation marks, in order. Other punctuation and whitespace
/// are dropped.
fn segments(text: &str) -> Vec<Segment<'_>> {
    text.split_word_bounds()
        .filter_map(|segment| {
            if segment == "!" {
                Some(Segment::Exclamation)
            } else if segment.chars().any(char::is_alphanumeric) {
                Some(Segment::Word(segment))
            } else {
                None
            }
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct PolarityAnalyzer {
    polarity: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    negations: HashSet<String>,
}

impl PolarityAnalyzer {
    pub fn new(
        polarity: HashMap<String, f64>,
        intensifiers: HashMap<String, f64>,
        negations: HashSet<String>,
    ) -> Self {
        PolarityAnalyzer {
            polarity,
            intensifiers,
            negations,
        }
    }

    pub fn from_tables(tables: &SentimentTables) -> Self {
        Self::new(
            tables.polarity.clone(),
            tables.intensifiers.clone(),
            tables.negations.iter().cloned().collect(),
        )
    }

    /// Score the text in [-1, 1].
    pub fn polarity(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let segments = segments(&lowered);

        let mut assessments: Vec<f64> = Vec::new();
        let mut intensity: Option<f64> = None;
        let mut negated = false;

        for (i, segment) in segments.iter().enumerate() {
            let word = match segment {
                Segment::Word(word) => *word,
                Segment::Exclamation => {
                    if let Some(last) = assessments.last_mut() {
                        *last = (*last * EXCLAMATION_FACTOR).clamp(-1.0, 1.0);
                    }
                    intensity = None;
                    negated = false;
                    continue;
                }
            };

            // Words such as "pretty" are both polar and intensifiers; they
            // only intensify when something scorable follows.
            let modifies_next = matches!(
                segments.get(i + 1),
                Some(Segment::Word(next))
                    if self.polarity.contains_key(*next) || self.intensifiers.contains_key(*next)
            );
            if let Some(boost) = self.intensifiers.get(word).filter(|_| modifies_next) {
                intensity = Some(intensity.unwrap_or(1.0) * boost);
                continue;
            }

            if let Some(score) = self.polarity.get(word) {
                let mut value = score * intensity.unwrap_or(1.0);
                if negated {
                    value *= NEGATION_FACTOR;
                }
                assessments.push(value);
            } else if self.negations.contains(word) {
                negated = true;
                intensity = None;
                continue;
            }
            intensity = None;
            negated = false;
        }

        if assessments.is_empty() {
            return 0.0;
        }
        let mean = assessments.iter().sum::<f64>() / assessments.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

impl SignalDetector for PolarityAnalyzer {
    fn name(&self) -> &str {
        "sentiment"
    }

    fn detect(&self, text: &str) -> f64 {
        self.polarity(text)
    }
}
