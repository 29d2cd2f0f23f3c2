//! Lexical signals computed directly from the raw revue.
//!
//! Every detector implements [`SignalDetector`] and is total: any input
//! string yields a finite number. The [`LexicalSignalExtractor`] runs them
//! in a fixed column order and appends the rating bucket.

pub mod emoji;
pub mod extractor;
pub mod pattern;
pub mod rating;
pub mod sentiment;
pub mod trigger;

pub use emoji::EmojiCounter;
pub use extractor::{LexicalSignalExtractor, LexicalSignals, SIGNAL_COUNT, SIGNAL_NAMES};
pub use pattern::PatternDetector;
pub use rating::RatingBucket;
pub use sentiment::PolarityAnalyzer;
pub use trigger::{PhraseTrigger, VocabularyTrigger};

/// A scalar feature computed from text.
pub trait SignalDetector: Send + Sync {
    /// Column name of this signal.
    fn name(&self) -> &str;

    /// Compute the signal for the given text.
    fn detect(&self, text: &str) -> f64;
}
