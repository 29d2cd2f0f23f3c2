//! Runs every lexical detector in the trained column order.

use serde::{Deserialize, Serialize};

use super::{
    EmojiCounter, PatternDetector, PhraseTrigger, PolarityAnalyzer, RatingBucket, SignalDetector,
    VocabularyTrigger,
};
use crate::error::Result;
use crate::lexicon::Lexicon;

/// Number of lexical columns, the rating bucket included.
pub const SIGNAL_COUNT: usize = 12;

/// Column names in feature order.
pub const SIGNAL_NAMES: [&str; SIGNAL_COUNT] = [
    "neg_emojis",
    "pos_emojis",
    "sentiment",
    "pos_trigger",
    "neg_trigger",
    "return_trigger",
    "quality_trigger",
    "damage_trigger",
    "side_effect_trigger",
    "conformity_trigger",
    "claims_trigger",
    RatingBucket::NAME,
];

/// Raw (unscaled) lexical signals of one revue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LexicalSignals {
    values: [f64; SIGNAL_COUNT],
}

impl LexicalSignals {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        SIGNAL_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }

    /// `(name, value)` pairs in column order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        SIGNAL_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

/// Computes the fixed set of lexical signals.
pub struct LexicalSignalExtractor {
    detectors: Vec<Box<dyn SignalDetector>>,
}

impl std::fmt::Debug for LexicalSignalExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexicalSignalExtractor")
            .field(
                "detectors",
                &self.detectors.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl LexicalSignalExtractor {
    pub fn from_lexicon(lexicon: &Lexicon) -> Result<Self> {
        let subs = &lexicon.substitutions;
        let detectors: Vec<Box<dyn SignalDetector>> = vec![
            Box::new(EmojiCounter::from_codes("neg_emojis", &lexicon.emojis.negative)?),
            Box::new(EmojiCounter::from_codes("pos_emojis", &lexicon.emojis.positive)?),
            Box::new(PolarityAnalyzer::from_tables(&lexicon.sentiment)),
            Box::new(VocabularyTrigger::new("pos_trigger", &lexicon.vocabularies.positive)?),
            Box::new(VocabularyTrigger::new("neg_trigger", &lexicon.vocabularies.negative)?),
            Box::new(PatternDetector::new("return_trigger", &lexicon.patterns.return_refund)?),
            Box::new(PhraseTrigger::new("quality_trigger", &lexicon.phrases.quality, subs)?),
            Box::new(PhraseTrigger::new("damage_trigger", &lexicon.phrases.damage, subs)?),
            Box::new(PhraseTrigger::new(
                "side_effect_trigger",
                &lexicon.phrases.side_effect,
                subs,
            )?),
            Box::new(PatternDetector::new(
                "conformity_trigger",
                &lexicon.patterns.non_conformity,
            )?),
            Box::new(PatternDetector::new("claims_trigger", &lexicon.patterns.broken_promise)?),
        ];
        debug_assert_eq!(detectors.len() + 1, SIGNAL_COUNT);

        Ok(LexicalSignalExtractor { detectors })
    }

    /// Compute every signal for a revue and its star rating.
    ///
    /// Fails only on a rating outside 1..=5.
    pub fn extract(&self, revue: &str, rating: i64) -> Result<LexicalSignals> {
        let bucket = RatingBucket::bucket(rating)?;
        let mut values = [0.0; SIGNAL_COUNT];
        for (slot, detector) in values.iter_mut().zip(&self.detectors) {
            *slot = detector.detect(revue);
        }
        values[SIGNAL_COUNT - 1] = f64::from(bucket);
        Ok(LexicalSignals { values })
    }
}
