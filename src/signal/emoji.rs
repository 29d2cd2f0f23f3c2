//! Emoji occurrence counters.

use std::collections::HashSet;

use super::SignalDetector;
use crate::error::Result;
use crate::lexicon::Lexicon;

/// Counts every occurrence of a code point from a fixed set.
#[derive(Clone, Debug)]
pub struct EmojiCounter {
    name: String,
    code_points: HashSet<char>,
}

impl EmojiCounter {
    pub fn new<S: Into<String>>(name: S, code_points: HashSet<char>) -> Self {
        EmojiCounter {
            name: name.into(),
            code_points,
        }
    }

    /// Build a counter from hexadecimal code points as stored in the lexicon.
    pub fn from_codes<S: Into<String>>(name: S, codes: &[String]) -> Result<Self> {
        Ok(Self::new(name, Lexicon::decode_code_points(codes)?))
    }
}

impl SignalDetector for EmojiCounter {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, text: &str) -> f64 {
        text.chars().filter(|c| self.code_points.contains(c)).count() as f64
    }
}
