//! Versioned vocabulary, phrase and pattern tables.
//!
//! Every curated list the pipeline relies on lives in a JSON document rather
//! than in code, so the tables can be audited or swapped without touching the
//! pipeline. The default tables ship in `resources/lexicon.json` and are
//! embedded into the binary; [`Lexicon::from_path`] loads an alternative set.
//!
//! The `version` string is recorded in every fitted state: a state fitted
//! against one lexicon produces skewed signals when used with another.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

const BUILTIN_LEXICON: &str = include_str!("../resources/lexicon.json");

/// Emoji code point sets, written as hexadecimal scalar values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmojiTables {
    pub negative: Vec<String>,
    pub positive: Vec<String>,
}

/// Single-word trigger vocabularies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyTables {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

/// Phrase lists mixing single words and multi-word expressions.
///
/// An entry containing a space is treated as a phrase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseTables {
    pub quality: Vec<String>,
    pub damage: Vec<String>,
    pub side_effect: Vec<String>,
}

/// Regex alternation branches for the binary detectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternTables {
    pub return_refund: Vec<String>,
    pub non_conformity: Vec<String>,
    pub broken_promise: Vec<String>,
}

/// Word polarities and modifiers for the polarity analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentTables {
    pub polarity: HashMap<String, f64>,
    pub intensifiers: HashMap<String, f64>,
    pub negations: Vec<String>,
}

/// Irregular inflections, keyed by coarse part of speech.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrregularLemmas {
    #[serde(default)]
    pub verb: HashMap<String, String>,
    #[serde(default)]
    pub noun: HashMap<String, String>,
}

/// The complete set of curated tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    pub version: String,
    /// Ordered `(from, to)` substring replacements.
    pub substitutions: Vec<(String, String)>,
    pub number_words: Vec<String>,
    pub stopwords: Vec<String>,
    /// Stopwords kept because they carry negation or contrast.
    pub retained_stopwords: Vec<String>,
    #[serde(default)]
    pub irregular_lemmas: IrregularLemmas,
    pub emojis: EmojiTables,
    pub vocabularies: VocabularyTables,
    pub phrases: PhraseTables,
    pub patterns: PatternTables,
    pub sentiment: SentimentTables,
}

impl Lexicon {
    /// The tables embedded at build time.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_LEXICON)
    }

    /// Parse and validate a lexicon document.
    pub fn from_json(json: &str) -> Result<Self> {
        let lexicon: Lexicon = serde_json::from_str(json)
            .map_err(|e| TriageError::lexicon(format!("malformed lexicon: {e}")))?;
        lexicon.validate()?;
        Ok(lexicon)
    }

    /// Load a lexicon document from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Stopwords minus the retained set.
    pub fn effective_stopwords(&self) -> HashSet<String> {
        let retained: HashSet<&str> = self.retained_stopwords.iter().map(String::as_str).collect();
        self.stopwords
            .iter()
            .filter(|word| !retained.contains(word.as_str()))
            .cloned()
            .collect()
    }

    /// Decode a list of hexadecimal code points.
    pub fn decode_code_points(codes: &[String]) -> Result<HashSet<char>> {
        codes
            .iter()
            .map(|code| {
                u32::from_str_radix(code.trim_start_matches("U+"), 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| TriageError::lexicon(format!("invalid code point '{code}'")))
            })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(TriageError::lexicon("missing version"));
        }
        if self.substitutions.iter().any(|(from, _)| from.is_empty()) {
            return Err(TriageError::lexicon("empty substitution source"));
        }
        let negative = Self::decode_code_points(&self.emojis.negative)?;
        let positive = Self::decode_code_points(&self.emojis.positive)?;
        if !negative.is_disjoint(&positive) {
            return Err(TriageError::lexicon("emoji sets must be disjoint"));
        }

        let patterns = [
            ("return_refund", &self.patterns.return_refund),
            ("non_conformity", &self.patterns.non_conformity),
            ("broken_promise", &self.patterns.broken_promise),
        ];
        for (name, branches) in patterns {
            if branches.is_empty() {
                return Err(TriageError::lexicon(format!("pattern '{name}' has no branches")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lexicon_loads() {
        let lexicon = Lexicon::builtin().unwrap();
        assert!(!lexicon.version.is_empty());
        assert_eq!(lexicon.number_words.first().map(String::as_str), Some("zero"));
        assert_eq!(lexicon.emojis.negative.len(), 10);
        assert_eq!(lexicon.emojis.positive.len(), 13);
        assert!(lexicon.vocabularies.positive.contains(&"love".to_string()));
        assert!(lexicon.phrases.damage.contains(&"broken".to_string()));
    }

    #[test]
    fn test_effective_stopwords_keep_negations() {
        let lexicon = Lexicon::builtin().unwrap();
        let stopwords = lexicon.effective_stopwords();
        assert!(stopwords.contains("the"));
        assert!(!stopwords.contains("not"));
        assert!(!stopwords.contains("too"));
        assert!(!stopwords.contains("back"));
    }

    #[test]
    fn test_decode_code_points() {
        let decoded = Lexicon::decode_code_points(&["1F631".to_string(), "U+2764".to_string()])
            .unwrap();
        assert!(decoded.contains(&'\u{1F631}'));
        assert!(decoded.contains(&'\u{2764}'));

        assert!(Lexicon::decode_code_points(&["ZZZ".to_string()]).is_err());
    }

    #[test]
    fn test_malformed_lexicon_is_rejected() {
        assert!(Lexicon::from_json("{}").is_err());
        assert!(Lexicon::from_json("not json").is_err());
    }
}
