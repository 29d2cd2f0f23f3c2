//! Vocabulary and phrase list counters.

use std::collections::HashSet;

use aho_corasick::AhoCorasick;

use super::SignalDetector;
use crate::analysis::char_filter::{CharFilter, MappingCharFilter, PatternReplaceCharFilter};
use crate::error::{Result, TriageError};

/// Counts how many vocabulary words occur as substrings of the lowercased
/// text. Each word contributes at most once.
///
/// All words are matched in one overlapping automaton pass, so a word nested
/// inside another ("scam" in "scammer") still counts.
#[derive(Clone, Debug)]
pub struct VocabularyTrigger {
    name: String,
    matcher: AhoCorasick,
    n_words: usize,
}

impl VocabularyTrigger {
    pub fn new<S: Into<String>>(name: S, words: &[String]) -> Result<Self> {
        let name = name.into();
        let mut seen = HashSet::new();
        let words: Vec<String> = words
            .iter()
            .map(|w| w.to_lowercase())
            .filter(|w| !w.is_empty() && seen.insert(w.clone()))
            .collect();
        let matcher = AhoCorasick::builder().build(&words).map_err(|e| {
            TriageError::lexicon(format!("cannot build matcher for {name}: {e}"))
        })?;

        Ok(VocabularyTrigger {
            name,
            matcher,
            n_words: words.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.n_words
    }

    pub fn is_empty(&self) -> bool {
        self.n_words == 0
    }
}

impl SignalDetector for VocabularyTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, text: &str) -> f64 {
        if self.n_words == 0 {
            return 0.0;
        }
        let lowered = text.to_lowercase();
        let mut hit = vec![false; self.n_words];
        for m in self.matcher.find_overlapping_iter(&lowered) {
            hit[m.pattern().as_usize()] = true;
        }
        hit.into_iter().filter(|h| *h).count() as f64
    }
}

/// Counts phrase list hits.
///
/// Text is lowercased, punctuation becomes whitespace and the substitution
/// table is applied. Whitespace tokens equal to a single-word entry count one
/// each; every entry containing a space adds one if it occurs anywhere,
/// however many times it repeats.
#[derive(Clone, Debug)]
pub struct PhraseTrigger {
    name: String,
    words: HashSet<String>,
    phrases: Vec<String>,
    punctuation: PatternReplaceCharFilter,
    substitutions: MappingCharFilter,
}

impl PhraseTrigger {
    pub fn new<S: Into<String>>(
        name: S,
        entries: &[String],
        substitutions: &[(String, String)],
    ) -> Result<Self> {
        let (phrases, words): (Vec<String>, Vec<String>) = entries
            .iter()
            .filter(|e| !e.is_empty())
            .cloned()
            .partition(|e| e.contains(' '));

        Ok(PhraseTrigger {
            name: name.into(),
            words: words.into_iter().collect(),
            phrases,
            punctuation: PatternReplaceCharFilter::new(r"[[:punct:]]", " ")?,
            substitutions: MappingCharFilter::new(substitutions.iter().cloned()),
        })
    }

    fn prepare(&self, text: &str) -> String {
        let stripped = self.punctuation.filter(&text.to_lowercase());
        self.substitutions.filter(&stripped)
    }
}

impl SignalDetector for PhraseTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, text: &str) -> f64 {
        let prepared = self.prepare(text);
        let token_hits = prepared
            .split_whitespace()
            .filter(|token| self.words.contains(*token))
            .count();
        let phrase_hits = self
            .phrases
            .iter()
            .filter(|phrase| prepared.contains(phrase.as_str()))
            .count();
        (token_hits + phrase_hits) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_counts_each_word_once() {
        let trigger = VocabularyTrigger::new("pos_trigger", &strings(&["love", "great"])).unwrap();
        assert_eq!(trigger.detect("Love love LOVE it"), 1.0);
        assert_eq!(trigger.detect("great, I love it"), 2.0);
        // Substring semantics.
        assert_eq!(trigger.detect("lovely"), 1.0);
        assert_eq!(trigger.detect(""), 0.0);
    }

    #[test]
    fn test_vocabulary_nested_and_duplicate_words() {
        let trigger = VocabularyTrigger::new(
            "neg_trigger",
            &strings(&["scam", "scammer", "Scam", "", "bad"]),
        )
        .unwrap();
        assert_eq!(trigger.len(), 3);
        // "scammer" contains "scam": both count.
        assert_eq!(trigger.detect("what a SCAMMER"), 2.0);
        assert_eq!(trigger.detect("scam scam scam"), 1.0);
        assert_eq!(trigger.detect("not bad, a scam"), 2.0);
    }

    #[test]
    fn test_empty_vocabulary_never_fires() {
        let trigger = VocabularyTrigger::new("pos_trigger", &[]).unwrap();
        assert!(trigger.is_empty());
        assert_eq!(trigger.detect("anything at all"), 0.0);
    }

    #[test]
    fn test_phrase_trigger_tokens_and_phrases() {
        let trigger = PhraseTrigger::new(
            "damage_trigger",
            &strings(&["broken", "fell apart", "cracked"]),
            &[],
        )
        .unwrap();

        assert_eq!(trigger.detect("Broken, broken!"), 2.0);
        assert_eq!(trigger.detect("it fell apart"), 1.0);
        // Repeated phrases count once.
        assert_eq!(trigger.detect("fell apart and fell apart again"), 1.0);
        assert_eq!(trigger.detect("unbroken"), 0.0);
    }

    #[test]
    fn test_phrase_trigger_applies_substitutions() {
        let trigger = PhraseTrigger::new(
            "side_effect_trigger",
            &strings(&["breakout"]),
            &[("pimples".to_string(), "breakout".to_string())],
        )
        .unwrap();
        assert_eq!(trigger.detect("gave me pimples."), 1.0);
    }

    #[test]
    fn test_entries_with_spaces_are_substrings() {
        let trigger = PhraseTrigger::new("quality_trigger", &strings(&["cheap "]), &[]).unwrap();
        assert_eq!(trigger.detect("feels cheap and thin"), 1.0);
        assert_eq!(trigger.detect("cheap"), 0.0);
    }
}
