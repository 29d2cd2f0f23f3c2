//! Rule-based English lemmatizer.
//!
//! Irregular forms come from the lexicon; everything else is handled by a
//! small set of suffix rules selected by a coarse part-of-speech guess.

use std::collections::{HashMap, HashSet};

use super::{Lemmatizer, PartOfSpeech};
use crate::lexicon::Lexicon;

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "my", "your", "his", "her", "its", "our",
    "their", "some", "any", "every", "each", "much", "many", "few", "several", "both", "all",
];

/// Words after which the next token is most likely a verb.
const VERB_CONTEXT: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "to", "not", "never", "will", "would", "can",
    "could", "should", "might", "must", "may", "do", "does", "did", "have", "has", "had", "am",
    "is", "are", "was", "were", "be", "been",
];

/// Words ending in `s` that are not plurals or third-person forms.
const INVARIANT_S: &[&str] = &[
    "always", "perhaps", "sometimes", "afterwards", "besides", "towards", "unless", "thus", "news",
    "series", "species", "lens", "plus", "yes", "this", "less", "bus", "gas",
];

/// Stem endings that lost a silent `e` to `-ed`/`-ing`, each with the longer
/// endings that did not ("treat", "pour", "explain").
const SILENT_E_ENDINGS: &[(&str, &[&str])] = &[
    ("chas", &[]),
    ("eas", &[]),
    ("us", &["ocus"]),
    ("c", &[]),
    ("iz", &[]),
    ("yz", &[]),
    ("ag", &[]),
    ("chang", &[]),
    ("ur", &["our"]),
    ("at", &["eat", "oat"]),
    ("ar", &["ear", "oar"]),
    ("ir", &["air"]),
    ("in", &["ain", "oin", "uin", "ein"]),
];

#[derive(Clone, Debug, Default)]
pub struct EnglishLemmatizer {
    irregular_verbs: HashMap<String, String>,
    irregular_nouns: HashMap<String, String>,
    determiners: HashSet<&'static str>,
    verb_context: HashSet<&'static str>,
    invariant: HashSet<&'static str>,
}

impl EnglishLemmatizer {
    pub fn new(
        irregular_verbs: HashMap<String, String>,
        irregular_nouns: HashMap<String, String>,
    ) -> Self {
        EnglishLemmatizer {
            irregular_verbs,
            irregular_nouns,
            determiners: DETERMINERS.iter().copied().collect(),
            verb_context: VERB_CONTEXT.iter().copied().collect(),
            invariant: INVARIANT_S.iter().copied().collect(),
        }
    }

    pub fn from_lexicon(lexicon: &Lexicon) -> Self {
        Self::new(
            lexicon.irregular_lemmas.verb.clone(),
            lexicon.irregular_lemmas.noun.clone(),
        )
    }

    fn lemmatize_verb(&self, word: &str) -> String {
        if let Some(lemma) = self.irregular_verbs.get(word) {
            return lemma.clone();
        }
        if word.len() <= 3 || self.invariant.contains(word) {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{stem}y");
        }
        if let Some(stem) = word.strip_suffix("ied") {
            return format!("{stem}y");
        }
        if word.ends_with("eed") {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ing") {
            if has_vowel(stem) && stem.len() >= 2 {
                return restore_stem(stem);
            }
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ed") {
            if has_vowel(stem) && stem.len() >= 2 {
                return restore_stem(stem);
            }
            return word.to_string();
        }
        strip_plural(word)
    }

    fn lemmatize_noun(&self, word: &str) -> String {
        if let Some(lemma) = self.irregular_nouns.get(word) {
            return lemma.clone();
        }
        if word.len() <= 3 || self.invariant.contains(word) {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{stem}y");
        }
        strip_plural(word)
    }
}

impl Lemmatizer for EnglishLemmatizer {
    fn tag(&self, previous: Option<&str>, word: &str) -> PartOfSpeech {
        if let Some(previous) = previous {
            if self.determiners.contains(previous) {
                return PartOfSpeech::Noun;
            }
            if self.verb_context.contains(previous) {
                return PartOfSpeech::Verb;
            }
        }
        if self.irregular_verbs.contains_key(word) {
            return PartOfSpeech::Verb;
        }
        if self.irregular_nouns.contains_key(word) {
            return PartOfSpeech::Noun;
        }
        // Bare -ing forms are usually adjectival ("amazing", "disappointing").
        if word.ends_with("ed") && word.len() > 4 {
            return PartOfSpeech::Verb;
        }
        if word.ends_with('s') {
            return PartOfSpeech::Noun;
        }
        PartOfSpeech::Other
    }

    fn lemmatize(&self, word: &str, pos: PartOfSpeech) -> String {
        match pos {
            PartOfSpeech::Verb => self.lemmatize_verb(word),
            PartOfSpeech::Noun => self.lemmatize_noun(word),
            PartOfSpeech::Other => word.to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "english"
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn has_vowel(s: &str) -> bool {
    s.chars().any(|c| is_vowel(c) || c == 'y')
}

fn strip_plural(word: &str) -> String {
    for suffix in ["sses", "ches", "shes", "xes", "zes", "oes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with('s') && !["ss", "us", "is", "ous"].iter().any(|s| word.ends_with(s)) {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Rebuild a verb stem after an `-ing`/`-ed` suffix was removed.
fn restore_stem(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();

    let last = chars[n - 1];
    if n >= 3 && last == chars[n - 2] && !is_vowel(last) && !matches!(last, 'l' | 's' | 'z') {
        return chars[..n - 1].iter().collect();
    }
    if last == 'v' || stem.ends_with("dg") || stem.ends_with("rg") {
        return format!("{stem}e");
    }
    if lost_silent_e(stem) {
        return format!("{stem}e");
    }
    // handl, troubl; but curl, howl, fail
    if n >= 3 && last == 'l' && !is_vowel(chars[n - 2]) && !matches!(chars[n - 2], 'l' | 'r' | 'w') {
        return format!("{stem}e");
    }

    let vowels = chars.iter().filter(|c| is_vowel(**c)).count();
    if n >= 3
        && vowels == 1
        && !is_vowel(chars[n - 3])
        && is_vowel(chars[n - 2])
        && !is_vowel(last)
        && !matches!(last, 'w' | 'x' | 'y')
    {
        return format!("{stem}e");
    }
    stem.to_string()
}

fn lost_silent_e(stem: &str) -> bool {
    SILENT_E_ENDINGS.iter().any(|(ending, keep)| {
        stem.ends_with(ending) && !keep.iter().any(|k| stem.ends_with(k))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemmatizer() -> EnglishLemmatizer {
        EnglishLemmatizer::from_lexicon(&Lexicon::builtin().unwrap())
    }

    #[test]
    fn test_verb_rules() {
        let l = lemmatizer();
        let cases = [
            ("stopped", "stop"),
            ("returned", "return"),
            ("liked", "like"),
            ("coming", "come"),
            ("getting", "get"),
            ("smelled", "smell"),
            ("missing", "miss"),
            ("tried", "try"),
            ("works", "work"),
            ("fixes", "fix"),
            ("loved", "love"),
            ("broke", "break"),
            ("was", "be"),
            ("need", "need"),
            ("thing", "thing"),
        ];
        for (word, expected) in cases {
            assert_eq!(l.lemmatize(word, PartOfSpeech::Verb), expected, "{word}");
        }
    }

    #[test]
    fn test_common_review_verbs() {
        let l = lemmatizer();
        let cases = [
            ("purchased", "purchase"),
            ("purchasing", "purchase"),
            ("using", "use"),
            ("used", "use"),
            ("caused", "cause"),
            ("pleased", "please"),
            ("increased", "increase"),
            ("damaged", "damage"),
            ("packaged", "package"),
            ("changed", "change"),
            ("noticed", "notice"),
            ("reduced", "reduce"),
            ("realized", "realize"),
            ("updated", "update"),
            ("compared", "compare"),
            ("required", "require"),
            ("combined", "combine"),
            ("handled", "handle"),
            ("troubled", "trouble"),
            ("arrived", "arrive"),
            ("focused", "focus"),
            ("treated", "treat"),
            ("poured", "pour"),
            ("appeared", "appear"),
            ("explained", "explain"),
            ("repaired", "repair"),
            ("joined", "join"),
            ("curled", "curl"),
            ("failed", "fail"),
            ("smelled", "smell"),
            ("occurred", "occur"),
        ];
        for (word, expected) in cases {
            assert_eq!(l.lemmatize(word, PartOfSpeech::Verb), expected, "{word}");
        }
    }

    #[test]
    fn test_noun_rules() {
        let l = lemmatizer();
        let cases = [
            ("bottles", "bottle"),
            ("batteries", "battery"),
            ("boxes", "box"),
            ("glasses", "glass"),
            ("watches", "watch"),
            ("glass", "glass"),
            ("status", "status"),
            ("teeth", "tooth"),
            ("news", "news"),
        ];
        for (word, expected) in cases {
            assert_eq!(l.lemmatize(word, PartOfSpeech::Noun), expected, "{word}");
        }
    }

    #[test]
    fn test_contraction_fragments_are_untouched() {
        let l = lemmatizer();
        for word in ["won", "don", "didn"] {
            let pos = l.tag(Some("i"), word);
            assert_eq!(l.lemmatize(word, pos), word);
        }
    }

    #[test]
    fn test_tagging() {
        let l = lemmatizer();
        assert_eq!(l.tag(Some("the"), "working"), PartOfSpeech::Noun);
        assert_eq!(l.tag(Some("was"), "working"), PartOfSpeech::Verb);
        assert_eq!(l.tag(None, "amazing"), PartOfSpeech::Other);
        assert_eq!(l.tag(None, "bottles"), PartOfSpeech::Noun);
        assert_eq!(l.tag(None, "arrived"), PartOfSpeech::Verb);
    }
}
