//! Number placeholder filter.
//!
//! Digit sequences (with an optional decimal part) and runs of spelled-out
//! cardinal words such as `"twenty three"` or `"forty-two"` are replaced by a
//! single placeholder token.

use regex::Regex;

use super::CharFilter;
use crate::error::{Result, TriageError};

/// Replacement token for any number.
pub const NUMBER_TOKEN: &str = "number";

#[derive(Clone, Debug)]
pub struct NumberCharFilter {
    digits: Regex,
    words: Option<Regex>,
}

impl NumberCharFilter {
    /// Create a filter matching digits and the given cardinal words.
    pub fn new<S: AsRef<str>>(number_words: &[S]) -> Result<Self> {
        let digits = Regex::new(r"\b\d+([.,]\d+)?\b")
            .map_err(|e| TriageError::analysis(format!("invalid digit pattern: {e}")))?;

        let mut words: Vec<String> = number_words
            .iter()
            .map(|w| regex::escape(w.as_ref().trim()))
            .filter(|w| !w.is_empty())
            .collect();
        // Longer words first so "seventeen" is preferred over "seven".
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let words = if words.is_empty() {
            None
        } else {
            let alternation = words.join("|");
            let pattern = format!(r"(?i)\b(?:{alternation})(?:[-\s](?:{alternation}))*\b");
            Some(
                Regex::new(&pattern)
                    .map_err(|e| TriageError::analysis(format!("invalid number pattern: {e}")))?,
            )
        };

        Ok(Self { digits, words })
    }
}

impl CharFilter for NumberCharFilter {
    fn filter(&self, input: &str) -> String {
        let replaced = self.digits.replace_all(input, NUMBER_TOKEN);
        match &self.words {
            Some(words) => words.replace_all(&replaced, NUMBER_TOKEN).into_owned(),
            None => replaced.into_owned(),
        }
    }

    fn name(&self) -> &'static str {
        "number"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> NumberCharFilter {
        NumberCharFilter::new(&[
            "one", "two", "three", "seven", "seventeen", "twenty", "forty", "hundred",
        ])
        .unwrap()
    }

    #[test]
    fn test_digits_replaced() {
        assert_eq!(filter().filter("paid 42 for 3 5 items"), "paid number for number number items");
        assert_eq!(filter().filter("costs 3.14"), "costs number");
    }

    #[test]
    fn test_multi_word_numbers_collapse() {
        assert_eq!(filter().filter("twenty three days"), "number days");
        assert_eq!(filter().filter("forty-two"), "number");
        assert_eq!(filter().filter("one hundred seventeen"), "number");
        assert_eq!(filter().filter("Seventeen times"), "number times");
    }

    #[test]
    fn test_word_boundaries_respected() {
        assert_eq!(filter().filter("someone was alone"), "someone was alone");
        assert_eq!(filter().filter("seventh"), "seventh");
    }
}
