//! Regex detectors for return requests, non-conformity and broken promises.

use regex::Regex;

use super::SignalDetector;
use crate::error::{Result, TriageError};

/// Emits 1 when any branch matches as a whole-word phrase, else 0.
///
/// Input is lowercased and typographic apostrophes are folded to `'`
/// before matching.
#[derive(Clone, Debug)]
pub struct PatternDetector {
    name: String,
    regex: Regex,
}

impl PatternDetector {
    pub fn new<S: Into<String>>(name: S, branches: &[String]) -> Result<Self> {
        let name = name.into();
        if branches.is_empty() {
            return Err(TriageError::lexicon(format!("pattern '{name}' has no branches")));
        }
        let source = format!(r"(?i)\b({})\b", branches.join("|"));
        let regex = Regex::new(&source)
            .map_err(|e| TriageError::lexicon(format!("invalid pattern '{name}': {e}")))?;
        Ok(PatternDetector { name, regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        let prepared = text.to_lowercase().replace('\u{2019}', "'");
        self.regex.is_match(&prepared)
    }
}

impl SignalDetector for PatternDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, text: &str) -> f64 {
        if self.is_match(text) { 1.0 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    fn detector(kind: &str) -> PatternDetector {
        let lexicon = Lexicon::builtin().unwrap();
        let branches = match kind {
            "return" => &lexicon.patterns.return_refund,
            "conformity" => &lexicon.patterns.non_conformity,
            _ => &lexicon.patterns.broken_promise,
        };
        PatternDetector::new(kind, branches).unwrap()
    }

    #[test]
    fn test_return_refund() {
        let d = detector("return");
        assert_eq!(d.detect("it arrived broken and I want a refund"), 1.0);
        assert_eq!(d.detect("I SENT IT BACK"), 1.0);
        assert_eq!(d.detect("I returned them"), 1.0);
        assert_eq!(d.detect("works as expected"), 0.0);
        // Whole words only.
        assert_eq!(d.detect("refundation"), 0.0);
    }

    #[test]
    fn test_non_conformity() {
        let d = detector("conformity");
        assert_eq!(d.detect("Not as described at all"), 1.0);
        assert_eq!(d.detect("looks nothing like the photo"), 1.0);
        assert_eq!(d.detect("wrong size"), 1.0);
        assert_eq!(d.detect("lovely scent"), 0.0);
    }

    #[test]
    fn test_broken_promise_with_typographic_apostrophe() {
        let d = detector("promise");
        assert_eq!(d.detect("It didn\u{2019}t work"), 1.0);
        assert_eq!(d.detect("completely useless"), 1.0);
        assert_eq!(d.detect("smells nice"), 0.0);
    }

    #[test]
    fn test_empty_branches_rejected() {
        assert!(PatternDetector::new("empty", &[]).is_err());
        assert!(PatternDetector::new("bad", &["(unclosed".to_string()]).is_err());
    }
}
