//! The analyzer used to normalize review text before vectorization.
//!
//! # Examples
//!
//! ```
//! use review_triage::analysis::analyzer::ReviewAnalyzer;
//! use review_triage::lexicon::Lexicon;
//!
//! let analyzer = ReviewAnalyzer::new(&Lexicon::builtin().unwrap()).unwrap();
//! let normalized = analyzer.normalize("The bottles arrived broken!").unwrap();
//! assert_eq!(normalized, "bottle arrive break exclam");
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::{
    AsciiFoldCharFilter, LowercaseCharFilter, MappingCharFilter, NumberCharFilter,
    PatternReplaceCharFilter,
};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{AlphabeticFilter, EnglishLemmatizer, LemmaFilter, StopFilter};
use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::Result;
use crate::lexicon::Lexicon;

/// Emphasis marker substituted for `!`.
pub const EXCLAMATION_TOKEN: &str = "exclam";

/// Review text normalizer.
///
/// Lowercases, applies the lexicon substitutions, strips punctuation and
/// non-ASCII characters, collapses numbers, lemmatizes and removes stopwords.
/// The output is the remaining lemmas joined by single spaces.
#[derive(Clone, Debug)]
pub struct ReviewAnalyzer {
    inner: PipelineAnalyzer,
}

impl ReviewAnalyzer {
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        let markup = MappingCharFilter::new([
            ("<br />".to_string(), String::new()),
            ("!".to_string(), format!(" {EXCLAMATION_TOKEN}")),
        ]);
        let substitutions = MappingCharFilter::new(lexicon.substitutions.iter().cloned());

        let inner = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(LowercaseCharFilter::new()))
            .add_char_filter(Arc::new(markup))
            .add_char_filter(Arc::new(substitutions))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(r"[[:punct:]]", " ")?))
            .add_char_filter(Arc::new(AsciiFoldCharFilter::new()))
            .add_char_filter(Arc::new(NumberCharFilter::new(lexicon.number_words.as_slice())?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(r"\b[a-zA-Z]\b", "")?))
            .add_filter(Arc::new(LemmaFilter::with_lemmatizer(Box::new(
                EnglishLemmatizer::from_lexicon(lexicon),
            ))))
            .add_filter(Arc::new(StopFilter::with_stop_words(
                lexicon.effective_stopwords(),
            )))
            .add_filter(Arc::new(AlphabeticFilter::new()))
            .with_name("review");

        Ok(ReviewAnalyzer { inner })
    }

    /// Normalize a revue into a space-separated lemma string.
    pub fn normalize(&self, text: &str) -> Result<String> {
        let lemmas: Vec<String> = self.inner.analyze(text)?.map(|token| token.text).collect();
        Ok(lemmas.join(" "))
    }
}

impl Analyzer for ReviewAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
