//! Lemmatizing token filter and lemmatizer implementations.

use super::Filter;
use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

pub mod english;

pub use english::EnglishLemmatizer;

/// Coarse part-of-speech classes used to pick a lemmatization rule set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Other,
}

/// Trait for lemmatization algorithms.
pub trait Lemmatizer: Send + Sync {
    /// Guess the part of speech of `word` given the token that precedes it.
    fn tag(&self, previous: Option<&str>, word: &str) -> PartOfSpeech;

    /// Reduce a word to its dictionary form.
    fn lemmatize(&self, word: &str, pos: PartOfSpeech) -> String;

    /// Get the name of this lemmatizer.
    fn name(&self) -> &'static str;
}

/// Filter that replaces each token by its lemma.
///
/// Tagging looks at the original (not yet lemmatized) previous token.
pub struct LemmaFilter {
    lemmatizer: Box<dyn Lemmatizer>,
}

impl std::fmt::Debug for LemmaFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemmaFilter")
            .field("lemmatizer", &self.lemmatizer.name())
            .finish()
    }
}

impl LemmaFilter {
    /// Create a lemma filter with a custom lemmatizer.
    pub fn with_lemmatizer(lemmatizer: Box<dyn Lemmatizer>) -> Self {
        LemmaFilter { lemmatizer }
    }
}

impl Filter for LemmaFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut previous: Option<String> = None;
        let lemmatized: Vec<Token> = tokens
            .map(|token| {
                if token.is_stopped() {
                    return token;
                }
                let pos = self.lemmatizer.tag(previous.as_deref(), &token.text);
                let lemma = self.lemmatizer.lemmatize(&token.text, pos);
                previous = Some(token.text.clone());
                token.with_text(lemma)
            })
            .collect();

        Ok(Box::new(lemmatized.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lemma"
    }
}
