//! Non-ASCII removal.
//!
//! Emoji and accented letters are dropped outright; emoji are counted
//! separately by the lexical signals before this filter ever runs.

use super::CharFilter;

#[derive(Clone, Debug, Default)]
pub struct AsciiFoldCharFilter;

impl AsciiFoldCharFilter {
    pub fn new() -> Self {
        AsciiFoldCharFilter
    }
}

impl CharFilter for AsciiFoldCharFilter {
    fn filter(&self, input: &str) -> String {
        input.chars().filter(char::is_ascii).collect()
    }

    fn name(&self) -> &'static str {
        "ascii_fold"
    }
}
