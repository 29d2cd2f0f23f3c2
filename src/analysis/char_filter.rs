//! Char filter implementations for text normalization.
//!
//! Char filters rewrite the raw string before it reaches the tokenizer.
//!
//! # Available Filters
//!
//! - [`lowercase::LowercaseCharFilter`] - Unicode lowercasing
//! - [`mapping::MappingCharFilter`] - Ordered substring replacement table
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement
//! - [`ascii::AsciiFoldCharFilter`] - Removal of non-ASCII characters
//! - [`number::NumberCharFilter`] - Digits and cardinal number words to a placeholder
//!
//! # Examples
//!
//! ```
//! use review_triage::analysis::char_filter::CharFilter;
//! use review_triage::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
//!
//! let filter = PatternReplaceCharFilter::new(r"[[:punct:]]", " ").unwrap();
//! assert_eq!(filter.filter("it's great!"), "it s great ");
//! ```

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod ascii;
pub mod lowercase;
pub mod mapping;
pub mod number;
pub mod pattern_replace;

pub use ascii::AsciiFoldCharFilter;
pub use lowercase::LowercaseCharFilter;
pub use mapping::MappingCharFilter;
pub use number::NumberCharFilter;
pub use pattern_replace::PatternReplaceCharFilter;
