//! Text analysis for review normalization.
//!
//! Raw review text flows through char filters, a tokenizer and token filters,
//! assembled by a [`PipelineAnalyzer`](analyzer::pipeline::PipelineAnalyzer):
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Token Filters → Lemma Stream
//! ```
//!
//! [`ReviewAnalyzer`](analyzer::review::ReviewAnalyzer) wires the fixed chain
//! used to normalize review text before vectorization.

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
