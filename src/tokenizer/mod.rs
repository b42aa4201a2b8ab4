//! Text analysis
//!
//! The index only depends on the [`Analyzer`] contract: a pure function from
//! text to an ordered sequence of normalized terms. Term positions are the
//! indices into that sequence.

mod punctuation;
mod tokenizer;
mod word_break;

pub use punctuation::PunctuationAnalyzer;
pub use tokenizer::Tokenizer;
pub use word_break::WordBreakAnalyzer;

/// Turns raw text into normalized terms, in document order.
///
/// May return an empty sequence. Implementations must be deterministic, since
/// queries are analyzed with the same analyzer that indexed the documents.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Vec<String>;
}

impl<F> Analyzer for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn analyze(&self, text: &str) -> Vec<String> {
        self(text)
    }
}
