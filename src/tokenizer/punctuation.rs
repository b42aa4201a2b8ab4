use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

use super::Analyzer;

const PUNCTUATIONS: [char; 5] = [',', '.', ';', '?', '!'];

/// Splits on whitespace and `, . ; ? !`, lowercases, and drops stop words.
///
/// `"The cat, and the Dog!"` analyzes to `["cat", "dog"]`.
pub struct PunctuationAnalyzer {
    stopwords: HashSet<String>,
}

impl PunctuationAnalyzer {
    pub fn new() -> Self {
        Self {
            stopwords: get(LANGUAGE::English)
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
        }
    }

    /// Analyzer with no stop-word list
    pub fn without_stopwords() -> Self {
        Self {
            stopwords: HashSet::new(),
        }
    }
}

impl Default for PunctuationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for PunctuationAnalyzer {
    fn analyze(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| c.is_whitespace() || PUNCTUATIONS.contains(&c))
            .filter(|token| !token.is_empty() && !self.stopwords.contains(*token))
            .map(str::to_string)
            .collect()
    }
}
