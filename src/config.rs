use serde::{Deserialize, Serialize};

/// Index configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Flush the in-memory buffer once it holds this many documents
    pub flush_threshold: usize,
    /// Merge segments pairwise once this many segments exist
    pub merge_threshold: usize,
    /// Record per-document term positions (enables phrase queries)
    pub positional: bool,
}

impl IndexConfig {
    pub const DEFAULT_FLUSH_THRESHOLD: usize = 1000;
    pub const DEFAULT_MERGE_THRESHOLD: usize = 8;

    pub fn positional() -> Self {
        Self {
            positional: true,
            ..Self::default()
        }
    }

    pub fn with_flush_threshold(mut self, threshold: usize) -> Self {
        self.flush_threshold = threshold;
        self
    }

    pub fn with_merge_threshold(mut self, threshold: usize) -> Self {
        self.merge_threshold = threshold;
        self
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            flush_threshold: Self::DEFAULT_FLUSH_THRESHOLD,
            merge_threshold: Self::DEFAULT_MERGE_THRESHOLD,
            positional: false,
        }
    }
}

/// Tokenizer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
    pub language: String,
}

impl TokenizerConfig {
    /// Lowercasing only: every word is kept verbatim
    pub fn plain() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: false,
            stem: false,
            min_token_length: 1,
            max_token_length: 255,
            language: "english".to_string(),
        }
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: true,
            stem: true,
            min_token_length: 2,
            max_token_length: 50,
            language: "english".to_string(),
        }
    }
}
