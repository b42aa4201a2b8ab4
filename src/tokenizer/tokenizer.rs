use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use stop_words::{get, LANGUAGE};
use unicode_segmentation::UnicodeSegmentation;

use super::Analyzer;
use crate::config::TokenizerConfig;
use crate::error::SegdexError;
use crate::Result;

/// Map a configured language name to its stemmer and stop-word list
fn resolve_language(name: &str) -> Option<(Algorithm, LANGUAGE)> {
    let resolved = match name.to_ascii_lowercase().as_str() {
        "english" | "en" => (Algorithm::English, LANGUAGE::English),
        "french" | "fr" => (Algorithm::French, LANGUAGE::French),
        "german" | "de" => (Algorithm::German, LANGUAGE::German),
        "spanish" | "es" => (Algorithm::Spanish, LANGUAGE::Spanish),
        "italian" | "it" => (Algorithm::Italian, LANGUAGE::Italian),
        "portuguese" | "pt" => (Algorithm::Portuguese, LANGUAGE::Portuguese),
        "dutch" | "nl" => (Algorithm::Dutch, LANGUAGE::Dutch),
        "russian" | "ru" => (Algorithm::Russian, LANGUAGE::Russian),
        "swedish" | "sv" => (Algorithm::Swedish, LANGUAGE::Swedish),
        _ => return None,
    };
    Some(resolved)
}

/// Unicode word tokenizer with optional stemming and stop-word removal.
///
/// Terms are emitted in document order; a filtered word does not leave a gap,
/// so positions always index the returned sequence.
pub struct Tokenizer {
    config: TokenizerConfig,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

impl Tokenizer {
    /// Build a tokenizer; fails if `config.language` is not supported
    pub fn new(config: &TokenizerConfig) -> Result<Self> {
        let (algorithm, language) = resolve_language(&config.language).ok_or_else(|| {
            SegdexError::InvalidArgument(format!("unsupported language '{}'", config.language))
        })?;
        Ok(Self::with_language(config, algorithm, language))
    }

    fn with_language(config: &TokenizerConfig, algorithm: Algorithm, language: LANGUAGE) -> Self {
        let stemmer = config.stem.then(|| Stemmer::create(algorithm));
        let stopwords = if config.remove_stopwords {
            get(language).into_iter().map(|s| s.to_lowercase()).collect()
        } else {
            HashSet::new()
        };

        Self {
            config: config.clone(),
            stemmer,
            stopwords,
        }
    }

    /// Tokenizer that only lowercases and splits on word boundaries
    pub fn plain() -> Self {
        Self::with_language(&TokenizerConfig::plain(), Algorithm::English, LANGUAGE::English)
    }

    /// Normalize one word; `None` if it is filtered out
    fn normalize(&self, word: &str) -> Option<String> {
        let token = if self.config.lowercase {
            word.to_lowercase()
        } else {
            word.to_string()
        };
        let len = token.chars().count();
        if len < self.config.min_token_length || len > self.config.max_token_length {
            return None;
        }
        if self.stopwords.contains(&token) {
            return None;
        }
        match &self.stemmer {
            Some(stemmer) => Some(stemmer.stem(&token).into_owned()),
            None => Some(token),
        }
    }

    /// Split text into normalized terms
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .filter_map(|word| self.normalize(word))
            .collect()
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::with_language(&TokenizerConfig::default(), Algorithm::English, LANGUAGE::English)
    }
}

impl Analyzer for Tokenizer {
    fn analyze(&self, text: &str) -> Vec<String> {
        self.tokenize(text)
    }
}
