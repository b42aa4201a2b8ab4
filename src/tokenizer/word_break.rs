use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use stop_words::{get, LANGUAGE};
use tracing::debug;

use super::Analyzer;
use crate::error::SegdexError;
use crate::Result;

/// Breaks text written without spaces into dictionary words.
///
/// Every dictionary word carries a frequency; among all ways to cover the
/// text with words, the one with the highest product of word probabilities
/// wins. Matching is case-insensitive and stop words are dropped afterwards.
///
/// `"thecatdog"` analyzes to `["cat", "dog"]` given a dictionary holding
/// `the`, `cat` and `dog`.
pub struct WordBreakAnalyzer {
    /// Word -> natural log of its relative frequency
    log_probs: HashMap<String, f64>,
    /// Length in chars of the longest dictionary word
    max_word_chars: usize,
    stopwords: HashSet<String>,
}

impl WordBreakAnalyzer {
    /// Build from `(word, count)` pairs; counts of repeated words add up
    pub fn from_frequencies<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for (word, count) in entries {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() || count == 0 {
                continue;
            }
            *counts.entry(word).or_default() += count;
        }
        if counts.is_empty() {
            return Err(SegdexError::InvalidArgument(
                "word-break dictionary has no usable entries".to_string(),
            ));
        }

        let total = counts.values().map(|&c| c as f64).sum::<f64>();
        let max_word_chars = counts.keys().map(|w| w.chars().count()).max().unwrap_or(0);
        let log_probs = counts
            .into_iter()
            .map(|(word, count)| (word, (count as f64 / total).ln()))
            .collect();

        Ok(Self {
            log_probs,
            max_word_chars,
            stopwords: get(LANGUAGE::English)
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
        })
    }

    /// Parse a frequency dictionary with one `word count` pair per line
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut entries = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let count = fields
                .next()
                .and_then(|c| c.parse::<u64>().ok())
                .ok_or_else(|| {
                    SegdexError::InvalidArgument(format!(
                        "dictionary line {}: expected 'word count', got '{}'",
                        line_no + 1,
                        line.trim()
                    ))
                })?;
            entries.push((word.to_string(), count));
        }
        Self::from_frequencies(entries)
    }

    /// Load a frequency dictionary file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let analyzer = Self::from_reader(BufReader::new(file))?;
        debug!(
            "Loaded {} dictionary words from {}",
            analyzer.log_probs.len(),
            path.as_ref().display()
        );
        Ok(analyzer)
    }

    /// Keep stop words in the output
    pub fn without_stopwords(mut self) -> Self {
        self.stopwords.clear();
        self
    }

    /// Most probable split of `text` into dictionary words, stop words removed.
    ///
    /// Surrounding whitespace is ignored. Fails with `InvalidArgument` when no
    /// split exists, which includes any text with inner spaces or symbols
    /// missing from the dictionary.
    pub fn segment(&self, text: &str) -> Result<Vec<String>> {
        let chars: Vec<char> = text.trim().to_lowercase().chars().collect();
        let n = chars.len();
        if n == 0 {
            return Ok(Vec::new());
        }
        let width = self.max_word_chars.min(n);

        // cell (start, len) holds the log probability of chars[start..start + len]
        let mut arena: Vec<Option<f64>> = vec![None; n * width];
        let mut word = String::new();
        for start in 0..n {
            word.clear();
            for len in 1..=width.min(n - start) {
                word.push(chars[start + len - 1]);
                arena[start * width + len - 1] = self.log_probs.get(word.as_str()).copied();
            }
        }

        // best[end]: score of the best split of chars[..end] and its last word length
        let mut best: Vec<Option<(f64, usize)>> = vec![None; n + 1];
        best[0] = Some((0.0, 0));
        for end in 1..=n {
            for len in 1..=width.min(end) {
                let start = end - len;
                let (Some((prefix, _)), Some(log_prob)) = (best[start], arena[start * width + len - 1])
                else {
                    continue;
                };
                let score = prefix + log_prob;
                if best[end].map_or(true, |(current, _)| score > current) {
                    best[end] = Some((score, len));
                }
            }
        }

        let mut words = Vec::new();
        let mut end = n;
        while end > 0 {
            let (_, len) = best[end].ok_or_else(|| {
                SegdexError::InvalidArgument(format!(
                    "'{}' cannot be broken into dictionary words",
                    text.trim()
                ))
            })?;
            words.push(chars[end - len..end].iter().collect::<String>());
            end -= len;
        }
        words.reverse();
        words.retain(|word| !self.stopwords.contains(word));
        Ok(words)
    }
}

impl Analyzer for WordBreakAnalyzer {
    /// Unbreakable text yields no terms
    fn analyze(&self, text: &str) -> Vec<String> {
        self.segment(text).unwrap_or_else(|e| {
            debug!("Word break failed: {}", e);
            Vec::new()
        })
    }
}
