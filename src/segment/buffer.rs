//! Mutable buffer for in-memory writes
//!
//! Holds the postings (and optionally term positions) of documents added
//! since the last flush. The raw documents themselves go straight into the
//! segment's staging document store.

use std::collections::HashMap;

use super::types::DocId;

/// Postings of one term inside the buffer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BufferedTerm {
    /// Ascending, unique document ids
    pub docs: Vec<DocId>,
    /// `positions[i]` are the token offsets of the term in `docs[i]`;
    /// empty when the buffer is not positional
    pub positions: Vec<Vec<u32>>,
}

/// In-memory buffer for recent writes
#[derive(Debug, Default)]
pub struct MutableBuffer {
    terms: HashMap<String, BufferedTerm>,
    doc_count: u32,
    positional: bool,
}

impl MutableBuffer {
    pub fn new(positional: bool) -> Self {
        Self {
            terms: HashMap::new(),
            doc_count: 0,
            positional,
        }
    }

    /// Index the analyzed terms of the next document.
    ///
    /// Returns the dense id assigned to the document.
    pub fn add_document(&mut self, terms: &[String]) -> DocId {
        let doc = self.doc_count;
        self.doc_count += 1;

        for (position, term) in terms.iter().enumerate() {
            let entry = self.terms.entry(term.clone()).or_default();
            if entry.docs.last() != Some(&doc) {
                entry.docs.push(doc);
                if self.positional {
                    entry.positions.push(Vec::new());
                }
            }
            if self.positional {
                if let Some(list) = entry.positions.last_mut() {
                    list.push(position as u32);
                }
            }
        }

        doc
    }

    pub fn get(&self, term: &str) -> Option<&BufferedTerm> {
        self.terms.get(term)
    }

    /// Documents added since the last clear
    pub fn num_documents(&self) -> u32 {
        self.doc_count
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_count == 0
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    /// Terms in lexicographic order
    pub fn sorted_terms(&self) -> Vec<(&str, &BufferedTerm)> {
        let mut terms: Vec<_> = self.terms.iter().map(|(t, e)| (t.as_str(), e)).collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(b.0));
        terms
    }

    pub fn clear(&mut self) {
        self.terms.clear();
        self.doc_count = 0;
    }
}
