//! Segment manifest for tracking live segments
//!
//! The manifest replaces filename probing as the source of truth for which
//! segments exist. Update protocol:
//! 1. Write and promote new segment files
//! 2. Write segments.manifest.tmp, fsync
//! 3. Rename to segments.manifest

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::current_timestamp;
use crate::Result;

use super::types::SegmentId;

/// Manifest entry for a segment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: SegmentId,
    /// Number of documents in the segment's store
    pub doc_count: u64,
    /// Number of word blocks in the dictionary
    pub term_count: u64,
    /// Creation timestamp (seconds since epoch)
    pub created_at: u64,
}

impl ManifestEntry {
    pub fn new(id: SegmentId, doc_count: u64, term_count: u64) -> Self {
        Self {
            id,
            doc_count,
            term_count,
            created_at: current_timestamp(),
        }
    }
}

/// The segment manifest tracks all live segments and the deletion log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentManifest {
    /// Manifest version (for format upgrades)
    pub version: u32,
    /// Generation number (incremented on each update)
    pub generation: u64,
    /// Whether segments carry position lists
    pub positional: bool,
    /// Name of the codec used for every encoded list
    pub compressor: String,
    /// Live segments; `segments[i].id == i`
    pub segments: Vec<ManifestEntry>,
    /// Terms deleted since the last merge pass
    #[serde(default)]
    pub deleted_terms: BTreeSet<String>,
    /// Timestamp of last update
    pub updated_at: u64,
}

impl SegmentManifest {
    /// Current manifest format version
    pub const VERSION: u32 = 1;

    pub fn new(positional: bool, compressor: impl Into<String>) -> Self {
        Self {
            version: Self::VERSION,
            generation: 0,
            positional,
            compressor: compressor.into(),
            segments: Vec::new(),
            deleted_terms: BTreeSet::new(),
            updated_at: 0,
        }
    }

    fn touch(&mut self) {
        self.generation += 1;
        self.updated_at = current_timestamp();
    }

    /// Id the next flushed segment will get
    pub fn next_segment_id(&self) -> SegmentId {
        SegmentId::new(self.segments.len() as u32)
    }

    pub fn add_segment(&mut self, entry: ManifestEntry) {
        self.segments.push(entry);
        self.touch();
    }

    /// Replace the segment list after a merge pass
    pub fn replace_segments(&mut self, segments: Vec<ManifestEntry>) {
        self.segments = segments;
        self.touch();
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get_segment(&self, id: SegmentId) -> Option<&ManifestEntry> {
        self.segments.get(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.segments.iter()
    }

    /// Total document count across all segments
    pub fn total_doc_count(&self) -> u64 {
        self.segments.iter().map(|e| e.doc_count).sum()
    }

    /// Add a term to the deletion log; returns false if already present
    pub fn mark_deleted(&mut self, term: impl Into<String>) -> bool {
        let added = self.deleted_terms.insert(term.into());
        if added {
            self.touch();
        }
        added
    }

    pub fn is_deleted(&self, term: &str) -> bool {
        self.deleted_terms.contains(term)
    }

    pub fn clear_deleted(&mut self) {
        if !self.deleted_terms.is_empty() {
            self.deleted_terms.clear();
            self.touch();
        }
    }

    /// Serialize the manifest to JSON
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Deserialize manifest from JSON
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

impl Default for SegmentManifest {
    fn default() -> Self {
        Self::new(false, "naive")
    }
}
