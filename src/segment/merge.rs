//! Pairwise segment merging
//!
//! A merge pass folds segments `(0, 1), (2, 3), ...` into slots `0, 1, ...`.
//! Documents of the right segment are renumbered after the left segment's,
//! terms in the deletion log are dropped, and encoded position lists are
//! copied forward byte for byte; only the offset tables are rebuilt.
//!
//! An odd trailing segment moves into the next free slot untouched, unless
//! the deletion log is non-empty, in which case it is rewritten alone so
//! deleted terms are purged from it as well.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::compress::Compressor;
use crate::error::SegdexError;
use crate::storage::DocStore;
use crate::Result;

use super::directory::{IndexDirectory, SegmentFile};
use super::manifest::ManifestEntry;
use super::reader::SegmentReader;
use super::types::{DocId, MergedWordBlock, SegmentId, WordBlock};
use super::writer::SegmentWriter;

/// Merges segments of one index directory
pub struct MergeEngine<'a> {
    dir: &'a IndexDirectory,
    compressor: &'a dyn Compressor,
    positional: bool,
}

impl<'a> MergeEngine<'a> {
    pub fn new(dir: &'a IndexDirectory, compressor: &'a dyn Compressor, positional: bool) -> Self {
        Self {
            dir,
            compressor,
            positional,
        }
    }

    /// Run one pass over `segments` (ordered by id, ids dense from 0).
    ///
    /// Returns the manifest entries of the resulting `ceil(n / 2)` segments.
    pub fn merge_pass(
        &self,
        segments: &[ManifestEntry],
        deleted: &BTreeSet<String>,
    ) -> Result<Vec<ManifestEntry>> {
        let mut merged = Vec::with_capacity(segments.len().div_ceil(2));

        for (slot, pair) in segments.chunks(2).enumerate() {
            let target = SegmentId::new(slot as u32);
            let left = &pair[0];
            let entry = match pair.get(1) {
                Some(right) => self.merge_pair(left.id, Some(right.id), target, deleted)?,
                None if deleted.is_empty() => {
                    self.dir.rename_segment(left.id, target, self.positional)?;
                    debug!("Moved trailing {} to {}", left.id, target);
                    ManifestEntry {
                        id: target,
                        ..left.clone()
                    }
                }
                None => self.merge_pair(left.id, None, target, deleted)?,
            };
            merged.push(entry);
        }

        Ok(merged)
    }

    /// Merge `left` and `right` (or compact `left` alone) into slot `target`.
    ///
    /// The source segments are deleted and the result is promoted into
    /// `target` once every file is written.
    pub fn merge_pair(
        &self,
        left: SegmentId,
        right: Option<SegmentId>,
        target: SegmentId,
        deleted: &BTreeSet<String>,
    ) -> Result<ManifestEntry> {
        let left_reader = SegmentReader::open(self.dir, left, self.positional, self.compressor)?;
        let right_reader = right
            .map(|id| SegmentReader::open(self.dir, id, self.positional, self.compressor))
            .transpose()?;

        let mut terms: BTreeMap<String, MergedWordBlock> = BTreeMap::new();
        for block in left_reader.word_blocks()? {
            if !deleted.contains(&block.term) {
                let slot = terms.entry(block.term.clone()).or_default();
                slot.left = Some(block);
            }
        }
        if let Some(reader) = &right_reader {
            for block in reader.word_blocks()? {
                if !deleted.contains(&block.term) {
                    let slot = terms.entry(block.term.clone()).or_default();
                    slot.right = Some(block);
                }
            }
        }

        let shift = u32::try_from(left_reader.doc_count()).map_err(|_| {
            SegdexError::Internal(format!("{} holds too many documents to merge", left))
        })?;

        let mut store = DocStore::create(self.dir.staging_path(target, SegmentFile::Store))?;
        for item in left_reader.documents() {
            let (id, doc) = item?;
            store.add_document(id, &doc)?;
        }
        if let Some(reader) = &right_reader {
            for item in reader.documents() {
                let (id, doc) = item?;
                store.add_document(shift_id(id, shift)?, &doc)?;
            }
        }
        let doc_count = store.size();
        store.close()?;

        let mut writer = SegmentWriter::create(self.dir, target, self.positional, self.compressor)?;
        let mut shared = 0usize;
        for (term, pair) in &terms {
            let mut postings = Vec::new();
            let mut positions = Vec::new();
            if !pair.is_single() {
                shared += 1;
            }
            if let Some(block) = &pair.left {
                self.collect(&left_reader, block, 0, &mut postings, &mut positions)?;
            }
            if let (Some(block), Some(reader)) = (&pair.right, &right_reader) {
                self.collect(reader, block, shift, &mut postings, &mut positions)?;
            }
            writer.write_term(term, &postings, &positions)?;
        }
        let stats = writer.finish()?;

        drop(left_reader);
        drop(right_reader);
        self.dir.remove_segment(left)?;
        if let Some(right) = right {
            self.dir.remove_segment(right)?;
        }
        self.dir.promote(target, self.positional)?;

        match right {
            Some(right) => debug!(
                "Merged {} and {} into {}: {} documents, {} terms ({} shared)",
                left, right, target, doc_count, stats.term_count, shared
            ),
            None => debug!(
                "Compacted {} into {}: {} documents, {} terms",
                left, target, doc_count, stats.term_count
            ),
        }

        Ok(ManifestEntry::new(target, doc_count, stats.term_count))
    }

    /// Append one side's postings (shifted) and encoded positions
    fn collect(
        &self,
        reader: &SegmentReader<'_>,
        block: &WordBlock,
        shift: DocId,
        postings: &mut Vec<DocId>,
        positions: &mut Vec<Vec<u8>>,
    ) -> Result<()> {
        if self.positional {
            let list = reader.list_block(block)?;
            for idx in 0..list.postings.len() {
                positions.push(reader.position_bytes(&list, idx)?);
            }
            for &doc in &list.postings {
                postings.push(shift_id(doc, shift)?);
            }
        } else {
            for doc in reader.postings(block)? {
                postings.push(shift_id(doc, shift)?);
            }
        }
        Ok(())
    }
}

fn shift_id(doc: DocId, shift: DocId) -> Result<DocId> {
    doc.checked_add(shift)
        .ok_or_else(|| SegdexError::Internal("document id overflow while merging".to_string()))
}
