//! Immutable segment reader
//!
//! A reader opens one segment's files for the duration of a single query or
//! merge. Word blocks are scanned from the `words` pages; lists and position
//! lists are read on demand and may span page boundaries.

use std::collections::HashMap;

use crate::compress::Compressor;
use crate::error::SegdexError;
use crate::models::Document;
use crate::storage::{DocStore, DocStoreIter, PageFileChannel};
use crate::Result;

use super::codec::{read_at, read_span, read_word_blocks};
use super::directory::{IndexDirectory, SegmentFile};
use super::types::{DocId, ListBlock, SegmentId, WordBlock};

/// Read access to one on-disk segment
pub struct SegmentReader<'a> {
    id: SegmentId,
    compressor: &'a dyn Compressor,
    words: PageFileChannel,
    lists: PageFileChannel,
    positions: Option<PageFileChannel>,
    store: DocStore,
}

impl<'a> SegmentReader<'a> {
    /// Open the canonical files of segment `id`
    pub fn open(
        dir: &IndexDirectory,
        id: SegmentId,
        positional: bool,
        compressor: &'a dyn Compressor,
    ) -> Result<Self> {
        let words = PageFileChannel::open(dir.segment_path(id, SegmentFile::Words))?;
        let lists = PageFileChannel::open(dir.segment_path(id, SegmentFile::Lists))?;
        let positions = if positional {
            Some(PageFileChannel::open(
                dir.segment_path(id, SegmentFile::Positions),
            )?)
        } else {
            None
        };
        let store = DocStore::open(dir.segment_path(id, SegmentFile::Store))?;

        Ok(Self {
            id,
            compressor,
            words,
            lists,
            positions,
            store,
        })
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn is_positional(&self) -> bool {
        self.positions.is_some()
    }

    /// Number of documents stored in this segment
    pub fn doc_count(&self) -> u64 {
        self.store.size()
    }

    /// Every word block in dictionary page order
    pub fn word_blocks(&self) -> Result<Vec<WordBlock>> {
        read_word_blocks(&self.words, self.is_positional())
    }

    /// Word blocks of the requested terms that exist in this segment
    pub fn lookup<'t>(
        &self,
        terms: impl IntoIterator<Item = &'t str>,
    ) -> Result<HashMap<String, WordBlock>> {
        let wanted: std::collections::HashSet<&str> = terms.into_iter().collect();
        if wanted.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .word_blocks()?
            .into_iter()
            .filter(|block| wanted.contains(block.term.as_str()))
            .map(|block| (block.term.clone(), block))
            .collect())
    }

    /// Read and decode the postings (and offset table, if positional) of a term
    pub fn list_block(&self, block: &WordBlock) -> Result<ListBlock> {
        let bytes = read_span(
            &self.lists,
            block.lists_page_num,
            block.list_offset,
            block.list_len(),
        )?;
        let (encoded_postings, encoded_offsets) = bytes.split_at(block.postings_len as usize);
        let postings = self.compressor.decode(encoded_postings)?;
        if postings.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SegdexError::corrupt(format!(
                "posting list of '{}' in {} is not strictly ascending",
                block.term, self.id
            )));
        }

        let offsets = if self.is_positional() {
            let offsets = self.compressor.decode(encoded_offsets)?;
            if offsets.len() != postings.len() + 1 {
                return Err(SegdexError::corrupt(format!(
                    "offset table of '{}' in {} has {} entries for {} postings",
                    block.term,
                    self.id,
                    offsets.len(),
                    postings.len()
                )));
            }
            offsets
        } else {
            Vec::new()
        };

        Ok(ListBlock {
            encoded_postings: encoded_postings.to_vec(),
            encoded_offsets: encoded_offsets.to_vec(),
            postings,
            offsets,
        })
    }

    /// Decoded posting list of a term
    pub fn postings(&self, block: &WordBlock) -> Result<Vec<DocId>> {
        let bytes = read_span(
            &self.lists,
            block.lists_page_num,
            block.list_offset,
            block.postings_len as usize,
        )?;
        self.compressor.decode(&bytes)
    }

    /// Encoded position list of the `idx`-th posting of `list`
    pub fn position_bytes(&self, list: &ListBlock, idx: usize) -> Result<Vec<u8>> {
        let positions = self.positions.as_ref().ok_or_else(|| {
            SegdexError::Unsupported(format!("{} has no position lists", self.id))
        })?;
        let (start, end) = list.position_range(idx)?;
        read_at(positions, start, (end - start) as usize)
    }

    /// Decoded position list of the `idx`-th posting of `list`
    pub fn positions(&self, list: &ListBlock, idx: usize) -> Result<Vec<u32>> {
        let bytes = self.position_bytes(list, idx)?;
        self.compressor.decode(&bytes)
    }

    /// Position list of `doc`, or `None` if the term does not occur in it
    pub fn positions_of(&self, list: &ListBlock, doc: DocId) -> Result<Option<Vec<u32>>> {
        match list.find(doc) {
            Some(idx) => self.positions(list, idx).map(Some),
            None => Ok(None),
        }
    }

    /// Stored document `doc`; a posting without a stored document is corruption
    pub fn document(&self, doc: DocId) -> Result<Document> {
        self.store.get_document(doc)?.ok_or_else(|| {
            SegdexError::corrupt(format!("{} has no stored document {}", self.id, doc))
        })
    }

    /// Stored documents in id order
    pub fn documents(&self) -> DocStoreIter<'_> {
        self.store.iter()
    }
}
