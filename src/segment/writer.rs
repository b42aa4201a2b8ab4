//! Segment writer for creating new immutable segments
//!
//! Both flush and merge funnel through [`SegmentWriter`]: it owns the page
//! buffers for one segment build and writes every file under its staging
//! name. The caller promotes the files into the numbered slot afterwards.

use tracing::debug;

use crate::compress::Compressor;
use crate::error::SegdexError;
use crate::storage::PageFileChannel;
use crate::Result;

use super::buffer::MutableBuffer;
use super::codec::{PageWriter, WordsWriter};
use super::directory::{IndexDirectory, SegmentFile};
use super::types::{DocId, SegmentId, WordBlock};

/// Summary of a finished segment build
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegmentWriteStats {
    pub term_count: u64,
    pub words_pages: u32,
    pub lists_pages: u32,
    pub positions_pages: u32,
}

/// Writer state for one flush or merge
pub struct SegmentWriter<'a> {
    segment_id: SegmentId,
    compressor: &'a dyn Compressor,
    words: WordsWriter,
    lists: PageWriter,
    positions: Option<PageWriter>,
}

impl<'a> SegmentWriter<'a> {
    /// Create the staging files of `segment_id`
    pub fn create(
        dir: &IndexDirectory,
        segment_id: SegmentId,
        positional: bool,
        compressor: &'a dyn Compressor,
    ) -> Result<Self> {
        let words = PageFileChannel::create(dir.staging_path(segment_id, SegmentFile::Words))?;
        let lists = PageFileChannel::create(dir.staging_path(segment_id, SegmentFile::Lists))?;
        let positions = if positional {
            let channel =
                PageFileChannel::create(dir.staging_path(segment_id, SegmentFile::Positions))?;
            Some(PageWriter::new(channel))
        } else {
            None
        };

        Ok(Self {
            segment_id,
            compressor,
            words: WordsWriter::new(words, positional),
            lists: PageWriter::new(lists),
            positions,
        })
    }

    /// Write one term.
    ///
    /// `encoded_positions[i]` is the compressed position list of `postings[i]`;
    /// it must be empty for non-positional segments.
    pub fn write_term(
        &mut self,
        term: &str,
        postings: &[DocId],
        encoded_positions: &[Vec<u8>],
    ) -> Result<()> {
        let (lists_page_num, list_offset) = self.lists.position();
        let encoded_postings = self.compressor.encode(postings);

        let encoded_offsets = match self.positions.as_mut() {
            Some(positions) => {
                if encoded_positions.len() != postings.len() {
                    return Err(SegdexError::Internal(format!(
                        "term '{}' has {} postings but {} position lists",
                        term,
                        postings.len(),
                        encoded_positions.len()
                    )));
                }
                let mut offsets = Vec::with_capacity(postings.len() + 1);
                for bytes in encoded_positions {
                    offsets.push(positions.global_offset()?);
                    positions.write_bytes(bytes)?;
                }
                offsets.push(positions.global_offset()?);
                self.compressor.encode(&offsets)
            }
            None => Vec::new(),
        };

        let block = WordBlock {
            term: term.to_string(),
            lists_page_num,
            list_offset,
            postings_len: byte_len(&encoded_postings)?,
            offsets_len: byte_len(&encoded_offsets)?,
        };
        self.words.add(&block)?;
        self.lists.write_bytes(&encoded_postings)?;
        self.lists.write_bytes(&encoded_offsets)?;
        Ok(())
    }

    /// Write every buffered term in lexicographic order
    pub fn write_buffer(&mut self, buffer: &MutableBuffer) -> Result<()> {
        for (term, entry) in buffer.sorted_terms() {
            let encoded: Vec<Vec<u8>> = if self.positions.is_some() {
                entry
                    .positions
                    .iter()
                    .map(|list| self.compressor.encode(list))
                    .collect()
            } else {
                Vec::new()
            };
            self.write_term(term, &entry.docs, &encoded)?;
        }
        Ok(())
    }

    /// Write residual pages and close every file
    pub fn finish(self) -> Result<SegmentWriteStats> {
        let term_count = self.words.block_count();
        let words_pages = self.words.finish()?;
        let lists_pages = self.lists.finish()?;
        let positions_pages = match self.positions {
            Some(positions) => positions.finish()?,
            None => 0,
        };

        let stats = SegmentWriteStats {
            term_count,
            words_pages,
            lists_pages,
            positions_pages,
        };
        debug!(
            "Wrote {}: {} terms, {} words pages, {} lists pages, {} positions pages",
            self.segment_id,
            stats.term_count,
            stats.words_pages,
            stats.lists_pages,
            stats.positions_pages
        );
        Ok(stats)
    }
}

fn byte_len(bytes: &[u8]) -> Result<u32> {
    u32::try_from(bytes.len())
        .map_err(|_| SegdexError::Internal(format!("list of {} bytes is too large", bytes.len())))
}
