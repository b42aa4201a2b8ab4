//! Core types for the segment-based index

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SegdexError;
use crate::Result;

/// Segment identifier; segments are numbered densely from 0
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub u32);

impl SegmentId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment{}", self.0)
    }
}

/// Dense document number within a segment (0..doc_count)
pub type DocId = u32;

/// Dictionary entry locating one term's list inside the `lists` file.
///
/// On-disk layout, all integers big-endian:
/// `termLen | term bytes | listsPageNum | listOffset | postingsLen | [offsetsLen]`
/// where the bracketed field is only present in positional segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordBlock {
    pub term: String,
    /// Page of the `lists` file where the encoded postings begin
    pub lists_page_num: u32,
    /// Byte offset inside that page
    pub list_offset: u32,
    /// Length of the encoded posting list
    pub postings_len: u32,
    /// Length of the encoded position-offset table (0 when not positional)
    pub offsets_len: u32,
}

impl WordBlock {
    /// Bytes this block occupies in a words page
    pub fn encoded_len(&self, positional: bool) -> usize {
        Self::encoded_len_of(self.term.len(), positional)
    }

    /// Bytes a block for a term of `term_len` bytes occupies
    pub fn encoded_len_of(term_len: usize, positional: bool) -> usize {
        let fields = if positional { 5 } else { 4 };
        fields * 4 + term_len
    }

    /// Append the on-disk form of this block to `out`
    pub fn encode_into(&self, out: &mut Vec<u8>, positional: bool) -> Result<()> {
        let term_len = u32::try_from(self.term.len()).map_err(|_| {
            SegdexError::InvalidArgument(format!("term of {} bytes is too long", self.term.len()))
        })?;
        out.extend_from_slice(&term_len.to_be_bytes());
        out.extend_from_slice(self.term.as_bytes());
        out.extend_from_slice(&self.lists_page_num.to_be_bytes());
        out.extend_from_slice(&self.list_offset.to_be_bytes());
        out.extend_from_slice(&self.postings_len.to_be_bytes());
        if positional {
            out.extend_from_slice(&self.offsets_len.to_be_bytes());
        }
        Ok(())
    }

    /// Decode one block from `buf` starting at `*pos`, advancing `*pos`
    pub fn decode(buf: &[u8], pos: &mut usize, positional: bool) -> Result<Self> {
        let term_len = read_u32(buf, pos)? as usize;
        let end = pos
            .checked_add(term_len)
            .filter(|&end| end <= buf.len())
            .ok_or_else(|| {
                SegdexError::corrupt(format!(
                    "word block term of {} bytes overruns page at {}",
                    term_len, *pos
                ))
            })?;
        let term = std::str::from_utf8(&buf[*pos..end])
            .map_err(|e| SegdexError::corrupt(format!("word block term is not UTF-8: {}", e)))?
            .to_string();
        *pos = end;

        let lists_page_num = read_u32(buf, pos)?;
        let list_offset = read_u32(buf, pos)?;
        let postings_len = read_u32(buf, pos)?;
        let offsets_len = if positional { read_u32(buf, pos)? } else { 0 };

        Ok(Self {
            term,
            lists_page_num,
            list_offset,
            postings_len,
            offsets_len,
        })
    }

    /// Total bytes of this term's entry in the `lists` stream
    pub fn list_len(&self) -> usize {
        self.postings_len as usize + self.offsets_len as usize
    }
}

/// Read a big-endian u32 at `*pos`
pub(crate) fn read_u32(buf: &[u8], pos: &mut usize) -> Result<u32> {
    let bytes = buf
        .get(*pos..*pos + 4)
        .ok_or_else(|| SegdexError::corrupt(format!("truncated int32 at offset {}", *pos)))?;
    *pos += 4;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// A term's list as read from disk: raw bytes plus their decoded form
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListBlock {
    pub encoded_postings: Vec<u8>,
    pub encoded_offsets: Vec<u8>,
    /// Ascending document ids
    pub postings: Vec<DocId>,
    /// Absolute byte offsets into the `positions` file, `postings.len() + 1`
    /// entries in positional segments and empty otherwise
    pub offsets: Vec<u32>,
}

impl ListBlock {
    /// Index of `doc` in the posting list
    pub fn find(&self, doc: DocId) -> Option<usize> {
        self.postings.binary_search(&doc).ok()
    }

    /// Byte range of the `idx`-th position list in the `positions` file
    pub fn position_range(&self, idx: usize) -> Result<(u32, u32)> {
        match (self.offsets.get(idx), self.offsets.get(idx + 1)) {
            (Some(&start), Some(&end)) if start <= end => Ok((start, end)),
            _ => Err(SegdexError::corrupt(format!(
                "position offset table has no valid range for entry {}",
                idx
            ))),
        }
    }
}

/// The left and/or right word blocks for one term during a merge
#[derive(Clone, Debug, Default)]
pub struct MergedWordBlock {
    pub left: Option<WordBlock>,
    pub right: Option<WordBlock>,
}

impl MergedWordBlock {
    /// True when the term exists on only one side
    pub fn is_single(&self) -> bool {
        self.left.is_none() || self.right.is_none()
    }
}
