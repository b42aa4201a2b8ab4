//! Page-level layout of segment files
//!
//! - `words`: every page starts with a big-endian u32 holding the number of
//!   bytes used in the page (prefix included), followed by whole word blocks.
//!   A block never straddles two pages.
//! - `lists` / `positions`: plain byte streams cut into pages; a list may span
//!   any number of page boundaries.

use crate::error::SegdexError;
use crate::storage::{PageFileChannel, PAGE_SIZE};
use crate::Result;

use super::types::WordBlock;

const WORDS_PREFIX_LEN: usize = 4;

/// Fail if the word block of `term` could never fit in a words page
pub fn check_term_fits(term: &str, positional: bool) -> Result<()> {
    if WordBlock::encoded_len_of(term.len(), positional) + WORDS_PREFIX_LEN > PAGE_SIZE {
        return Err(SegdexError::InvalidArgument(format!(
            "term of {} bytes does not fit in a words page",
            term.len()
        )));
    }
    Ok(())
}

/// Streams bytes into consecutive pages of a channel.
///
/// A page is written as soon as it fills, so `position` always reports an
/// in-page offset below `PAGE_SIZE`.
pub struct PageWriter {
    channel: PageFileChannel,
    page: Vec<u8>,
    page_num: u32,
}

impl PageWriter {
    pub fn new(channel: PageFileChannel) -> Self {
        Self {
            channel,
            page: Vec::with_capacity(PAGE_SIZE),
            page_num: 0,
        }
    }

    /// Current `(page, offset)` write cursor
    pub fn position(&self) -> (u32, u32) {
        (self.page_num, self.page.len() as u32)
    }

    /// Current cursor as an absolute byte offset into the file
    pub fn global_offset(&self) -> Result<u32> {
        let offset = self.page_num as u64 * PAGE_SIZE as u64 + self.page.len() as u64;
        u32::try_from(offset).map_err(|_| {
            SegdexError::Internal(format!(
                "{} grew past the 32-bit offset range",
                self.channel.path().display()
            ))
        })
    }

    pub fn write_bytes(&mut self, mut bytes: &[u8]) -> Result<()> {
        while !bytes.is_empty() {
            let room = PAGE_SIZE - self.page.len();
            let take = room.min(bytes.len());
            self.page.extend_from_slice(&bytes[..take]);
            bytes = &bytes[take..];
            if self.page.len() == PAGE_SIZE {
                self.flush_page()?;
            }
        }
        Ok(())
    }

    fn flush_page(&mut self) -> Result<()> {
        self.channel.write_page(self.page_num, &self.page)?;
        self.page_num += 1;
        self.page.clear();
        Ok(())
    }

    /// Write the residual partial page and close; returns pages written
    pub fn finish(mut self) -> Result<u32> {
        if !self.page.is_empty() {
            self.flush_page()?;
        }
        let pages = self.page_num;
        self.channel.close()?;
        Ok(pages)
    }
}

/// Packs word blocks into prefixed `words` pages
pub struct WordsWriter {
    channel: PageFileChannel,
    page: Vec<u8>,
    page_num: u32,
    positional: bool,
    blocks: u64,
}

impl WordsWriter {
    pub fn new(channel: PageFileChannel, positional: bool) -> Self {
        let mut page = Vec::with_capacity(PAGE_SIZE);
        page.extend_from_slice(&[0u8; WORDS_PREFIX_LEN]);
        Self {
            channel,
            page,
            page_num: 0,
            positional,
            blocks: 0,
        }
    }

    /// Append a block, starting a new page if it does not fit the current one
    pub fn add(&mut self, block: &WordBlock) -> Result<()> {
        check_term_fits(&block.term, self.positional)?;
        let len = block.encoded_len(self.positional);
        if self.page.len() + len > PAGE_SIZE {
            self.flush_page()?;
        }
        block.encode_into(&mut self.page, self.positional)?;
        self.blocks += 1;
        Ok(())
    }

    fn flush_page(&mut self) -> Result<()> {
        let used = self.page.len() as u32;
        self.page[..WORDS_PREFIX_LEN].copy_from_slice(&used.to_be_bytes());
        self.channel.write_page(self.page_num, &self.page)?;
        self.page_num += 1;
        self.page.truncate(WORDS_PREFIX_LEN);
        Ok(())
    }

    /// Number of blocks added so far
    pub fn block_count(&self) -> u64 {
        self.blocks
    }

    /// Write the residual page and close; returns pages written
    pub fn finish(mut self) -> Result<u32> {
        if self.page.len() > WORDS_PREFIX_LEN {
            self.flush_page()?;
        }
        let pages = self.page_num;
        self.channel.close()?;
        Ok(pages)
    }
}

/// Decode every word block of a `words` file in page order
pub fn read_word_blocks(channel: &PageFileChannel, positional: bool) -> Result<Vec<WordBlock>> {
    let mut blocks = Vec::new();
    for page_num in 0..channel.num_pages()? {
        let page = channel.read_page(page_num)?;
        let mut pos = 0;
        let used = super::types::read_u32(&page, &mut pos)? as usize;
        if !(WORDS_PREFIX_LEN..=PAGE_SIZE).contains(&used) {
            return Err(SegdexError::corrupt(format!(
                "words page {} of {} claims {} used bytes",
                page_num,
                channel.path().display(),
                used
            )));
        }
        let page = &page[..used];
        while pos < used {
            blocks.push(WordBlock::decode(page, &mut pos, positional)?);
        }
    }
    Ok(blocks)
}

/// Read `len` bytes starting at `(page_num, offset)`, following page boundaries
pub fn read_span(
    channel: &PageFileChannel,
    mut page_num: u32,
    offset: u32,
    len: usize,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(len);
    let mut offset = offset as usize;
    if offset >= PAGE_SIZE {
        return Err(SegdexError::corrupt(format!(
            "in-page offset {} exceeds page size",
            offset
        )));
    }
    while out.len() < len {
        let page = channel.read_page(page_num)?;
        let take = (PAGE_SIZE - offset).min(len - out.len());
        out.extend_from_slice(&page[offset..offset + take]);
        page_num += 1;
        offset = 0;
    }
    Ok(out)
}

/// Read `len` bytes at an absolute file offset
pub fn read_at(channel: &PageFileChannel, offset: u32, len: usize) -> Result<Vec<u8>> {
    let page_num = offset / PAGE_SIZE as u32;
    let in_page = offset % PAGE_SIZE as u32;
    read_span(channel, page_num, in_page, len)
}
