use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::SegdexError;
use crate::Result;

/// Size of every page in a segment file
pub const PAGE_SIZE: usize = 4096;

/// Fixed-size page view over a file.
///
/// Page `n` occupies bytes `[n * PAGE_SIZE, (n + 1) * PAGE_SIZE)`. Writes
/// shorter than a page are zero-padded, so the file length is always a whole
/// number of pages.
pub struct PageFileChannel {
    path: PathBuf,
    file: Mutex<File>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl PageFileChannel {
    /// Open `path` for reading and writing, creating it if missing
    pub fn create_or_open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path.as_ref())?;
        Ok(Self::from_file(path.as_ref().to_path_buf(), file))
    }

    /// Open an existing file; a missing file is an error
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path.as_ref())?;
        Ok(Self::from_file(path.as_ref().to_path_buf(), file))
    }

    /// Create `path`, discarding any previous content
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(path.as_ref())?;
        Ok(Self::from_file(path.as_ref().to_path_buf(), file))
    }

    fn from_file(path: PathBuf, file: File) -> Self {
        Self {
            path,
            file: Mutex::new(file),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of whole pages in the file
    pub fn num_pages(&self) -> Result<u32> {
        let len = self.file.lock().metadata()?.len();
        u32::try_from(len / PAGE_SIZE as u64)
            .map_err(|_| SegdexError::Internal(format!("{} has too many pages", self.path.display())))
    }

    /// Read page `page_num` into a fresh page-sized buffer
    pub fn read_page(&self, page_num: u32) -> Result<Vec<u8>> {
        let mut file = self.file.lock();
        let len = file.metadata()?.len();
        let start = page_num as u64 * PAGE_SIZE as u64;
        if start + PAGE_SIZE as u64 > len {
            return Err(SegdexError::corrupt(format!(
                "page {} is past the end of {} ({} bytes)",
                page_num,
                self.path.display(),
                len
            )));
        }

        let mut page = vec![0u8; PAGE_SIZE];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut page)?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(page)
    }

    /// Write `data` (at most one page) at page `page_num`, zero-padding the rest
    pub fn write_page(&self, page_num: u32, data: &[u8]) -> Result<()> {
        if data.len() > PAGE_SIZE {
            return Err(SegdexError::InvalidArgument(format!(
                "page write of {} bytes exceeds page size {}",
                data.len(),
                PAGE_SIZE
            )));
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
        file.write_all(data)?;
        if data.len() < PAGE_SIZE {
            file.write_all(&[0u8; PAGE_SIZE][data.len()..])?;
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Append `data` as whole pages after the current last page
    pub fn append_all_bytes(&self, data: &[u8]) -> Result<()> {
        let first = self.num_pages()?;
        for (i, chunk) in data.chunks(PAGE_SIZE).enumerate() {
            self.write_page(first + i as u32, chunk)?;
        }
        Ok(())
    }

    /// Pages read since open
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Pages written since open
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Flush file contents to disk and release the handle
    pub fn close(self) -> Result<()> {
        self.file.into_inner().sync_all()?;
        Ok(())
    }
}
