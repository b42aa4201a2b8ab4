use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crc32fast::Hasher;
use parking_lot::Mutex;

use crate::error::SegdexError;
use crate::models::Document;
use crate::Result;

const HEADER_LEN: u64 = 12;

/// Location of one document record inside the store file
#[derive(Debug, Clone, Copy)]
pub struct BlobPointer {
    pub offset: u64,
    pub len: u32,
    pub crc32: u32,
}

/// Append-only, key-ordered document store for one segment.
///
/// Record format:
/// - u32 document id (little endian)
/// - u32 payload length (little endian)
/// - u32 crc32 of payload
/// - bincode-encoded [`Document`]
///
/// The id index is rebuilt by scanning the file on open. A later record for
/// the same id replaces the earlier one.
pub struct DocStore {
    path: PathBuf,
    file: Mutex<File>,
    index: BTreeMap<u32, BlobPointer>,
}

impl DocStore {
    /// Open a store, creating an empty one if the file is missing
    pub fn create_or_open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)?;
        let index = Self::scan(&mut file, &path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
            index,
        })
    }

    /// Open an existing store; a missing file is an error
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;
        let index = Self::scan(&mut file, &path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
            index,
        })
    }

    /// Create an empty store, discarding any previous content
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
            index: BTreeMap::new(),
        })
    }

    fn scan(file: &mut File, path: &Path) -> Result<BTreeMap<u32, BlobPointer>> {
        let len = file.metadata()?.len();
        let mut index = BTreeMap::new();
        let mut offset = 0u64;
        file.seek(SeekFrom::Start(0))?;

        while offset < len {
            if offset + HEADER_LEN > len {
                return Err(SegdexError::corrupt(format!(
                    "truncated record header at offset {} in {}",
                    offset,
                    path.display()
                )));
            }
            let mut header = [0u8; HEADER_LEN as usize];
            file.read_exact(&mut header)?;
            let id = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
            let payload_len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
            let crc32 = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);

            let next = offset + HEADER_LEN + payload_len as u64;
            if next > len {
                return Err(SegdexError::corrupt(format!(
                    "truncated record for document {} in {}",
                    id,
                    path.display()
                )));
            }
            index.insert(
                id,
                BlobPointer {
                    offset,
                    len: payload_len,
                    crc32,
                },
            );
            file.seek(SeekFrom::Start(next))?;
            offset = next;
        }

        Ok(index)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store `doc` under `id`
    pub fn add_document(&mut self, id: u32, doc: &Document) -> Result<()> {
        let payload = bincode::serialize(doc)?;
        let len = u32::try_from(payload.len())
            .map_err(|_| SegdexError::InvalidArgument("document larger than 4 GiB".to_string()))?;
        let mut hasher = Hasher::new();
        hasher.update(&payload);
        let crc32 = hasher.finalize();

        let mut file = self.file.lock();
        let offset = file.seek(SeekFrom::End(0))?;
        file.write_all(&id.to_le_bytes())?;
        file.write_all(&len.to_le_bytes())?;
        file.write_all(&crc32.to_le_bytes())?;
        file.write_all(&payload)?;
        drop(file);

        self.index.insert(id, BlobPointer { offset, len, crc32 });
        Ok(())
    }

    /// Fetch the document stored under `id`, validating its checksum
    pub fn get_document(&self, id: u32) -> Result<Option<Document>> {
        let Some(ptr) = self.index.get(&id).copied() else {
            return Ok(None);
        };
        self.read(id, ptr).map(Some)
    }

    fn read(&self, id: u32, ptr: BlobPointer) -> Result<Document> {
        let mut payload = vec![0u8; ptr.len as usize];
        {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(ptr.offset + HEADER_LEN))?;
            file.read_exact(&mut payload)?;
        }

        let mut hasher = Hasher::new();
        hasher.update(&payload);
        if hasher.finalize() != ptr.crc32 {
            return Err(SegdexError::corrupt(format!(
                "checksum mismatch for document {} in {}",
                id,
                self.path.display()
            )));
        }
        Ok(bincode::deserialize(&payload)?)
    }

    /// Number of stored documents
    pub fn size(&self) -> u64 {
        self.index.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterate `(id, document)` pairs in ascending id order
    pub fn iter(&self) -> DocStoreIter<'_> {
        DocStoreIter {
            store: self,
            inner: self.index.iter(),
        }
    }

    /// Flush to disk, keeping the handle open
    pub fn sync(&self) -> Result<()> {
        self.file.lock().sync_all()?;
        Ok(())
    }

    /// Move the store file to `path`; the open handle follows it
    pub fn relocate(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        fs::rename(&self.path, &path)?;
        self.path = path;
        Ok(())
    }

    /// Flush to disk and release the handle
    pub fn close(self) -> Result<()> {
        self.file.into_inner().sync_all()?;
        Ok(())
    }
}

/// Ordered iterator over a [`DocStore`]
pub struct DocStoreIter<'a> {
    store: &'a DocStore,
    inner: btree_map::Iter<'a, u32, BlobPointer>,
}

impl Iterator for DocStoreIter<'_> {
    type Item = Result<(u32, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&id, &ptr) = self.inner.next()?;
        Some(self.store.read(id, ptr).map(|doc| (id, doc)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_get_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store0");

        let mut store = DocStore::create_or_open(&path).unwrap();
        store.add_document(1, &Document::new("apple dog")).unwrap();
        store.add_document(0, &Document::new("cat dog")).unwrap();
        assert_eq!(store.size(), 2);
        assert_eq!(store.get_document(0).unwrap(), Some(Document::new("cat dog")));
        assert_eq!(store.get_document(7).unwrap(), None);
        store.close().unwrap();

        let store = DocStore::open(&path).unwrap();
        let docs: Vec<_> = store.iter().collect::<Result<_>>().unwrap();
        assert_eq!(
            docs,
            vec![
                (0, Document::new("cat dog")),
                (1, Document::new("apple dog")),
            ]
        );
    }

    #[test]
    fn test_truncated_tail_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store0");
        let mut store = DocStore::create(&path).unwrap();
        store.add_document(0, &Document::new("some text")).unwrap();
        store.close().unwrap();

        let len = std::fs::metadata(&path).unwrap().len();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(len - 2).unwrap();

        assert!(DocStore::open(&path).err().unwrap().is_corruption());
    }

    #[test]
    fn test_checksum_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store0");
        let mut store = DocStore::create(&path).unwrap();
        store.add_document(0, &Document::new("some text")).unwrap();
        store.close().unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        std::fs::write(&path, bytes).unwrap();

        let store = DocStore::open(&path).unwrap();
        assert!(store.get_document(0).unwrap_err().is_corruption());
    }

    #[test]
    fn test_relocate_keeps_writing() {
        let dir = TempDir::new().unwrap();
        let mut store = DocStore::create(dir.path().join("store1_new")).unwrap();
        store.add_document(0, &Document::new("cat")).unwrap();

        let moved = dir.path().join("store0_new");
        store.relocate(&moved).unwrap();
        store.add_document(1, &Document::new("dog")).unwrap();
        store.sync().unwrap();
        assert_eq!(store.path(), moved.as_path());
        assert!(!dir.path().join("store1_new").exists());
        drop(store);

        let store = DocStore::open(&moved).unwrap();
        assert_eq!(store.size(), 2);
        assert_eq!(store.get_document(1).unwrap(), Some(Document::new("dog")));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(DocStore::open(dir.path().join("nope")).is_err());
    }
}
