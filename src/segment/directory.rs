//! On-disk layout of an index directory
//!
//! ```text
//! segments.manifest          ordered segment list + deletion log (JSON)
//! segment<N>_words           term dictionary pages
//! segment<N>_lists           postings + position-offset tables
//! segment<N>_positions       position lists (positional indexes only)
//! store<N>                   raw documents of segment N
//! <any of the above>_new     staging name while a flush or merge is writing
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::SegdexError;
use crate::Result;

use super::manifest::SegmentManifest;
use super::types::SegmentId;

const MANIFEST_FILE: &str = "segments.manifest";
const MANIFEST_TMP_FILE: &str = "segments.manifest.tmp";
const STAGING_SUFFIX: &str = "_new";

/// One file belonging to a segment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentFile {
    Words,
    Lists,
    Positions,
    Store,
}

impl SegmentFile {
    /// Every file a segment has
    pub fn all(positional: bool) -> &'static [SegmentFile] {
        if positional {
            &[Self::Words, Self::Lists, Self::Positions, Self::Store]
        } else {
            &[Self::Words, Self::Lists, Self::Store]
        }
    }

    fn file_name(self, id: SegmentId) -> String {
        match self {
            Self::Words => format!("segment{}_words", id.0),
            Self::Lists => format!("segment{}_lists", id.0),
            Self::Positions => format!("segment{}_positions", id.0),
            Self::Store => format!("store{}", id.0),
        }
    }
}

/// Persistent storage for segment files and the manifest
#[derive(Clone, Debug)]
pub struct IndexDirectory {
    base_dir: PathBuf,
}

impl IndexDirectory {
    /// Use `base_dir` as an index directory, creating it if missing
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        if base_dir.exists() && !base_dir.is_dir() {
            return Err(SegdexError::PathConflict(base_dir));
        }
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn path(&self) -> &Path {
        &self.base_dir
    }

    /// Canonical path of a segment file
    pub fn segment_path(&self, id: SegmentId, file: SegmentFile) -> PathBuf {
        self.base_dir.join(file.file_name(id))
    }

    /// Staging path of a segment file
    pub fn staging_path(&self, id: SegmentId, file: SegmentFile) -> PathBuf {
        self.base_dir
            .join(format!("{}{}", file.file_name(id), STAGING_SUFFIX))
    }

    /// Whether the `words` file of `id` exists
    pub fn segment_exists(&self, id: SegmentId) -> bool {
        self.segment_path(id, SegmentFile::Words).exists()
    }

    /// Rename the staged files of `id` into its canonical slot
    pub fn promote(&self, id: SegmentId, positional: bool) -> Result<()> {
        for &file in SegmentFile::all(positional) {
            fs::rename(self.staging_path(id, file), self.segment_path(id, file))?;
        }
        Ok(())
    }

    /// Move every file of segment `from` into slot `to`
    pub fn rename_segment(&self, from: SegmentId, to: SegmentId, positional: bool) -> Result<()> {
        if from == to {
            return Ok(());
        }
        for &file in SegmentFile::all(positional) {
            fs::rename(self.segment_path(from, file), self.segment_path(to, file))?;
        }
        Ok(())
    }

    /// Delete every file of segment `id`; missing files are ignored
    pub fn remove_segment(&self, id: SegmentId) -> Result<()> {
        for &file in SegmentFile::all(true) {
            remove_if_exists(&self.segment_path(id, file))?;
        }
        Ok(())
    }

    /// Delete leftover staging files; returns how many were removed
    pub fn clear_staging(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let is_staged = name
                .to_str()
                .map(|n| n.ends_with(STAGING_SUFFIX))
                .unwrap_or(false);
            if is_staged && entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Count segments by probing `segment<N>_words` from 0 up to the first gap
    pub fn probe_segments(&self) -> u32 {
        let mut id = SegmentId::new(0);
        while self.segment_exists(id) {
            id = id.next();
        }
        id.0
    }

    /// Persist the manifest via a temp file and an atomic rename
    pub fn save_manifest(&self, manifest: &SegmentManifest) -> Result<()> {
        let bytes = manifest.to_json()?;
        let tmp = self.base_dir.join(MANIFEST_TMP_FILE);
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, self.base_dir.join(MANIFEST_FILE))?;
        Ok(())
    }

    /// Load the manifest; `None` if the index has never written one
    pub fn load_manifest(&self) -> Result<Option<SegmentManifest>> {
        let path = self.base_dir.join(MANIFEST_FILE);
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(SegmentManifest::from_json(&bytes)?))
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
