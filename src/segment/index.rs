//! Inverted index combining a mutable buffer with immutable on-disk segments
//!
//! Documents are analyzed into the in-memory [`MutableBuffer`] and written to
//! a staging document store as they arrive. Reaching the flush threshold (or
//! calling [`InvertedIndex::flush`]) turns the buffer into the next numbered
//! segment; reaching the merge threshold folds segments pairwise.
//!
//! Queries only see flushed segments. Mutating operations take `&mut self`,
//! so a query can never observe a segment in the middle of a flush or merge.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::vec;

use tracing::{debug, info, warn};

use crate::compress::{Compressor, NaiveCompressor};
use crate::config::IndexConfig;
use crate::error::SegdexError;
use crate::models::Document;
use crate::query::{intersect, union, PhraseMatcher};
use crate::storage::DocStore;
use crate::tokenizer::Analyzer;
use crate::Result;

use super::buffer::MutableBuffer;
use super::codec::check_term_fits;
use super::directory::{IndexDirectory, SegmentFile};
use super::manifest::{ManifestEntry, SegmentManifest};
use super::merge::MergeEngine;
use super::reader::SegmentReader;
use super::types::{DocId, ListBlock, SegmentId};
use super::writer::SegmentWriter;

/// Inverted lists and stored documents of one segment
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentSnapshot {
    pub inverted_lists: BTreeMap<String, Vec<DocId>>,
    pub documents: BTreeMap<DocId, Document>,
}

/// [`SegmentSnapshot`] plus the position list of every `(term, doc)` pair
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionalSegmentSnapshot {
    pub inverted_lists: BTreeMap<String, Vec<DocId>>,
    pub documents: BTreeMap<DocId, Document>,
    pub positions: BTreeMap<(String, DocId), Vec<u32>>,
}

/// Disk-backed segmented inverted index
pub struct InvertedIndex {
    dir: IndexDirectory,
    analyzer: Box<dyn Analyzer>,
    compressor: Box<dyn Compressor>,
    config: IndexConfig,
    manifest: SegmentManifest,
    buffer: MutableBuffer,
    /// Staging store of the segment being buffered
    pending: Option<DocStore>,
}

impl InvertedIndex {
    /// Open (or create) a non-positional index at `path`
    pub fn create_or_open(path: impl AsRef<Path>, analyzer: impl Analyzer + 'static) -> Result<Self> {
        Self::open_with_config(path, analyzer, NaiveCompressor, IndexConfig::default())
    }

    /// Open (or create) a positional index at `path`
    pub fn create_or_open_positional(
        path: impl AsRef<Path>,
        analyzer: impl Analyzer + 'static,
        compressor: impl Compressor + 'static,
    ) -> Result<Self> {
        Self::open_with_config(path, analyzer, compressor, IndexConfig::positional())
    }

    /// Open (or create) an index with explicit thresholds and layout
    pub fn open_with_config(
        path: impl AsRef<Path>,
        analyzer: impl Analyzer + 'static,
        compressor: impl Compressor + 'static,
        config: IndexConfig,
    ) -> Result<Self> {
        if config.flush_threshold == 0 || config.merge_threshold == 0 {
            return Err(SegdexError::InvalidArgument(
                "flush and merge thresholds must be at least 1".to_string(),
            ));
        }

        let dir = IndexDirectory::open(path)?;
        let stale = dir.clear_staging()?;
        if stale > 0 {
            warn!(
                "Removed {} staging files left by an interrupted flush or merge",
                stale
            );
        }

        let manifest = match dir.load_manifest()? {
            Some(manifest) => manifest,
            None => Self::recover_manifest(&dir, &compressor, config.positional)?,
        };
        if manifest.positional != config.positional {
            return Err(SegdexError::InvalidArgument(format!(
                "index at {} was created with positional={}, opened with positional={}",
                dir.path().display(),
                manifest.positional,
                config.positional
            )));
        }
        if manifest.compressor != compressor.name() {
            return Err(SegdexError::InvalidArgument(format!(
                "index at {} is encoded with '{}', opened with '{}'",
                dir.path().display(),
                manifest.compressor,
                compressor.name()
            )));
        }
        for (slot, entry) in manifest.iter().enumerate() {
            if entry.id.0 as usize != slot || !dir.segment_exists(entry.id) {
                return Err(SegdexError::corrupt(format!(
                    "manifest entry {} does not match segment files on disk",
                    entry.id
                )));
            }
        }

        info!(
            "Opened index at {} ({} segments, {} documents, positional={}, compressor={})",
            dir.path().display(),
            manifest.segment_count(),
            manifest.total_doc_count(),
            config.positional,
            compressor.name()
        );

        Ok(Self {
            dir,
            analyzer: Box::new(analyzer),
            compressor: Box::new(compressor),
            buffer: MutableBuffer::new(config.positional),
            config,
            manifest,
            pending: None,
        })
    }

    /// Build a manifest for an index that has none, probing segment files
    fn recover_manifest(
        dir: &IndexDirectory,
        compressor: &dyn Compressor,
        positional: bool,
    ) -> Result<SegmentManifest> {
        let mut manifest = SegmentManifest::new(positional, compressor.name());
        let count = dir.probe_segments();
        if count > 0 {
            let on_disk = dir
                .segment_path(SegmentId::new(0), SegmentFile::Positions)
                .exists();
            if on_disk != positional {
                return Err(SegdexError::InvalidArgument(format!(
                    "segments at {} have positional={}, opened with positional={}",
                    dir.path().display(),
                    on_disk,
                    positional
                )));
            }
            warn!(
                "No manifest at {}, recovered {} segments by probing files",
                dir.path().display(),
                count
            );
        }

        for id in (0..count).map(SegmentId::new) {
            let reader = SegmentReader::open(dir, id, positional, compressor)?;
            let terms = reader.word_blocks()?.len() as u64;
            manifest.add_segment(ManifestEntry::new(id, reader.doc_count(), terms));
        }
        dir.save_manifest(&manifest)?;
        Ok(manifest)
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Current manifest: live segments and the deletion log
    pub fn manifest(&self) -> &SegmentManifest {
        &self.manifest
    }

    /// Number of flushed segments
    pub fn num_segments(&self) -> usize {
        self.manifest.segment_count()
    }

    /// Add a document to the in-memory buffer, flushing once the threshold is hit.
    ///
    /// A document with a term too long for a words page is rejected before
    /// anything is buffered.
    pub fn add_document(&mut self, doc: Document) -> Result<()> {
        let terms = self.analyzer.analyze(doc.text());
        for term in &terms {
            check_term_fits(term, self.config.positional)?;
        }

        let store = match self.pending.take() {
            Some(store) => store,
            None => DocStore::create(
                self.dir
                    .staging_path(self.manifest.next_segment_id(), SegmentFile::Store),
            )?,
        };
        let store = self.pending.insert(store);
        store.add_document(self.buffer.num_documents(), &doc)?;
        self.buffer.add_document(&terms);

        if self.buffer.num_documents() as usize >= self.config.flush_threshold {
            self.flush()?;
        }
        Ok(())
    }

    /// Documents added since the last flush, in insertion order
    pub fn buffered_documents(&self) -> Result<Vec<Document>> {
        match &self.pending {
            Some(store) => store
                .iter()
                .map(|item| item.map(|(_, doc)| doc))
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    /// Write the buffer out as the next segment.
    ///
    /// A no-op when nothing is buffered. May trigger merging.
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            debug!("Flush skipped, buffer is empty");
            return Ok(());
        }

        let id = self.manifest.next_segment_id();
        let positional = self.config.positional;

        let staged = self.dir.staging_path(id, SegmentFile::Store);
        let store = self.pending.as_mut().ok_or_else(|| {
            SegdexError::Internal("buffered documents without a staging store".to_string())
        })?;
        store.sync()?;
        if store.path() != staged.as_path() {
            // segments were merged while documents were buffered
            store.relocate(&staged)?;
        }

        // the store stays pending until the segment is promoted
        let mut writer = SegmentWriter::create(&self.dir, id, positional, self.compressor.as_ref())?;
        writer.write_buffer(&self.buffer)?;
        let stats = writer.finish()?;
        self.dir.promote(id, positional)?;
        self.pending = None;

        let docs = self.buffer.num_documents();
        self.buffer.clear();
        self.manifest
            .add_segment(ManifestEntry::new(id, docs as u64, stats.term_count));
        self.dir.save_manifest(&self.manifest)?;

        info!(
            "Flushed {} with {} documents and {} terms",
            id, docs, stats.term_count
        );

        self.merge_while_over_threshold()
    }

    /// Merge all segments pairwise, then keep merging while over the threshold.
    ///
    /// A single segment is only rewritten when the deletion log has terms
    /// to purge.
    pub fn merge_all_segments(&mut self) -> Result<()> {
        let count = self.manifest.segment_count();
        if count == 0 || (count == 1 && self.manifest.deleted_terms.is_empty()) {
            debug!("Merge skipped, {} segments and nothing to purge", count);
            return Ok(());
        }
        self.merge_pass()?;
        self.merge_while_over_threshold()
    }

    fn merge_while_over_threshold(&mut self) -> Result<()> {
        while self.manifest.segment_count() > 1
            && self.manifest.segment_count() >= self.config.merge_threshold
        {
            self.merge_pass()?;
        }
        Ok(())
    }

    fn merge_pass(&mut self) -> Result<()> {
        let before = self.manifest.segment_count();
        let engine = MergeEngine::new(&self.dir, self.compressor.as_ref(), self.config.positional);
        let merged = engine.merge_pass(&self.manifest.segments, &self.manifest.deleted_terms)?;

        let purged = self.manifest.deleted_terms.len();
        self.manifest.replace_segments(merged);
        self.manifest.clear_deleted();
        self.dir.save_manifest(&self.manifest)?;

        info!(
            "Merge pass complete: {} -> {} segments, {} deleted terms purged",
            before,
            self.manifest.segment_count(),
            purged
        );
        Ok(())
    }

    /// Log every term of `keyword` as deleted.
    ///
    /// Matching documents disappear from search results immediately; the
    /// terms are physically dropped at the next merge.
    pub fn delete_documents(&mut self, keyword: &str) -> Result<()> {
        let mut added = 0;
        for term in self.analyzer.analyze(keyword) {
            if !term.is_empty() && self.manifest.mark_deleted(term) {
                added += 1;
            }
        }
        if added > 0 {
            self.dir.save_manifest(&self.manifest)?;
            info!("Marked {} terms of '{}' as deleted", added, keyword);
        }
        Ok(())
    }

    fn open_segment(&self, id: SegmentId) -> Result<SegmentReader<'_>> {
        SegmentReader::open(&self.dir, id, self.config.positional, self.compressor.as_ref())
    }

    fn segment_ids(&self) -> Vec<SegmentId> {
        self.manifest.iter().map(|entry| entry.id).collect()
    }

    fn analyze_terms(&self, keyword: &str) -> Vec<String> {
        self.analyzer
            .analyze(keyword)
            .into_iter()
            .filter(|term| !term.is_empty())
            .collect()
    }

    /// Analyze every keyword; `None` if any keyword yields no term
    fn analyze_all<S: AsRef<str>>(&self, keywords: &[S]) -> Option<Vec<String>> {
        let mut terms = Vec::new();
        for keyword in keywords {
            let analyzed = self.analyze_terms(keyword.as_ref());
            if analyzed.is_empty() {
                return None;
            }
            terms.extend(analyzed);
        }
        Some(terms)
    }

    fn fetch(reader: &SegmentReader<'_>, docs: &[DocId], out: &mut Vec<Document>) -> Result<()> {
        for &doc in docs {
            out.push(reader.document(doc)?);
        }
        Ok(())
    }

    /// Documents containing the first term of `keyword`
    pub fn search_query(&self, keyword: &str) -> Result<vec::IntoIter<Document>> {
        let Some(term) = self.analyze_terms(keyword).into_iter().next() else {
            return Ok(Vec::new().into_iter());
        };
        if self.manifest.is_deleted(&term) {
            return Ok(Vec::new().into_iter());
        }

        let mut results = Vec::new();
        for id in self.segment_ids() {
            let reader = self.open_segment(id)?;
            if let Some(block) = reader.lookup([term.as_str()])?.get(&term) {
                Self::fetch(&reader, &reader.postings(block)?, &mut results)?;
            }
        }
        Ok(results.into_iter())
    }

    /// Documents containing every keyword
    pub fn search_and_query<S: AsRef<str>>(&self, keywords: &[S]) -> Result<vec::IntoIter<Document>> {
        if keywords.is_empty() {
            return Err(SegdexError::InvalidArgument(
                "AND query needs at least one keyword".to_string(),
            ));
        }
        let Some(terms) = self.analyze_all(keywords) else {
            return Ok(Vec::new().into_iter());
        };
        if terms.iter().any(|term| self.manifest.is_deleted(term)) {
            return Ok(Vec::new().into_iter());
        }
        let unique: BTreeSet<&str> = terms.iter().map(String::as_str).collect();

        let mut results = Vec::new();
        for id in self.segment_ids() {
            let reader = self.open_segment(id)?;
            let blocks = reader.lookup(unique.iter().copied())?;
            if blocks.len() < unique.len() {
                continue;
            }
            let lists = blocks
                .values()
                .map(|block| reader.postings(block))
                .collect::<Result<Vec<_>>>()?;
            Self::fetch(&reader, &intersect(lists), &mut results)?;
        }
        Ok(results.into_iter())
    }

    /// Documents containing any keyword, each once per segment
    pub fn search_or_query<S: AsRef<str>>(&self, keywords: &[S]) -> Result<vec::IntoIter<Document>> {
        let terms: BTreeSet<String> = keywords
            .iter()
            .flat_map(|keyword| self.analyze_terms(keyword.as_ref()))
            .filter(|term| !self.manifest.is_deleted(term))
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new().into_iter());
        }

        let mut results = Vec::new();
        for id in self.segment_ids() {
            let reader = self.open_segment(id)?;
            let blocks = reader.lookup(terms.iter().map(String::as_str))?;
            if blocks.is_empty() {
                continue;
            }
            let lists = blocks
                .values()
                .map(|block| reader.postings(block))
                .collect::<Result<Vec<_>>>()?;
            Self::fetch(&reader, &union(lists), &mut results)?;
        }
        Ok(results.into_iter())
    }

    /// Documents containing the keywords as consecutive terms, in order
    pub fn search_phrase_query<S: AsRef<str>>(
        &self,
        phrase: &[S],
    ) -> Result<vec::IntoIter<Document>> {
        if phrase.is_empty() {
            return Err(SegdexError::InvalidArgument(
                "phrase query needs at least one keyword".to_string(),
            ));
        }
        if !self.config.positional {
            return Err(SegdexError::Unsupported(
                "phrase queries need a positional index".to_string(),
            ));
        }
        let Some(terms) = self.analyze_all(phrase) else {
            return Ok(Vec::new().into_iter());
        };
        if terms.iter().any(|term| self.manifest.is_deleted(term)) {
            return Ok(Vec::new().into_iter());
        }
        let unique: BTreeSet<&str> = terms.iter().map(String::as_str).collect();

        let mut results = Vec::new();
        for id in self.segment_ids() {
            let reader = self.open_segment(id)?;
            let blocks = reader.lookup(unique.iter().copied())?;
            if blocks.len() < unique.len() {
                continue;
            }
            let lists: BTreeMap<&str, ListBlock> = blocks
                .iter()
                .map(|(term, block)| -> Result<(&str, ListBlock)> {
                    Ok((term.as_str(), reader.list_block(block)?))
                })
                .collect::<Result<_>>()?;
            let candidates = intersect(lists.values().map(|list| list.postings.clone()).collect());

            let mut matched = Vec::new();
            for doc in candidates {
                if Self::phrase_in_doc(&reader, &terms, &lists, doc)? {
                    matched.push(doc);
                }
            }
            Self::fetch(&reader, &matched, &mut results)?;
        }
        Ok(results.into_iter())
    }

    fn phrase_in_doc(
        reader: &SegmentReader<'_>,
        terms: &[String],
        lists: &BTreeMap<&str, ListBlock>,
        doc: DocId,
    ) -> Result<bool> {
        let mut matcher = PhraseMatcher::new();
        for term in terms {
            let list = lists.get(term.as_str()).ok_or_else(|| {
                SegdexError::Internal(format!("phrase term '{}' has no list", term))
            })?;
            let positions = reader.positions_of(list, doc)?.ok_or_else(|| {
                SegdexError::corrupt(format!("'{}' has no positions for document {}", term, doc))
            })?;
            if !matcher.push(&positions) {
                return Ok(false);
            }
        }
        Ok(matcher.is_match())
    }

    /// Every stored document, segment by segment in id order
    pub fn document_iterator(&self) -> Result<vec::IntoIter<Document>> {
        let mut results = Vec::new();
        for id in self.segment_ids() {
            let reader = self.open_segment(id)?;
            for item in reader.documents() {
                let (_, doc) = item?;
                results.push(doc);
            }
        }
        Ok(results.into_iter())
    }

    /// Inverted lists and documents of segment `n`.
    ///
    /// `None` if the segment does not exist or holds no documents.
    pub fn index_segment(&self, n: usize) -> Result<Option<SegmentSnapshot>> {
        let Some(reader) = self.snapshot_reader(n)? else {
            return Ok(None);
        };
        let mut snapshot = SegmentSnapshot::default();
        for block in reader.word_blocks()? {
            let postings = reader.postings(&block)?;
            snapshot.inverted_lists.insert(block.term, postings);
        }
        for item in reader.documents() {
            let (id, doc) = item?;
            snapshot.documents.insert(id, doc);
        }
        Ok(Some(snapshot))
    }

    /// Like [`InvertedIndex::index_segment`], with position lists
    pub fn positional_segment(&self, n: usize) -> Result<Option<PositionalSegmentSnapshot>> {
        if !self.config.positional {
            return Err(SegdexError::Unsupported(
                "position lists exist only in positional indexes".to_string(),
            ));
        }
        let Some(reader) = self.snapshot_reader(n)? else {
            return Ok(None);
        };
        let mut snapshot = PositionalSegmentSnapshot::default();
        for block in reader.word_blocks()? {
            let list = reader.list_block(&block)?;
            for (idx, &doc) in list.postings.iter().enumerate() {
                let positions = reader.positions(&list, idx)?;
                snapshot.positions.insert((block.term.clone(), doc), positions);
            }
            snapshot.inverted_lists.insert(block.term, list.postings);
        }
        for item in reader.documents() {
            let (id, doc) = item?;
            snapshot.documents.insert(id, doc);
        }
        Ok(Some(snapshot))
    }

    fn snapshot_reader(&self, n: usize) -> Result<Option<SegmentReader<'_>>> {
        let Some(entry) = self.manifest.segments.get(n) else {
            return Ok(None);
        };
        let reader = self.open_segment(entry.id)?;
        if reader.doc_count() == 0 {
            return Ok(None);
        }
        Ok(Some(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::DeltaVarLenCompressor;
    use std::fs;
    use tempfile::TempDir;

    fn whitespace(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_lowercase).collect()
    }

    fn texts(iter: vec::IntoIter<Document>) -> Vec<String> {
        iter.map(|doc| doc.text).collect()
    }

    #[test]
    fn test_flush_and_search() {
        let tmp = TempDir::new().unwrap();
        let mut index = InvertedIndex::create_or_open(tmp.path(), whitespace).unwrap();
        index.add_document(Document::new("cat dog cat dog")).unwrap();
        index.add_document(Document::new("apple dog")).unwrap();
        index.add_document(Document::new("cat smile")).unwrap();
        assert_eq!(index.num_segments(), 0);
        assert_eq!(index.buffered_documents().unwrap().len(), 3);

        index.flush().unwrap();
        assert_eq!(index.num_segments(), 1);
        assert!(index.buffered_documents().unwrap().is_empty());

        assert_eq!(
            texts(index.search_query("dog").unwrap()),
            vec!["cat dog cat dog", "apple dog"]
        );
        assert_eq!(
            texts(index.search_and_query(&["cat", "dog"]).unwrap()),
            vec!["cat dog cat dog"]
        );
        assert_eq!(index.search_or_query(&["cat", "apple"]).unwrap().len(), 3);
    }

    #[test]
    fn test_oversized_term_rejected_before_buffering() {
        let tmp = TempDir::new().unwrap();
        let mut index = InvertedIndex::create_or_open(tmp.path(), whitespace).unwrap();
        index.add_document(Document::new("cat dog")).unwrap();

        let huge = "x".repeat(5_000);
        let err = index
            .add_document(Document::new(format!("cat {}", huge)))
            .unwrap_err();
        assert!(matches!(err, SegdexError::InvalidArgument(_)));
        assert_eq!(index.buffered_documents().unwrap().len(), 1);

        index.add_document(Document::new("apple")).unwrap();
        index.flush().unwrap();
        assert_eq!(index.num_segments(), 1);
        assert_eq!(
            texts(index.document_iterator().unwrap()),
            vec!["cat dog", "apple"]
        );
        assert_eq!(index.search_query("apple").unwrap().len(), 1);
    }

    #[test]
    fn test_failed_flush_keeps_buffer() {
        let tmp = TempDir::new().unwrap();
        let mut index = InvertedIndex::create_or_open(tmp.path(), whitespace).unwrap();
        index.add_document(Document::new("cat dog")).unwrap();
        index.add_document(Document::new("apple dog")).unwrap();

        // a directory in the way of a staging file makes the segment write fail
        let blocker = tmp.path().join("segment0_words_new");
        fs::create_dir(&blocker).unwrap();
        assert!(index.flush().is_err());
        assert_eq!(index.num_segments(), 0);
        assert_eq!(index.buffered_documents().unwrap().len(), 2);

        fs::remove_dir(&blocker).unwrap();
        index.add_document(Document::new("cat smile")).unwrap();
        index.flush().unwrap();
        assert_eq!(index.num_segments(), 1);
        assert_eq!(
            texts(index.search_query("cat").unwrap()),
            vec!["cat dog", "cat smile"]
        );
        assert_eq!(index.document_iterator().unwrap().len(), 3);
    }

    #[test]
    fn test_empty_flush_is_noop() {
        let tmp = TempDir::new().unwrap();
        let mut index = InvertedIndex::create_or_open(tmp.path(), whitespace).unwrap();
        index.flush().unwrap();
        assert_eq!(index.num_segments(), 0);
    }

    #[test]
    fn test_auto_flush_and_merge() {
        let tmp = TempDir::new().unwrap();
        let config = IndexConfig::default()
            .with_flush_threshold(2)
            .with_merge_threshold(4);
        let mut index =
            InvertedIndex::open_with_config(tmp.path(), whitespace, NaiveCompressor, config).unwrap();
        for i in 0..8 {
            index.add_document(Document::new(format!("doc{} common", i))).unwrap();
        }
        // four flushes reach the threshold and merge down to two
        assert_eq!(index.num_segments(), 2);
        assert_eq!(index.search_query("common").unwrap().len(), 8);
        assert_eq!(index.manifest().total_doc_count(), 8);
    }

    #[test]
    fn test_invalid_arguments() {
        let tmp = TempDir::new().unwrap();
        let index =
            InvertedIndex::create_or_open_positional(tmp.path(), whitespace, DeltaVarLenCompressor)
                .unwrap();
        let empty: [&str; 0] = [];
        assert!(matches!(
            index.search_and_query(&empty).unwrap_err(),
            SegdexError::InvalidArgument(_)
        ));
        assert!(matches!(
            index.search_phrase_query(&empty).unwrap_err(),
            SegdexError::InvalidArgument(_)
        ));
        assert_eq!(index.search_or_query(&empty).unwrap().len(), 0);
    }

    #[test]
    fn test_phrase_requires_positional() {
        let tmp = TempDir::new().unwrap();
        let index = InvertedIndex::create_or_open(tmp.path(), whitespace).unwrap();
        assert!(matches!(
            index.search_phrase_query(&["new", "york"]).unwrap_err(),
            SegdexError::Unsupported(_)
        ));
        assert!(matches!(
            index.positional_segment(0).unwrap_err(),
            SegdexError::Unsupported(_)
        ));
    }

    #[test]
    fn test_positional_flag_mismatch() {
        let tmp = TempDir::new().unwrap();
        let mut index = InvertedIndex::create_or_open(tmp.path(), whitespace).unwrap();
        index.add_document(Document::new("a b")).unwrap();
        index.flush().unwrap();
        drop(index);

        let err = InvertedIndex::create_or_open_positional(tmp.path(), whitespace, DeltaVarLenCompressor)
            .err()
            .unwrap();
        assert!(matches!(err, SegdexError::InvalidArgument(_)));
    }

    #[test]
    fn test_compressor_mismatch() {
        let tmp = TempDir::new().unwrap();
        InvertedIndex::create_or_open(tmp.path(), whitespace).unwrap();

        let err = InvertedIndex::open_with_config(
            tmp.path(),
            whitespace,
            DeltaVarLenCompressor,
            IndexConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, SegdexError::InvalidArgument(_)));
    }

    #[test]
    fn test_snapshots() {
        let tmp = TempDir::new().unwrap();
        let mut index =
            InvertedIndex::create_or_open_positional(tmp.path(), whitespace, DeltaVarLenCompressor)
                .unwrap();
        assert!(index.positional_segment(0).unwrap().is_none());
        index.add_document(Document::new("new york new")).unwrap();
        index.add_document(Document::new("york")).unwrap();
        index.flush().unwrap();

        let snapshot = index.positional_segment(0).unwrap().unwrap();
        assert_eq!(snapshot.inverted_lists["new"], vec![0]);
        assert_eq!(snapshot.inverted_lists["york"], vec![0, 1]);
        assert_eq!(snapshot.positions[&("new".to_string(), 0)], vec![0, 2]);
        assert_eq!(snapshot.positions[&("york".to_string(), 1)], vec![0]);
        assert_eq!(snapshot.documents[&1], Document::new("york"));

        let plain = index.index_segment(0).unwrap().unwrap();
        assert_eq!(plain.inverted_lists, snapshot.inverted_lists);
        assert!(index.index_segment(1).unwrap().is_none());
    }
}
