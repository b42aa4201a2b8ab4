//! Segment-based inverted index
//!
//! Immutable on-disk segments plus a mutable buffer for recent writes.
//!
//! # Architecture
//!
//! - `MutableBuffer`: in-memory postings of documents added since the last flush
//! - `SegmentWriter`: writes a buffer (flush) or merged lists into segment files
//! - `SegmentReader`: reads word blocks, postings and positions of one segment
//! - `MergeEngine`: folds segments pairwise and purges deleted terms
//! - `SegmentManifest`: tracks live segments and the deletion log
//! - `InvertedIndex`: owns all of the above and answers queries

mod buffer;
mod codec;
mod directory;
mod index;
mod manifest;
mod merge;
mod reader;
mod types;
mod writer;

pub use buffer::*;
pub use codec::*;
pub use directory::*;
pub use index::*;
pub use manifest::*;
pub use merge::*;
pub use reader::*;
pub use types::*;
pub use writer::*;
