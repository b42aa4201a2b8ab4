//! Integer-sequence codecs for postings, offset tables and position lists
//!
//! Every sequence the index encodes is non-decreasing: posting lists are
//! sorted document ids, offset tables are absolute byte offsets, position
//! lists are sorted token offsets.

mod delta_varlen;
mod naive;

pub use delta_varlen::DeltaVarLenCompressor;
pub use naive::NaiveCompressor;

use crate::Result;

/// Reversible codec for non-negative integer sequences.
///
/// `decode(&encode(xs)) == xs` must hold for every non-decreasing `xs`, and the
/// empty sequence must encode to zero bytes.
pub trait Compressor: Send + Sync {
    /// Encode a non-decreasing sequence.
    ///
    /// Decreasing input is a caller bug; implementations may panic in debug
    /// builds and produce garbage in release builds.
    fn encode(&self, values: &[u32]) -> Vec<u8>;

    /// Decode a byte range produced by [`Compressor::encode`].
    ///
    /// Truncated or malformed input is a `CorruptSegment` error.
    fn decode(&self, bytes: &[u8]) -> Result<Vec<u32>>;

    /// Short name recorded in the segment manifest
    fn name(&self) -> &'static str;
}
