use super::Compressor;
use crate::error::SegdexError;
use crate::Result;

/// Uncompressed codec: every value as a 4-byte big-endian integer
#[derive(Clone, Copy, Debug, Default)]
pub struct NaiveCompressor;

impl Compressor for NaiveCompressor {
    fn encode(&self, values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u32>> {
        if bytes.len() % 4 != 0 {
            return Err(SegdexError::corrupt(format!(
                "naive list length {} is not a multiple of 4",
                bytes.len()
            )));
        }
        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }

    fn name(&self) -> &'static str {
        "naive"
    }
}
