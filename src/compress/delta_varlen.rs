use super::Compressor;
use crate::error::SegdexError;
use crate::Result;

const GROUP_BITS: u32 = 7;
const GROUP_MASK: u32 = 0x7F;
const CONTINUATION: u8 = 0x80;

/// Delta + variable-length byte encoding.
///
/// Each value is replaced by its gap to the previous value. Each gap is split
/// into 7-bit groups written most-significant group first; every byte except
/// the last of a gap has the high bit set. Zero encodes as a single `0x00`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeltaVarLenCompressor;

impl DeltaVarLenCompressor {
    pub fn new() -> Self {
        Self
    }
}

/// Append one gap to `output`, most-significant group first
pub fn encode_varint(value: u32, output: &mut Vec<u8>) {
    let mut groups = [0u8; 5];
    let mut count = 0;
    let mut v = value;
    loop {
        groups[count] = (v & GROUP_MASK) as u8;
        count += 1;
        v >>= GROUP_BITS;
        if v == 0 {
            break;
        }
    }
    // groups[0] is the lowest-order group and terminates the value
    for i in (1..count).rev() {
        output.push(groups[i] | CONTINUATION);
    }
    output.push(groups[0]);
}

/// Decode one gap starting at `*pos`
pub fn decode_varint(input: &[u8], pos: &mut usize) -> Result<u32> {
    let mut value: u32 = 0;
    let mut read = 0;

    loop {
        let Some(&byte) = input.get(*pos) else {
            return Err(SegdexError::corrupt("truncated varint"));
        };
        *pos += 1;
        read += 1;

        if read > 5 || value > (u32::MAX >> GROUP_BITS) {
            return Err(SegdexError::corrupt("varint overflows u32"));
        }
        value = (value << GROUP_BITS) | (byte as u32 & GROUP_MASK);

        if byte & CONTINUATION == 0 {
            return Ok(value);
        }
    }
}

impl Compressor for DeltaVarLenCompressor {
    fn encode(&self, values: &[u32]) -> Vec<u8> {
        let mut output = Vec::with_capacity(values.len());
        let mut prev = 0u32;
        for &value in values {
            debug_assert!(value >= prev, "input must be non-decreasing");
            encode_varint(value.wrapping_sub(prev), &mut output);
            prev = value;
        }
        output
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u32>> {
        let mut values = Vec::with_capacity(bytes.len());
        let mut pos = 0;
        let mut acc = 0u32;
        while pos < bytes.len() {
            let gap = decode_varint(bytes, &mut pos)?;
            acc = acc
                .checked_add(gap)
                .ok_or_else(|| SegdexError::corrupt("delta sum overflows u32"))?;
            values.push(acc);
        }
        Ok(values)
    }

    fn name(&self) -> &'static str {
        "delta-varlen"
    }
}
