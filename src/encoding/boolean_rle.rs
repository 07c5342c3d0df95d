//! BOOLEAN's RLE value encoding: a 4-byte little-endian length prefix followed by an
//! RLE/bit-pack hybrid stream at `bit_width = 1`, used by `DATA_PAGE` (never
//! `DATA_PAGE_V2`, which drops the length prefix and stores the hybrid stream
//! directly).
//! <https://github.com/apache/parquet-format/blob/master/Encodings.md#boolean-plain--0>

use super::get_length;
use super::hybrid_rle::HybridRleDecoder;

/// Decodes a `DATA_PAGE`-style length-prefixed boolean RLE run.
pub fn decode(values: &[u8], num_values: usize) -> HybridRleDecoder<'_> {
    let len = get_length(values) as usize;
    HybridRleDecoder::new(&values[4..4 + len], 1, num_values)
}

/// Decodes a `DATA_PAGE_V2`-style boolean RLE run with no length prefix.
pub fn decode_v2(values: &[u8], num_values: usize) -> HybridRleDecoder<'_> {
    HybridRleDecoder::new(values, 1, num_values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_length_prefixed_run() {
        let data = vec![2, 0, 0, 0, 0b00000011, 0b10101010];
        let result: Vec<u32> = decode(&data, 8).collect();
        assert_eq!(result, vec![0, 1, 0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn decodes_v2_run_without_prefix() {
        let data = vec![0b00000011, 0b10101010];
        let result: Vec<u32> = decode_v2(&data, 8).collect();
        assert_eq!(result, vec![0, 1, 0, 1, 0, 1, 0, 1]);
    }
}
