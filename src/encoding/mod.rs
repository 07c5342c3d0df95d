//! Page-level value and level codecs.
//!
//! Every decoder here is a borrowing `Iterator` over a byte slice — none allocate
//! beyond small fixed scratch buffers — so a page's values can be decoded directly
//! out of the mmap'd column chunk. [`crate::decode`] dispatches a page's encoding to
//! the matching decoder in this module.

pub mod bitpacked;
pub mod boolean_rle;
pub mod byte_stream_split;
pub mod delta_bitpacked;
pub mod delta_byte_array;
pub mod delta_length_byte_array;
pub mod hybrid_rle;
pub mod plain;
pub mod uleb128;
pub mod zigzag_leb128;

pub use crate::parquet_bridge::Encoding;

/// Reads the 4-byte little-endian length prefix at the start of `values`.
/// # Panics
/// Panics if `values.len() < 4`.
pub fn get_length(values: &[u8]) -> u32 {
    u32::from_le_bytes(values[0..4].try_into().unwrap())
}

/// Rounds `value` (a bit count) up to the nearest whole byte.
#[inline]
pub fn ceil8(value: usize) -> usize {
    value / 8 + ((value % 8 != 0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil8_rounds_up() {
        assert_eq!(ceil8(0), 0);
        assert_eq!(ceil8(1), 1);
        assert_eq!(ceil8(8), 1);
        assert_eq!(ceil8(9), 2);
    }
}
