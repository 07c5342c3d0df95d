//! PLAIN: the simplest encoding, values back to back with no indirection.
//! Fixed-width physical types (INT32, INT64, INT96, FLOAT, DOUBLE,
//! FIXED_LEN_BYTE_ARRAY) are just their native bytes concatenated; BYTE_ARRAY is a
//! repeated `{u32 length, length bytes}`; BOOLEAN is bit-packed LSB-first, 8 values
//! per byte (see [`super::bitpacked`]).
//! <https://github.com/apache/parquet-format/blob/master/Encodings.md#plain-plain--0>

use super::get_length;
use crate::types::NativeType;

/// Decodes a `PLAIN`-encoded run of fixed-width native values.
pub fn decode_native<T: NativeType>(values: &[u8]) -> impl Iterator<Item = T> + '_ {
    let size = std::mem::size_of::<T>();
    values.chunks_exact(size).map(|chunk| {
        let mut bytes = T::Bytes::default();
        bytes.as_mut().copy_from_slice(chunk);
        T::from_le_bytes(bytes)
    })
}

/// Decodes a `PLAIN`-encoded run of `FIXED_LEN_BYTE_ARRAY` values of `size` bytes
/// each.
pub fn decode_fixed_len_byte_array(values: &[u8], size: usize) -> impl Iterator<Item = &[u8]> + '_ {
    values.chunks_exact(size)
}

/// Decodes a `PLAIN`-encoded run of length-prefixed `BYTE_ARRAY` values.
#[derive(Debug)]
pub struct ByteArrayDecoder<'a> {
    values: &'a [u8],
    index: usize,
}

impl<'a> ByteArrayDecoder<'a> {
    pub fn new(values: &'a [u8]) -> Self {
        Self { values, index: 0 }
    }
}

impl<'a> Iterator for ByteArrayDecoder<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.values;
        let index = self.index;
        if index + 4 <= values.len() {
            let next_len = get_length(&values[index..]) as usize;
            let next_index = index + 4 + next_len;
            let result = Some(&values[index + 4..next_index]);
            self.index = next_index;
            result
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_native_i32s() {
        let values: Vec<i32> = vec![1, -2, 3];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let decoded: Vec<i32> = decode_native::<i32>(&bytes).collect();
        assert_eq!(decoded, values);
    }

    #[test]
    fn decodes_byte_arrays() {
        let data = vec![
            5, 0, 0, 0, b'h', b'e', b'l', b'l', b'o', 5, 0, 0, 0, b'w', b'o', b'r', b'l', b'd',
        ];
        let decoder = ByteArrayDecoder::new(&data);
        let result: Vec<&[u8]> = decoder.collect();
        assert_eq!(result, vec![b"hello".as_ref(), b"world".as_ref()]);
    }

    #[test]
    fn decodes_fixed_len_byte_arrays() {
        let data = vec![1, 2, 3, 4, 5, 6];
        let result: Vec<&[u8]> = decode_fixed_len_byte_array(&data, 3).collect();
        assert_eq!(result, vec![&[1, 2, 3][..], &[4, 5, 6][..]]);
    }
}
