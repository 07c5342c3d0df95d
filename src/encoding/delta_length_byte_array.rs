//! DELTA_LENGTH_BYTE_ARRAY: a `DELTA_BINARY_PACKED` stream of lengths followed by the
//! concatenated raw value bytes.
//! <https://github.com/apache/parquet-format/blob/master/Encodings.md#delta-length-byte-array-delta_length_byte_array--6>

use super::delta_bitpacked;

/// Decodes lengths (`Iterator<Item = i64>`) and, once exhausted, the concatenated
/// values via [`into_values`](Decoder::into_values). Does not allocate on the heap.
#[derive(Debug)]
pub struct Decoder<'a> {
    values: &'a [u8],
    lengths: delta_bitpacked::Decoder<'a>,
    total_length: i64,
}

impl<'a> Decoder<'a> {
    pub fn new(values: &'a [u8]) -> Self {
        let lengths = delta_bitpacked::Decoder::new(values);
        Self {
            values,
            lengths,
            total_length: 0,
        }
    }

    /// Consumes this decoder and returns the slice of concatenated values.
    /// # Panics
    /// Panics if the lengths iterator has not been fully consumed first.
    pub fn into_values(self) -> &'a [u8] {
        assert_eq!(self.lengths.size_hint().0, 0);
        let start = self.lengths.consumed_bytes();
        &self.values[start..start + self.total_length as usize]
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.lengths.next();
        if let Some(len) = result {
            self.total_length += len;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world() {
        let data = &[
            128, 1, 4, 2, 10, 0, 0, 0, 0, 0, 72, 101, 108, 108, 111, 87, 111, 114, 108, 100,
        ];
        let expected = &["Hello", "World"];
        let expected_lengths: Vec<i64> = expected.iter().map(|x| x.len() as i64).collect();
        let expected_values = expected.join("");

        let mut decoder = Decoder::new(data);
        let lengths: Vec<i64> = decoder.by_ref().collect();
        assert_eq!(lengths, expected_lengths);

        let values = decoder.into_values();
        assert_eq!(values, expected_values.as_bytes());
    }
}
