//! DELTA_BYTE_ARRAY: a `DELTA_BINARY_PACKED` stream of shared prefix lengths, followed
//! by a `DELTA_LENGTH_BYTE_ARRAY` stream of suffix lengths and the concatenated
//! suffix bytes. Each value is `prior_value[..prefix_len] ++ suffix`.
//! <https://github.com/apache/parquet-format/blob/master/Encodings.md#delta-strings-delta_byte_array--7>

use super::delta_bitpacked;
use super::delta_length_byte_array;

/// Decodes prefix lengths (`Iterator<Item = i64>`); call [`into_lengths`](Decoder::into_lengths)
/// once exhausted to move on to the suffix lengths and values.
#[derive(Debug)]
pub struct Decoder<'a> {
    values: &'a [u8],
    prefix_lengths: delta_bitpacked::Decoder<'a>,
}

impl<'a> Decoder<'a> {
    pub fn new(values: &'a [u8]) -> Self {
        let prefix_lengths = delta_bitpacked::Decoder::new(values);
        Self {
            values,
            prefix_lengths,
        }
    }

    pub fn into_lengths(self) -> delta_length_byte_array::Decoder<'a> {
        assert_eq!(self.prefix_lengths.size_hint().0, 0);
        delta_length_byte_array::Decoder::new(&self.values[self.prefix_lengths.consumed_bytes()..])
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        self.prefix_lengths.next()
    }
}

/// Reassembles a full sequence of values given their prefix lengths, suffix lengths
/// and concatenated suffix bytes, carrying the prior value forward between calls.
pub fn rebuild_values(prefixes: &[i64], suffix_lengths: &[i64], suffix_values: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::with_capacity(prefixes.len());
    let mut prior: Vec<u8> = Vec::new();
    let mut cursor = 0usize;
    for (prefix_len, suffix_len) in prefixes.iter().zip(suffix_lengths.iter()) {
        let prefix_len = *prefix_len as usize;
        let suffix_len = *suffix_len as usize;
        let mut value = Vec::with_capacity(prefix_len + suffix_len);
        value.extend_from_slice(&prior[..prefix_len]);
        value.extend_from_slice(&suffix_values[cursor..cursor + suffix_len]);
        cursor += suffix_len;
        prior = value.clone();
        out.push(value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_no_shared_prefix() {
        let data = &[
            128, 1, 4, 2, 0, 0, 0, 0, 0, 0, 128, 1, 4, 2, 10, 0, 0, 0, 0, 0, 72, 101, 108, 108,
            111, 87, 111, 114, 108, 100, 1, 2, 3,
        ];
        let expected = &["Hello", "World"];

        let mut decoder = Decoder::new(data);
        let prefixes: Vec<i64> = decoder.by_ref().collect();
        assert_eq!(prefixes, vec![0, 0]);

        let mut decoder = decoder.into_lengths();
        let lengths: Vec<i64> = decoder.by_ref().collect();
        assert_eq!(lengths, vec![5, 5]);

        let values = decoder.into_values();
        let rebuilt = rebuild_values(&prefixes, &lengths, values);
        let rebuilt: Vec<String> = rebuilt
            .into_iter()
            .map(|v| String::from_utf8(v).unwrap())
            .collect();
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn shared_prefix_is_carried_forward() {
        let prefixes = vec![0, 5];
        let lengths = vec![5, 5];
        let values = b"applesauce";
        let rebuilt = rebuild_values(&prefixes, &lengths, values);
        assert_eq!(rebuilt[0], b"apple");
        assert_eq!(rebuilt[1], b"applesauce");
    }
}
