//! RLE/bit-packing hybrid: a stream of runs, each either a literal bit-packed run or
//! an RLE run of a single repeated value, used for repetition/definition levels,
//! dictionary indices and BOOLEAN's RLE value encoding.
//! <https://github.com/apache/parquet-format/blob/master/Encodings.md#run-length-encoding--bit-packing-hybrid-rle--3>

use super::bitpacked;
use super::ceil8;
use super::uleb128;

/// One run out of the raw hybrid stream. The consumer must already know the
/// stream's bit width to interpret a `Bitpacked` run.
#[derive(Debug, PartialEq, Eq)]
pub enum HybridEncoded<'a> {
    /// `8 * values.len() / num_bits` values, bit-packed at the stream's `num_bits`.
    Bitpacked(&'a [u8]),
    /// `count` repetitions of the `num_bits`-wide little-endian value in `value`.
    Rle(&'a [u8], usize),
}

/// Splits a hybrid-encoded byte stream into its constituent runs without unpacking
/// them; [`HybridRleDecoder`] uses this to produce plain `u32` values.
pub struct Decoder<'a> {
    values: &'a [u8],
    num_bits: usize,
    rle_run_bytes: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(values: &'a [u8], num_bits: usize) -> Self {
        Self {
            values,
            num_bits,
            rle_run_bytes: ceil8(num_bits),
        }
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = HybridEncoded<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.values.is_empty() {
            return None;
        }
        let (indicator, consumed) = uleb128::decode(self.values);
        self.values = &self.values[consumed..];
        if indicator & 1 == 1 {
            let num_groups = indicator as usize >> 1;
            let byte_len = std::cmp::min(num_groups * 8 * self.num_bits / 8, self.values.len());
            let result = Some(HybridEncoded::Bitpacked(&self.values[..byte_len]));
            self.values = &self.values[byte_len..];
            result
        } else {
            let count = indicator as usize >> 1;
            let byte_len = std::cmp::min(self.rle_run_bytes, self.values.len());
            let result = Some(HybridEncoded::Rle(&self.values[..byte_len], count));
            self.values = &self.values[byte_len..];
            result
        }
    }
}

/// Fully decodes a hybrid RLE/bit-packed stream into plain `u32` values: repetition
/// levels, definition levels and dictionary indices all ride on this.
pub struct HybridRleDecoder<'a> {
    decoder: Decoder<'a>,
    buffer: Vec<u32>,
    buffer_pos: usize,
    remaining: usize,
}

impl<'a> HybridRleDecoder<'a> {
    pub fn new(values: &'a [u8], num_bits: usize, num_values: usize) -> Self {
        Self {
            decoder: Decoder::new(values, num_bits),
            buffer: Vec::new(),
            buffer_pos: 0,
            remaining: num_values,
        }
    }

    fn fill_buffer(&mut self) {
        self.buffer.clear();
        self.buffer_pos = 0;
        match self.decoder.next() {
            Some(HybridEncoded::Rle(value_bytes, count)) => {
                let mut padded = [0u8; 4];
                padded[..value_bytes.len().min(4)].copy_from_slice(&value_bytes[..value_bytes.len().min(4)]);
                let value = u32::from_le_bytes(padded);
                let count = count.min(self.remaining);
                self.buffer.resize(count, value);
            }
            Some(HybridEncoded::Bitpacked(packed)) => {
                let num_bits = self.decoder.num_bits;
                let count = if num_bits == 0 {
                    0
                } else {
                    std::cmp::min(packed.len() * 8 / num_bits, self.remaining)
                };
                self.buffer.resize(count, 0);
                bitpacked::unpack32(packed, num_bits, &mut self.buffer);
            }
            None => {}
        }
    }
}

impl<'a> Iterator for HybridRleDecoder<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        if self.buffer_pos == self.buffer.len() {
            self.fill_buffer();
            if self.buffer.is_empty() {
                return None;
            }
        }
        let value = self.buffer[self.buffer_pos];
        self.buffer_pos += 1;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_bitpacked_run() {
        let bit_width = 1;
        let values = vec![0b00001011u8];
        let mut decoder = Decoder::new(&values, bit_width);
        let run = decoder.next().unwrap();
        assert_eq!(run, HybridEncoded::Bitpacked(&[0b00001011]));
    }

    #[test]
    fn splits_rle_run() {
        let bit_width = 1;
        let values = vec![0b00010000u8, 0b00000001];
        let mut decoder = Decoder::new(&values, bit_width);
        let run = decoder.next().unwrap();
        assert_eq!(run, HybridEncoded::Rle(&[0b00000001], 8));
    }

    #[test]
    fn full_decode_mixed_runs() {
        // one bitpacked run of 8 ones/zeros alternating, bit_width = 1
        let data = vec![0b00000011u8, 0b10101010];
        let mut decoder = HybridRleDecoder::new(&data, 1, 8);
        let result: Vec<u32> = decoder.by_ref().collect();
        assert_eq!(result, vec![0, 1, 0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn full_decode_rle_run() {
        let data = vec![0b00010000u8, 0b00000001];
        let decoder = HybridRleDecoder::new(&data, 1, 8);
        let result: Vec<u32> = decoder.collect();
        assert_eq!(result, vec![1; 8]);
    }
}
