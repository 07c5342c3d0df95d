//! DELTA_BINARY_PACKED: a stream header (block size, mini-blocks per block, total
//! value count, first value) followed by one block per `block_size` values. Each
//! block carries a `min_delta` and, per mini-block, a bit width and the bit-packed
//! `(delta - min_delta)` values.
//! <https://github.com/apache/parquet-format/blob/master/Encodings.md#delta-encoding-delta_binary_packed--5>
//!
//! Used for both INT32 and INT64 columns; this decoder always yields `i64` and the
//! caller narrows to the physical type.

use super::bitpacked;
use super::ceil8;
use super::uleb128;
use super::zigzag_leb128;

struct Block<'a> {
    min_delta: i64,
    values_per_mini_block: usize,
    bitwidths: &'a [u8],
    values: &'a [u8],
    remaining: usize,
    buffer: Vec<u64>,
    buffer_pos: usize,
    consumed_bytes: usize,
}

impl<'a> Block<'a> {
    fn new(
        mut values: &'a [u8],
        num_mini_blocks: usize,
        values_per_mini_block: usize,
        length: usize,
    ) -> Self {
        let length = std::cmp::min(length, num_mini_blocks * values_per_mini_block);

        let mut consumed_bytes = 0;
        let (min_delta, consumed) = zigzag_leb128::decode(values);
        consumed_bytes += consumed;
        values = &values[consumed..];

        let bitwidths = &values[..num_mini_blocks];
        consumed_bytes += num_mini_blocks;
        values = &values[num_mini_blocks..];

        let mut block = Block {
            min_delta,
            values_per_mini_block,
            bitwidths,
            values,
            remaining: length,
            buffer: Vec::new(),
            buffer_pos: 0,
            consumed_bytes,
        };
        block.advance_miniblock();
        block
    }

    fn advance_miniblock(&mut self) {
        let num_bits = self.bitwidths[0] as usize;
        self.bitwidths = &self.bitwidths[1..];

        let count = std::cmp::min(self.remaining, self.values_per_mini_block);
        self.buffer.clear();
        self.buffer.resize(count, 0);

        if num_bits > 0 {
            let miniblock_length = ceil8(self.values_per_mini_block * num_bits);
            let (miniblock, remainder) = self.values.split_at(miniblock_length);
            bitpacked::unpack64(miniblock, num_bits, &mut self.buffer);
            self.values = remainder;
            self.consumed_bytes += miniblock_length;
        }
        self.buffer_pos = 0;
    }
}

impl<'a> Iterator for Block<'a> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let raw = self.buffer[self.buffer_pos];
        self.buffer_pos += 1;
        self.remaining -= 1;

        if self.remaining > 0 && self.buffer_pos == self.buffer.len() {
            self.advance_miniblock();
        }

        Some(self.min_delta + raw as i64)
    }
}

/// Decoder of Parquet's `DELTA_BINARY_PACKED`. Implements `Iterator<Item = i64>`.
/// Does not allocate beyond the mini-block scratch buffer.
pub struct Decoder<'a> {
    num_mini_blocks: usize,
    values_per_mini_block: usize,
    total_count: usize,
    first_value: i64,
    values: &'a [u8],
    current_block: Block<'a>,
    consumed_bytes: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(mut values: &'a [u8]) -> Self {
        let mut consumed_bytes = 0;
        let (block_size, consumed) = uleb128::decode(values);
        consumed_bytes += consumed;
        values = &values[consumed..];
        let (num_mini_blocks, consumed) = uleb128::decode(values);
        let num_mini_blocks = num_mini_blocks as usize;
        consumed_bytes += consumed;
        values = &values[consumed..];
        let (total_count, consumed) = uleb128::decode(values);
        let total_count = total_count as usize;
        consumed_bytes += consumed;
        values = &values[consumed..];
        let (first_value, consumed) = zigzag_leb128::decode(values);
        consumed_bytes += consumed;
        values = &values[consumed..];

        let values_per_mini_block = block_size as usize / num_mini_blocks.max(1);

        let current_block = Block::new(values, num_mini_blocks, values_per_mini_block, total_count);
        Self {
            num_mini_blocks,
            values_per_mini_block,
            total_count,
            first_value,
            values,
            current_block,
            consumed_bytes,
        }
    }

    /// Total number of bytes consumed from the original slice up to this point.
    pub fn consumed_bytes(&self) -> usize {
        self.consumed_bytes + self.current_block.consumed_bytes
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.total_count == 0 {
            return None;
        }
        let delta = match self.current_block.next() {
            Some(d) => d,
            None => {
                self.values = &self.values[self.current_block.consumed_bytes..];
                self.consumed_bytes += self.current_block.consumed_bytes;
                self.current_block = Block::new(
                    self.values,
                    self.num_mini_blocks,
                    self.values_per_mini_block,
                    self.total_count,
                );
                self.current_block
                    .next()
                    .expect("a block covering a nonzero remaining count yields at least one value")
            }
        };
        self.total_count -= 1;

        let result = self.first_value;
        self.first_value += delta;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.total_count, Some(self.total_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_spec() {
        let expected: Vec<i64> = (1..=5).collect();
        // header: [128, 1, 4, 5, 2] -> block_size=128, mini_blocks=4, count=5, first=1
        // block: min_delta=1 <=z> 2, bit_width=0
        let data = &[128, 1, 4, 5, 2, 2, 0, 0, 0, 0];

        let mut decoder = Decoder::new(data);
        let r: Vec<i64> = decoder.by_ref().collect();

        assert_eq!(expected, r);
        assert_eq!(decoder.consumed_bytes(), 10);
    }

    #[test]
    fn case2() {
        let expected: Vec<i64> = vec![1, 2, 3, 4, 5, 1];
        let data = &[
            128, 1, 4, 6, 2, 7, 3, 0, 0, 0, 0b01101101, 0b00001011, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            1, 2, 3,
        ];

        let mut decoder = Decoder::new(data);
        let r: Vec<i64> = decoder.by_ref().collect();

        assert_eq!(expected, r);
        assert_eq!(decoder.consumed_bytes(), data.len() - 3);
    }

    #[test]
    fn multiple_miniblocks() {
        #[rustfmt::skip]
        let data = &[
            128, 1, 4, 65, 100,
            7, 3, 4, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88,
            1, 2, 3,
        ];

        #[rustfmt::skip]
        let expected: Vec<i64> = vec![
            50,
            46, 42, 38, 34, 30, 26, 22, 18, 14, 10, 6, 2, -2, -6, -10, -14, -18, -22, -26, -30, -34,
            -38, -42, -46, -50, -54, -58, -62, -66, -70, -74, -78,
            -74, -70, -66, -62, -58, -54, -50, -46, -42, -38, -34, -30, -26, -22, -18, -14, -10, -6,
            -2, 2, 6, 10, 14, 18, 22, 26, 30, 34, 38, 42, 46, 50,
        ];

        let mut decoder = Decoder::new(data);
        let r: Vec<i64> = decoder.by_ref().collect();

        assert_eq!(&expected[..], &r[..]);
        assert_eq!(decoder.consumed_bytes(), data.len() - 3);
    }
}
