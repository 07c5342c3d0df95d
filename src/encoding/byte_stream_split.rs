//! BYTE_STREAM_SPLIT: each value's `N` bytes are stored in `N` separate byte-planes
//! (all byte 0s, then all byte 1s, ...), which compresses well for floating point
//! data. Decoding re-interleaves the planes back into native values.
//! <https://github.com/apache/parquet-format/blob/master/Encodings.md#byte-stream-split-byte_stream_split--9>

use crate::error::{Error, Result};
use crate::types::NativeType;
use std::marker::PhantomData;

#[derive(Debug)]
pub struct Decoder<'a, T: NativeType> {
    values: &'a [u8],
    num_elements: usize,
    current: usize,
    element_size: usize,
    element_type: PhantomData<T>,
}

impl<'a, T: NativeType> Decoder<'a, T> {
    pub fn try_new(values: &'a [u8]) -> Result<Self> {
        let element_size = std::mem::size_of::<T>();
        if values.len() % element_size != 0 {
            return Err(Error::oos("byte stream split data is not a multiple of the element size"));
        }
        Ok(Self {
            values,
            num_elements: values.len() / element_size,
            current: 0,
            element_size,
            element_type: PhantomData,
        })
    }
}

impl<'a, T: NativeType> Iterator for Decoder<'a, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.num_elements {
            return None;
        }
        let mut buffer = T::Bytes::default();
        {
            let buffer = buffer.as_mut();
            for (plane, slot) in buffer.iter_mut().enumerate() {
                *slot = self.values[plane * self.num_elements + self.current];
            }
        }
        self.current += 1;
        Some(T::from_le_bytes(buffer))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.num_elements - self.current;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_rejoins_f32_planes() {
        let values: [f32; 3] = [1.5, -2.25, 0.0];
        let bytes: Vec<[u8; 4]> = values.iter().map(|v| v.to_le_bytes()).collect();
        let mut planed = vec![0u8; 12];
        for (i, b) in bytes.iter().enumerate() {
            for plane in 0..4 {
                planed[plane * 3 + i] = b[plane];
            }
        }
        let decoder = Decoder::<f32>::try_new(&planed).unwrap();
        let decoded: Vec<f32> = decoder.collect();
        assert_eq!(decoded, values);
    }

    #[test]
    fn rejects_misaligned_length() {
        let data = vec![0u8; 7];
        assert!(Decoder::<f32>::try_new(&data).is_err());
    }
}
