//! A column chunk's dictionary page, decoded once per file and shared (via `Arc`)
//! across every subsequent dictionary-encoded data page in that chunk.

use crate::encoding::plain;
use crate::error::{unsupported, Result};
use crate::schema::PhysicalType;

/// The decoded values of a dictionary page, keyed by physical type. Indices into a
/// data page's RLE/bit-pack stream are plain positions into the matching vector.
#[derive(Debug, Clone)]
pub enum Dictionary {
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    /// Also used for INT96 (raw 12-byte values) and FIXED_LEN_BYTE_ARRAY.
    ByteArray(Vec<Vec<u8>>),
}

impl Dictionary {
    /// Decodes a PLAIN-encoded dictionary page body (dictionary pages are always
    /// PLAIN-encoded, regardless of the data pages that reference them).
    pub fn try_new(physical_type: PhysicalType, bytes: &[u8], num_values: usize) -> Result<Self> {
        Ok(match physical_type {
            PhysicalType::Boolean => {
                return Err(unsupported!("BOOLEAN columns cannot be dictionary-encoded"))
            }
            PhysicalType::Int32 => Dictionary::Int(plain::decode_native::<i32>(bytes).take(num_values).collect()),
            PhysicalType::Int64 => Dictionary::Long(plain::decode_native::<i64>(bytes).take(num_values).collect()),
            PhysicalType::Float => Dictionary::Float(plain::decode_native::<f32>(bytes).take(num_values).collect()),
            PhysicalType::Double => Dictionary::Double(plain::decode_native::<f64>(bytes).take(num_values).collect()),
            PhysicalType::Int96 => Dictionary::ByteArray(
                plain::decode_fixed_len_byte_array(bytes, 12)
                    .take(num_values)
                    .map(|v| v.to_vec())
                    .collect(),
            ),
            PhysicalType::ByteArray => Dictionary::ByteArray(
                plain::ByteArrayDecoder::new(bytes)
                    .take(num_values)
                    .map(|v| v.to_vec())
                    .collect(),
            ),
            PhysicalType::FixedLenByteArray(len) => Dictionary::ByteArray(
                plain::decode_fixed_len_byte_array(bytes, len as usize)
                    .take(num_values)
                    .map(|v| v.to_vec())
                    .collect(),
            ),
        })
    }

    pub fn len(&self) -> usize {
        match self {
            Dictionary::Int(v) => v.len(),
            Dictionary::Long(v) => v.len(),
            Dictionary::Float(v) => v.len(),
            Dictionary::Double(v) => v.len(),
            Dictionary::ByteArray(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_int32_dictionary() {
        let values: Vec<i32> = vec![10, 20, 30];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let dict = Dictionary::try_new(PhysicalType::Int32, &bytes, 3).unwrap();
        match dict {
            Dictionary::Int(v) => assert_eq!(v, values),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn boolean_dictionary_is_rejected() {
        assert!(Dictionary::try_new(PhysicalType::Boolean, &[], 0).is_err());
    }
}
