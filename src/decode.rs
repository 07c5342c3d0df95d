//! Dispatches a page's `(physical type, encoding)` pair to the matching decoder in
//! [`crate::encoding`] and scatters the decoded values into a full-length array
//! according to the page's definition levels — null slots are left at `Default`.

use crate::encoding::{
    boolean_rle, byte_stream_split, delta_bitpacked, delta_byte_array, delta_length_byte_array, hybrid_rle, plain,
    Encoding,
};
use crate::error::{oos, unsupported, Result};
use crate::page::Dictionary;
use crate::schema::PhysicalType;

/// The decoded values of one page, before they are combined with levels into a
/// [`crate::page::Page`].
#[derive(Debug, Clone)]
pub enum DecodedValues {
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Boolean(Vec<bool>),
    ByteArray(Vec<Vec<u8>>),
}

impl DecodedValues {
    /// An empty, growable value of the variant matching `physical_type`, for a
    /// caller (e.g. [`crate::column_iterator`]) accumulating values across pages.
    pub(crate) fn empty_of(physical_type: PhysicalType) -> Self {
        match physical_type {
            PhysicalType::Boolean => DecodedValues::Boolean(Vec::new()),
            PhysicalType::Int32 => DecodedValues::Int(Vec::new()),
            PhysicalType::Int64 => DecodedValues::Long(Vec::new()),
            PhysicalType::Float => DecodedValues::Float(Vec::new()),
            PhysicalType::Double => DecodedValues::Double(Vec::new()),
            PhysicalType::Int96 | PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_) => {
                DecodedValues::ByteArray(Vec::new())
            }
        }
    }

    fn empty(physical_type: PhysicalType, num_values: usize) -> Self {
        match physical_type {
            PhysicalType::Boolean => DecodedValues::Boolean(vec![false; num_values]),
            PhysicalType::Int32 => DecodedValues::Int(vec![0; num_values]),
            PhysicalType::Int64 => DecodedValues::Long(vec![0; num_values]),
            PhysicalType::Float => DecodedValues::Float(vec![0.0; num_values]),
            PhysicalType::Double => DecodedValues::Double(vec![0.0; num_values]),
            PhysicalType::Int96 | PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_) => {
                DecodedValues::ByteArray(vec![Vec::new(); num_values])
            }
        }
    }
}

/// Scatters a sequence of non-null values into a `num_values`-long array: when
/// `definition_levels` is `None` every slot is filled in order; otherwise only the
/// slots whose level equals `max_definition_level` consume a value from `iter`, and
/// the rest keep their `Default`.
fn scatter<T: Clone + Default>(
    mut iter: impl Iterator<Item = T>,
    definition_levels: Option<&[i32]>,
    max_definition_level: i16,
    num_values: usize,
) -> Vec<T> {
    let mut out = vec![T::default(); num_values];
    match definition_levels {
        None => {
            for (slot, value) in out.iter_mut().zip(iter) {
                *slot = value;
            }
        }
        Some(levels) => {
            for (slot, level) in out.iter_mut().zip(levels.iter()) {
                if *level == max_definition_level as i32 {
                    if let Some(value) = iter.next() {
                        *slot = value;
                    }
                }
            }
        }
    }
    out
}

fn count_non_null(definition_levels: Option<&[i32]>, max_definition_level: i16, num_values: usize) -> usize {
    match definition_levels {
        None => num_values,
        Some(levels) => levels.iter().filter(|&&l| l == max_definition_level as i32).count(),
    }
}

fn levels_bit_width(max_level: i16) -> usize {
    if max_level <= 0 {
        0
    } else {
        (32 - (max_level as u32).leading_zeros()) as usize
    }
}

/// Decodes the hybrid RLE/bit-packed repetition or definition level section starting
/// at `bytes`, which must begin with a 4-byte little-endian length prefix (the
/// `DATA_PAGE` layout; `DATA_PAGE_V2` passes a pre-sliced section with `is_v2: true`
/// and no prefix).
pub fn decode_levels(bytes: &[u8], max_level: i16, num_values: usize, is_v2: bool) -> Result<(Vec<i32>, usize)> {
    let bit_width = levels_bit_width(max_level);
    if is_v2 {
        let decoder = hybrid_rle::HybridRleDecoder::new(bytes, bit_width, num_values);
        Ok((decoder.map(|v| v as i32).collect(), bytes.len()))
    } else {
        if bytes.len() < 4 {
            return Err(oos!("level section is shorter than its length prefix"));
        }
        let len = crate::encoding::get_length(bytes) as usize;
        if bytes.len() < 4 + len {
            return Err(oos!("level section's length prefix overruns the page body"));
        }
        let decoder = hybrid_rle::HybridRleDecoder::new(&bytes[4..4 + len], bit_width, num_values);
        Ok((decoder.map(|v| v as i32).collect(), 4 + len))
    }
}

/// Decodes a page's values. `bytes` is the value section only (levels already
/// stripped off by the caller). `is_data_page_v2` distinguishes the two boolean RLE
/// framings (§ the length-prefixed `DATA_PAGE` form vs. the bare `DATA_PAGE_V2` form).
#[allow(clippy::too_many_arguments)]
pub fn decode_values(
    encoding: Encoding,
    physical_type: PhysicalType,
    type_length: Option<i32>,
    bytes: &[u8],
    dictionary: Option<&Dictionary>,
    definition_levels: Option<&[i32]>,
    max_definition_level: i16,
    num_values: usize,
    is_data_page_v2: bool,
) -> Result<DecodedValues> {
    if bytes.is_empty() && count_non_null(definition_levels, max_definition_level, num_values) == 0 {
        return Ok(DecodedValues::empty(physical_type, num_values));
    }
    match encoding {
        Encoding::Plain => decode_plain(physical_type, type_length, bytes, definition_levels, max_definition_level, num_values),
        Encoding::PlainDictionary | Encoding::RleDictionary => {
            decode_dictionary(bytes, dictionary, definition_levels, max_definition_level, num_values)
        }
        Encoding::DeltaBinaryPacked => {
            decode_delta_binary(physical_type, bytes, definition_levels, max_definition_level, num_values)
        }
        Encoding::DeltaLengthByteArray => {
            decode_delta_length_byte_array(bytes, definition_levels, max_definition_level, num_values)
        }
        Encoding::DeltaByteArray => decode_delta_byte_array(bytes, definition_levels, max_definition_level, num_values),
        Encoding::ByteStreamSplit => decode_byte_stream_split(
            physical_type,
            type_length,
            bytes,
            definition_levels,
            max_definition_level,
            num_values,
        ),
        Encoding::Rle => match physical_type {
            PhysicalType::Boolean => decode_boolean_rle(
                bytes,
                definition_levels,
                max_definition_level,
                num_values,
                is_data_page_v2,
            ),
            _ => Err(unsupported!("RLE is only a value encoding for BOOLEAN columns")),
        },
        Encoding::BitPacked => Err(unsupported!("legacy BIT_PACKED value encoding is not supported")),
    }
}

fn decode_plain(
    physical_type: PhysicalType,
    type_length: Option<i32>,
    bytes: &[u8],
    definition_levels: Option<&[i32]>,
    max_definition_level: i16,
    num_values: usize,
) -> Result<DecodedValues> {
    Ok(match physical_type {
        PhysicalType::Boolean => {
            let num_non_null = count_non_null(definition_levels, max_definition_level, num_values);
            let values = (0..num_non_null).map(|i| {
                let byte = bytes.get(i / 8).copied().unwrap_or(0);
                (byte >> (i % 8)) & 1 == 1
            });
            DecodedValues::Boolean(scatter(values, definition_levels, max_definition_level, num_values))
        }
        PhysicalType::Int32 => DecodedValues::Int(scatter(
            plain::decode_native::<i32>(bytes),
            definition_levels,
            max_definition_level,
            num_values,
        )),
        PhysicalType::Int64 => DecodedValues::Long(scatter(
            plain::decode_native::<i64>(bytes),
            definition_levels,
            max_definition_level,
            num_values,
        )),
        PhysicalType::Float => DecodedValues::Float(scatter(
            plain::decode_native::<f32>(bytes),
            definition_levels,
            max_definition_level,
            num_values,
        )),
        PhysicalType::Double => DecodedValues::Double(scatter(
            plain::decode_native::<f64>(bytes),
            definition_levels,
            max_definition_level,
            num_values,
        )),
        PhysicalType::Int96 => DecodedValues::ByteArray(scatter(
            plain::decode_fixed_len_byte_array(bytes, 12).map(|v| v.to_vec()),
            definition_levels,
            max_definition_level,
            num_values,
        )),
        PhysicalType::ByteArray => DecodedValues::ByteArray(scatter(
            plain::ByteArrayDecoder::new(bytes).map(|v| v.to_vec()),
            definition_levels,
            max_definition_level,
            num_values,
        )),
        PhysicalType::FixedLenByteArray(len) => {
            let len = len
                .try_into()
                .map_err(|_| oos!("negative FIXED_LEN_BYTE_ARRAY type_length"))?;
            DecodedValues::ByteArray(scatter(
                plain::decode_fixed_len_byte_array(bytes, len).map(|v| v.to_vec()),
                definition_levels,
                max_definition_level,
                num_values,
            ))
        }
    })
}

fn decode_dictionary(
    bytes: &[u8],
    dictionary: Option<&Dictionary>,
    definition_levels: Option<&[i32]>,
    max_definition_level: i16,
    num_values: usize,
) -> Result<DecodedValues> {
    let dictionary = dictionary.ok_or_else(|| oos!("dictionary-encoded page has no preceding dictionary page"))?;
    let num_non_null = count_non_null(definition_levels, max_definition_level, num_values);
    if bytes.is_empty() {
        return Ok(match dictionary {
            Dictionary::Int(_) => DecodedValues::Int(vec![0; num_values]),
            Dictionary::Long(_) => DecodedValues::Long(vec![0; num_values]),
            Dictionary::Float(_) => DecodedValues::Float(vec![0.0; num_values]),
            Dictionary::Double(_) => DecodedValues::Double(vec![0.0; num_values]),
            Dictionary::ByteArray(_) => DecodedValues::ByteArray(vec![Vec::new(); num_values]),
        });
    }
    let bit_width = bytes[0] as usize;
    let indices = hybrid_rle::HybridRleDecoder::new(&bytes[1..], bit_width, num_non_null);

    Ok(match dictionary {
        Dictionary::Int(values) => DecodedValues::Int(scatter(
            indices.map(|i| values[i as usize]),
            definition_levels,
            max_definition_level,
            num_values,
        )),
        Dictionary::Long(values) => DecodedValues::Long(scatter(
            indices.map(|i| values[i as usize]),
            definition_levels,
            max_definition_level,
            num_values,
        )),
        Dictionary::Float(values) => DecodedValues::Float(scatter(
            indices.map(|i| values[i as usize]),
            definition_levels,
            max_definition_level,
            num_values,
        )),
        Dictionary::Double(values) => DecodedValues::Double(scatter(
            indices.map(|i| values[i as usize]),
            definition_levels,
            max_definition_level,
            num_values,
        )),
        Dictionary::ByteArray(values) => DecodedValues::ByteArray(scatter(
            indices.map(|i| values[i as usize].clone()),
            definition_levels,
            max_definition_level,
            num_values,
        )),
    })
}

fn decode_delta_binary(
    physical_type: PhysicalType,
    bytes: &[u8],
    definition_levels: Option<&[i32]>,
    max_definition_level: i16,
    num_values: usize,
) -> Result<DecodedValues> {
    match physical_type {
        PhysicalType::Int32 => Ok(DecodedValues::Int(scatter(
            delta_bitpacked::Decoder::new(bytes).map(|v| v as i32),
            definition_levels,
            max_definition_level,
            num_values,
        ))),
        PhysicalType::Int64 => Ok(DecodedValues::Long(scatter(
            delta_bitpacked::Decoder::new(bytes),
            definition_levels,
            max_definition_level,
            num_values,
        ))),
        _ => Err(unsupported!("DELTA_BINARY_PACKED is only valid for INT32/INT64 columns")),
    }
}

fn decode_delta_length_byte_array(
    bytes: &[u8],
    definition_levels: Option<&[i32]>,
    max_definition_level: i16,
    num_values: usize,
) -> Result<DecodedValues> {
    let mut decoder = delta_length_byte_array::Decoder::new(bytes);
    let lengths: Vec<i64> = decoder.by_ref().collect();
    let values_bytes = decoder.into_values();
    let mut cursor = 0usize;
    let mut values = Vec::with_capacity(lengths.len());
    for len in lengths {
        let len = len as usize;
        values.push(values_bytes[cursor..cursor + len].to_vec());
        cursor += len;
    }
    Ok(DecodedValues::ByteArray(scatter(
        values.into_iter(),
        definition_levels,
        max_definition_level,
        num_values,
    )))
}

fn decode_delta_byte_array(
    bytes: &[u8],
    definition_levels: Option<&[i32]>,
    max_definition_level: i16,
    num_values: usize,
) -> Result<DecodedValues> {
    let mut decoder = delta_byte_array::Decoder::new(bytes);
    let prefixes: Vec<i64> = decoder.by_ref().collect();
    let mut length_decoder = decoder.into_lengths();
    let suffix_lengths: Vec<i64> = length_decoder.by_ref().collect();
    let suffix_values = length_decoder.into_values();
    let values = delta_byte_array::rebuild_values(&prefixes, &suffix_lengths, suffix_values);
    Ok(DecodedValues::ByteArray(scatter(
        values.into_iter(),
        definition_levels,
        max_definition_level,
        num_values,
    )))
}

fn decode_byte_stream_split(
    physical_type: PhysicalType,
    type_length: Option<i32>,
    bytes: &[u8],
    definition_levels: Option<&[i32]>,
    max_definition_level: i16,
    num_values: usize,
) -> Result<DecodedValues> {
    Ok(match physical_type {
        PhysicalType::Float => DecodedValues::Float(scatter(
            byte_stream_split::Decoder::<f32>::try_new(bytes)?,
            definition_levels,
            max_definition_level,
            num_values,
        )),
        PhysicalType::Double => DecodedValues::Double(scatter(
            byte_stream_split::Decoder::<f64>::try_new(bytes)?,
            definition_levels,
            max_definition_level,
            num_values,
        )),
        PhysicalType::Int32 => DecodedValues::Int(scatter(
            byte_stream_split::Decoder::<i32>::try_new(bytes)?,
            definition_levels,
            max_definition_level,
            num_values,
        )),
        PhysicalType::Int64 => DecodedValues::Long(scatter(
            byte_stream_split::Decoder::<i64>::try_new(bytes)?,
            definition_levels,
            max_definition_level,
            num_values,
        )),
        PhysicalType::FixedLenByteArray(width) => {
            let width: usize = width
                .try_into()
                .map_err(|_| oos!("negative FIXED_LEN_BYTE_ARRAY type_length"))?;
            if width == 0 || bytes.len() % width != 0 {
                return Err(oos!("byte stream split data is not a multiple of the element width"));
            }
            let n = bytes.len() / width;
            let values = (0..n).map(|i| {
                let mut value = vec![0u8; width];
                for (plane, slot) in value.iter_mut().enumerate() {
                    *slot = bytes[plane * n + i];
                }
                value
            });
            DecodedValues::ByteArray(scatter(values, definition_levels, max_definition_level, num_values))
        }
        _ => return Err(unsupported!("BYTE_STREAM_SPLIT is not valid for this physical type")),
    })
}

fn decode_boolean_rle(
    bytes: &[u8],
    definition_levels: Option<&[i32]>,
    max_definition_level: i16,
    num_values: usize,
    is_data_page_v2: bool,
) -> Result<DecodedValues> {
    let num_non_null = count_non_null(definition_levels, max_definition_level, num_values);
    let values: Vec<bool> = if is_data_page_v2 {
        boolean_rle::decode_v2(bytes, num_non_null).map(|v| v == 1).collect()
    } else {
        boolean_rle::decode(bytes, num_non_null).map(|v| v == 1).collect()
    };
    Ok(DecodedValues::Boolean(scatter(
        values.into_iter(),
        definition_levels,
        max_definition_level,
        num_values,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_int32_no_levels() {
        let values: Vec<i32> = vec![1, 2, 3];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let decoded = decode_values(Encoding::Plain, PhysicalType::Int32, None, &bytes, None, None, 0, 3, false).unwrap();
        match decoded {
            DecodedValues::Int(v) => assert_eq!(v, values),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn plain_int32_with_nulls_scatters_into_slots() {
        let values: Vec<i32> = vec![7, 9];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let levels = [1, 0, 1];
        let decoded =
            decode_values(Encoding::Plain, PhysicalType::Int32, None, &bytes, None, Some(&levels), 1, 3, false).unwrap();
        match decoded {
            DecodedValues::Int(v) => assert_eq!(v, vec![7, 0, 9]),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn dictionary_without_page_is_an_error() {
        let result = decode_values(
            Encoding::RleDictionary,
            PhysicalType::Int32,
            None,
            &[0],
            None,
            None,
            0,
            1,
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn byte_stream_split_fixed_len_byte_array() {
        // two 2-byte values: [0x01, 0x02] and [0x03, 0x04], split into planes
        // plane0 = [0x01, 0x03], plane1 = [0x02, 0x04]
        let bytes = vec![0x01, 0x03, 0x02, 0x04];
        let decoded = decode_values(
            Encoding::ByteStreamSplit,
            PhysicalType::FixedLenByteArray(2),
            Some(2),
            &bytes,
            None,
            None,
            0,
            2,
            false,
        )
        .unwrap();
        match decoded {
            DecodedValues::ByteArray(v) => assert_eq!(v, vec![vec![0x01, 0x02], vec![0x03, 0x04]]),
            _ => panic!("wrong variant"),
        }
    }
}
