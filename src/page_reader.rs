//! Decodes a single [`PageInfo`] handle into a fully materialized [`Page`]: parses
//! the page header, decompresses the body, splits off the repetition/definition
//! level sections, and dispatches the remaining value bytes to [`crate::decode`].

use crate::decode::{self, DecodedValues};
use crate::error::{oos, Result};
use crate::page::{Page, PageInfo, TypedPage};
use crate::parquet_bridge::DataPageHeaderExt;
use crate::{compression, thrift_bridge};
use parquet_format_safe::{DataPageHeader, DataPageHeaderV2, PageType};

/// Decodes `info` into its values and levels.
pub fn decode_page(info: &PageInfo) -> Result<Page> {
    let bytes = info.page_bytes();
    let (header, header_size) = thrift_bridge::read_page_header(bytes)?;
    let compressed_size: usize = header
        .compressed_page_size
        .try_into()
        .map_err(|_| oos!("negative compressed_page_size"))?;
    let body = &bytes[header_size..header_size + compressed_size];
    let uncompressed_size: usize = header
        .uncompressed_page_size
        .try_into()
        .map_err(|_| oos!("negative uncompressed_page_size"))?;

    match header.type_ {
        PageType::DATA_PAGE => {
            let dph = header
                .data_page_header
                .as_ref()
                .ok_or_else(|| oos!("DATA_PAGE header is missing data_page_header"))?;
            decode_v1(dph, body, uncompressed_size, info)
        }
        PageType::DATA_PAGE_V2 => {
            let dph = header
                .data_page_header_v2
                .as_ref()
                .ok_or_else(|| oos!("DATA_PAGE_V2 header is missing data_page_header_v2"))?;
            decode_v2(dph, body, uncompressed_size, info)
        }
        other => Err(oos!("page_reader cannot decode a page of type {:?}", other)),
    }
}

fn decode_v1(dph: &DataPageHeader, body: &[u8], uncompressed_size: usize, info: &PageInfo) -> Result<Page> {
    let decompressed = compression::decompress(info.codec, body, uncompressed_size)?;
    let num_values = dph.num_values as usize;
    let mut cursor = decompressed.as_slice();

    let repetition_levels = if info.max_repetition_level > 0 {
        let (levels, consumed) = decode::decode_levels(cursor, info.max_repetition_level, num_values, false)?;
        cursor = &cursor[consumed..];
        Some(levels)
    } else {
        None
    };

    let definition_levels = if info.max_definition_level > 0 {
        let (levels, consumed) = decode::decode_levels(cursor, info.max_definition_level, num_values, false)?;
        cursor = &cursor[consumed..];
        Some(levels)
    } else {
        None
    };

    let decoded = decode::decode_values(
        dph.encoding()?,
        info.physical_type,
        info.type_length,
        cursor,
        info.dictionary.as_deref(),
        definition_levels.as_deref(),
        info.max_definition_level,
        num_values,
        false,
    )?;
    Ok(build_page(decoded, definition_levels, repetition_levels, info.max_definition_level, num_values))
}

fn decode_v2(dph: &DataPageHeaderV2, body: &[u8], uncompressed_size: usize, info: &PageInfo) -> Result<Page> {
    let num_values = dph.num_values as usize;
    let rep_len: usize = dph
        .repetition_levels_byte_length
        .try_into()
        .map_err(|_| oos!("negative repetition_levels_byte_length"))?;
    let def_len: usize = dph
        .definition_levels_byte_length
        .try_into()
        .map_err(|_| oos!("negative definition_levels_byte_length"))?;
    if rep_len + def_len > body.len() {
        return Err(oos!("DATA_PAGE_V2 level section lengths overrun the page body"));
    }
    let rep_bytes = &body[..rep_len];
    let def_bytes = &body[rep_len..rep_len + def_len];
    let values_section = &body[rep_len + def_len..];

    let is_compressed = dph.is_compressed.unwrap_or(true);
    let values_bytes = if is_compressed && !values_section.is_empty() {
        let values_uncompressed_len = uncompressed_size
            .checked_sub(rep_len + def_len)
            .ok_or_else(|| oos!("DATA_PAGE_V2 uncompressed_page_size is smaller than its level sections"))?;
        compression::decompress(info.codec, values_section, values_uncompressed_len)?
    } else {
        values_section.to_vec()
    };

    let repetition_levels = if info.max_repetition_level > 0 {
        let (levels, _) = decode::decode_levels(rep_bytes, info.max_repetition_level, num_values, true)?;
        Some(levels)
    } else {
        if !rep_bytes.is_empty() {
            return Err(oos!("repetition level section present on a column with no repeated ancestors"));
        }
        None
    };

    let definition_levels = if info.max_definition_level > 0 {
        let (levels, _) = decode::decode_levels(def_bytes, info.max_definition_level, num_values, true)?;
        Some(levels)
    } else {
        if !def_bytes.is_empty() {
            return Err(oos!("definition level section present on a column with no optional ancestors"));
        }
        None
    };

    let decoded = decode::decode_values(
        dph.encoding()?,
        info.physical_type,
        info.type_length,
        &values_bytes,
        info.dictionary.as_deref(),
        definition_levels.as_deref(),
        info.max_definition_level,
        num_values,
        true,
    )?;
    Ok(build_page(decoded, definition_levels, repetition_levels, info.max_definition_level, num_values))
}

fn build_page(
    decoded: DecodedValues,
    definition_levels: Option<Vec<i32>>,
    repetition_levels: Option<Vec<i32>>,
    max_definition_level: i16,
    num_values: usize,
) -> Page {
    macro_rules! page {
        ($variant:ident, $values:expr) => {
            Page::$variant(TypedPage {
                values: $values,
                definition_levels,
                repetition_levels,
                max_definition_level,
                num_values,
            })
        };
    }
    match decoded {
        DecodedValues::Int(v) => page!(Int, v),
        DecodedValues::Long(v) => page!(Long, v),
        DecodedValues::Float(v) => page!(Float, v),
        DecodedValues::Double(v) => page!(Double, v),
        DecodedValues::Boolean(v) => page!(Boolean, v),
        DecodedValues::ByteArray(v) => page!(ByteArray, v),
    }
}
