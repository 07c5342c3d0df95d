//! Walks a column chunk's byte range page-by-page, parsing just the Thrift page
//! headers (never the compressed bodies) to build the list of [`PageInfo`] handles a
//! [`crate::cursor::PageCursor`] will later decode on demand.

use crate::error::{oos, Error, Result};
use crate::metadata::ColumnChunkMetaData;
use crate::page::{Dictionary, MappedBuffer, PageInfo};
use crate::parquet_bridge::DataPageHeaderExt;
use crate::{compression, thrift_bridge};
use parquet_format_safe::PageType;
use std::sync::Arc;

/// Column chunks whose uncompressed size exceeds this are rejected outright, rather
/// than decoded into an array no in-memory representation can safely hold. Mirrors
/// the JVM array-length limit the original Java implementation inherited.
const MAX_UNCOMPRESSED_CHUNK_SIZE: i64 = i32::MAX as i64;

/// The result of scanning one column chunk: every data page's location, and the
/// chunk's dictionary (if any), decoded once up front.
pub struct ScannedChunk {
    pub pages: Vec<PageInfo>,
    pub dictionary: Option<Arc<Dictionary>>,
}

/// Scans `column`'s byte range within `mapping`, producing a [`PageInfo`] for every
/// data page and eagerly decoding the dictionary page, if present.
pub fn scan_column_chunk(mapping: &MappedBuffer, column: &ColumnChunkMetaData) -> Result<ScannedChunk> {
    let meta = &column.meta_data;
    if meta.total_uncompressed_size > MAX_UNCOMPRESSED_CHUNK_SIZE {
        return Err(Error::SizeLimitExceeded {
            limit: MAX_UNCOMPRESSED_CHUNK_SIZE as usize,
            requested: meta.total_uncompressed_size as usize,
        });
    }
    let (start, chunk_end) = column.byte_range();
    let (mut position, chunk_end) = (start as usize, chunk_end as usize);
    let file_len = mapping.bytes().len();
    if chunk_end > file_len {
        return Err(oos!(
            "column chunk '{}' extends past the end of the file",
            column.column.name()
        ));
    }

    let mut dictionary: Option<Arc<Dictionary>> = None;
    let mut pages = Vec::new();
    let mut values_seen: i64 = 0;

    while values_seen < meta.num_values && position < chunk_end {
        let header_window = &mapping.bytes()[position..chunk_end];
        let (header, header_size) = thrift_bridge::read_page_header(header_window)?;
        let compressed_size: usize = header
            .compressed_page_size
            .try_into()
            .map_err(|_| oos!("negative compressed_page_size"))?;
        let total = header_size + compressed_size;
        if position + total > chunk_end {
            return Err(oos!(
                "page at offset {} overruns its column chunk's byte range",
                position
            ));
        }

        match header.type_ {
            PageType::DICTIONARY_PAGE => {
                let dph = header
                    .dictionary_page_header
                    .as_ref()
                    .ok_or_else(|| oos!("DICTIONARY_PAGE header is missing dictionary_page_header"))?;
                let body = &mapping.bytes()[position + header_size..position + total];
                let uncompressed_size: usize = header
                    .uncompressed_page_size
                    .try_into()
                    .map_err(|_| oos!("negative uncompressed_page_size"))?;
                let decompressed = compression::decompress(meta.codec, body, uncompressed_size)?;
                let num_values: usize = dph
                    .num_values
                    .try_into()
                    .map_err(|_| oos!("negative dictionary num_values"))?;
                dictionary = Some(Arc::new(Dictionary::try_new(
                    column.physical_type(),
                    &decompressed,
                    num_values,
                )?));
            }
            PageType::DATA_PAGE | PageType::DATA_PAGE_V2 => {
                let (num_values_in_page, encoding) = match header.type_ {
                    PageType::DATA_PAGE => {
                        let dph = header
                            .data_page_header
                            .as_ref()
                            .ok_or_else(|| oos!("DATA_PAGE header is missing data_page_header"))?;
                        (dph.num_values as i64, dph.encoding()?)
                    }
                    _ => {
                        let dph = header
                            .data_page_header_v2
                            .as_ref()
                            .ok_or_else(|| oos!("DATA_PAGE_V2 header is missing data_page_header_v2"))?;
                        (dph.num_values as i64, dph.encoding()?)
                    }
                };

                let is_dictionary_encoded = matches!(
                    encoding,
                    crate::parquet_bridge::Encoding::PlainDictionary | crate::parquet_bridge::Encoding::RleDictionary
                );
                if is_dictionary_encoded && dictionary.is_none() {
                    return Err(oos!(
                        "column '{}' has a dictionary-encoded data page before any dictionary page",
                        column.column.name()
                    ));
                }

                pages.push(PageInfo {
                    mapping: mapping.clone(),
                    start: position,
                    end: position + total,
                    physical_type: column.physical_type(),
                    type_length: match column.column.physical_type {
                        crate::schema::PhysicalType::FixedLenByteArray(len) => Some(len),
                        _ => None,
                    },
                    codec: meta.codec,
                    max_definition_level: column.column.max_definition_level,
                    max_repetition_level: column.column.max_repetition_level,
                    dictionary: dictionary.clone(),
                });
                values_seen += num_values_in_page;
            }
            // column/offset index pages are out of scope; skip over them.
            _ => {}
        }
        position += total;
    }

    Ok(ScannedChunk { pages, dictionary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ColumnMetaData;
    use crate::parquet_bridge::{Compression, Repetition};
    use crate::schema::{ColumnDescriptor, PhysicalType};

    fn chunk_with_uncompressed_size(size: i64) -> ColumnChunkMetaData {
        ColumnChunkMetaData {
            file_path: None,
            column: ColumnDescriptor {
                path_in_schema: vec!["x".to_string()],
                physical_type: PhysicalType::Int32,
                logical_type: None,
                repetition: Repetition::Required,
                max_definition_level: 0,
                max_repetition_level: 0,
            },
            meta_data: ColumnMetaData {
                encodings: vec![],
                codec: Compression::Uncompressed,
                num_values: 0,
                total_uncompressed_size: size,
                total_compressed_size: 0,
                data_page_offset: 0,
                dictionary_page_offset: None,
                statistics: None,
            },
        }
    }

    #[test]
    fn chunk_over_the_size_limit_is_rejected_before_scanning() {
        let mapping = MappedBuffer::new(Vec::new());
        let chunk = chunk_with_uncompressed_size(i32::MAX as i64 + 1);
        let err = scan_column_chunk(&mapping, &chunk).unwrap_err();
        assert!(matches!(err, Error::SizeLimitExceeded { .. }));
    }

    #[test]
    fn chunk_at_the_size_limit_is_not_rejected_on_size_alone() {
        let mapping = MappedBuffer::new(Vec::new());
        let chunk = chunk_with_uncompressed_size(i32::MAX as i64);
        // an empty chunk (num_values 0) scans to completion with no pages; the point
        // of this test is only that it does not fail with SizeLimitExceeded.
        match scan_column_chunk(&mapping, &chunk) {
            Err(Error::SizeLimitExceeded { .. }) => panic!("limit-sized chunk was rejected"),
            _ => {}
        }
    }
}
