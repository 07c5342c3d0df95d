//! File-level metadata: the parsed footer (`FileMetaData`), row groups and column
//! chunks, bridged from the Thrift structs `parquet-format-safe` generates from
//! `parquet.thrift` into the crate's own enums and descriptors.

use crate::error::{oos, Result};
use crate::parquet_bridge::{Compression, Encoding};
use crate::schema::{ColumnDescriptor, PhysicalType, SchemaTree};
use parquet_format_safe::{
    ColumnChunk, ColumnMetaData as TColumnMetaData, FileMetaData as TFileMetaData, KeyValue,
    RowGroup as TRowGroup, Statistics as TStatistics,
};
use std::convert::TryFrom;

/// Column-level min/max/null-count summary. Carried through for completeness; this
/// crate does not use statistics to skip pages or row groups.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
    pub min_value: Option<Vec<u8>>,
    pub max_value: Option<Vec<u8>>,
}

impl From<TStatistics> for Statistics {
    fn from(s: TStatistics) -> Self {
        Statistics {
            null_count: s.null_count,
            distinct_count: s.distinct_count,
            min_value: s.min_value.or(s.min),
            max_value: s.max_value.or(s.max),
        }
    }
}

/// The parsed `ColumnMetaData` of a single column chunk.
#[derive(Debug, Clone)]
pub struct ColumnMetaData {
    pub encodings: Vec<Encoding>,
    pub codec: Compression,
    pub num_values: i64,
    pub total_uncompressed_size: i64,
    pub total_compressed_size: i64,
    pub data_page_offset: i64,
    pub dictionary_page_offset: Option<i64>,
    pub statistics: Option<Statistics>,
}

impl ColumnMetaData {
    fn try_from_thrift(meta: TColumnMetaData) -> Result<Self> {
        let encodings = meta
            .encodings
            .into_iter()
            .map(Encoding::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(ColumnMetaData {
            encodings,
            codec: Compression::try_from(meta.codec)?,
            num_values: meta.num_values,
            total_uncompressed_size: meta.total_uncompressed_size,
            total_compressed_size: meta.total_compressed_size,
            data_page_offset: meta.data_page_offset,
            dictionary_page_offset: meta.dictionary_page_offset,
            statistics: meta.statistics.map(Statistics::from),
        })
    }
}

/// A single column chunk: its descriptor (shared schema information) plus the
/// chunk-specific metadata needed to scan it.
#[derive(Debug, Clone)]
pub struct ColumnChunkMetaData {
    pub file_path: Option<String>,
    pub column: ColumnDescriptor,
    pub meta_data: ColumnMetaData,
}

impl ColumnChunkMetaData {
    fn try_from_thrift(chunk: ColumnChunk, column: ColumnDescriptor) -> Result<Self> {
        let meta_data = chunk
            .meta_data
            .ok_or_else(|| oos!("column chunk '{}' is missing its metadata", column.name()))?;
        Ok(ColumnChunkMetaData {
            file_path: chunk.file_path,
            column,
            meta_data: ColumnMetaData::try_from_thrift(meta_data)?,
        })
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.column.physical_type
    }

    /// The byte range, within the file, that the dictionary page (if any) and data
    /// pages of this chunk occupy.
    pub fn byte_range(&self) -> (u64, u64) {
        let start = self
            .meta_data
            .dictionary_page_offset
            .filter(|&o| o > 0)
            .unwrap_or(self.meta_data.data_page_offset) as u64;
        (start, start + self.meta_data.total_compressed_size as u64)
    }
}

/// A row group: its column chunks plus the row count shared across all of them.
#[derive(Debug, Clone)]
pub struct RowGroupMetaData {
    pub columns: Vec<ColumnChunkMetaData>,
    pub num_rows: i64,
    pub total_byte_size: i64,
}

impl RowGroupMetaData {
    fn try_from_thrift(schema: &SchemaTree, row_group: TRowGroup) -> Result<Self> {
        if row_group.columns.len() != schema.leaves.len() {
            return Err(oos!(
                "row group has {} columns but the schema has {} leaves",
                row_group.columns.len(),
                schema.leaves.len()
            ));
        }
        let columns = row_group
            .columns
            .into_iter()
            .zip(schema.leaves.iter().cloned())
            .map(|(chunk, column)| ColumnChunkMetaData::try_from_thrift(chunk, column))
            .collect::<Result<Vec<_>>>()?;
        Ok(RowGroupMetaData {
            columns,
            num_rows: row_group.num_rows,
            total_byte_size: row_group.total_byte_size,
        })
    }

    pub fn column(&self, path: &str) -> Option<&ColumnChunkMetaData> {
        self.columns.iter().find(|c| c.column.path_in_schema.join(".") == path)
    }
}

/// The fully parsed contents of a Parquet file's footer.
#[derive(Debug, Clone)]
pub struct FileMetaData {
    pub version: i32,
    pub num_rows: i64,
    pub created_by: Option<String>,
    pub key_value_metadata: Vec<(String, Option<String>)>,
    pub schema: SchemaTree,
    pub row_groups: Vec<RowGroupMetaData>,
}

impl FileMetaData {
    pub fn try_from_thrift(meta: TFileMetaData) -> Result<Self> {
        let schema = SchemaTree::try_from_thrift(&meta.schema)?;
        let row_groups = meta
            .row_groups
            .into_iter()
            .map(|rg| RowGroupMetaData::try_from_thrift(&schema, rg))
            .collect::<Result<Vec<_>>>()?;
        let key_value_metadata = meta
            .key_value_metadata
            .unwrap_or_default()
            .into_iter()
            .map(|KeyValue { key, value }| (key, value))
            .collect();
        Ok(FileMetaData {
            version: meta.version,
            num_rows: meta.num_rows,
            created_by: meta.created_by,
            key_value_metadata,
            schema,
            row_groups,
        })
    }
}
