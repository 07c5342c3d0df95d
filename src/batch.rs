//! Fixed-size groups of consecutive rows for one column, produced by
//! [`crate::column_iterator::ColumnIterator`] from a stream of decoded
//! [`crate::page::Page`]s. Two flavors, chosen by whether the column has any
//! repeated ancestor: [`FlatBatch`] for `max_repetition_level == 0`, [`NestedBatch`]
//! otherwise.

/// A column's decoded values for one batch, tagged by physical type. Reuses the
/// same per-type shape [`crate::decode::DecodedValues`] uses for a single page;
/// a batch is simply those values concatenated across however many pages it took
/// to fill it.
pub use crate::decode::DecodedValues as BatchValues;

/// A batch of up to `record_count` rows for a column with no repeated ancestors:
/// one value (or null) per row, in row order.
#[derive(Debug, Clone)]
pub struct FlatBatch {
    pub values: BatchValues,
    /// `nulls[i]` is `true` iff row `i`'s definition level was below the column's
    /// `max_definition_level`. Absent when the column is fully required
    /// (`max_definition_level == 0`), in which case every row is non-null.
    pub nulls: Option<Vec<bool>>,
    pub record_count: usize,
}

impl FlatBatch {
    pub fn is_null(&self, row: usize) -> bool {
        self.nulls.as_ref().map(|n| n[row]).unwrap_or(false)
    }
}

/// A batch of up to `record_count` rows for a column with at least one repeated
/// ancestor: each row may contribute zero or more values, delimited by
/// `record_offsets`.
#[derive(Debug, Clone)]
pub struct NestedBatch {
    pub values: BatchValues,
    pub definition_levels: Vec<i32>,
    pub repetition_levels: Vec<i32>,
    /// `record_offsets[i]` is the index into `values` (and the level vectors)
    /// where record `i` begins; `record_offsets` carries `record_count + 1`
    /// entries, the last being the total value count (so record `i`'s values
    /// span `record_offsets[i]..record_offsets[i + 1]`).
    pub record_offsets: Vec<usize>,
    pub max_definition_level: i16,
    pub record_count: usize,
}

impl NestedBatch {
    /// The half-open range of `values`/level indices belonging to row `i`.
    pub fn record_range(&self, row: usize) -> std::ops::Range<usize> {
        self.record_offsets[row]..self.record_offsets[row + 1]
    }
}

/// One column's decoded batch: flat or nested, depending on its schema shape.
#[derive(Debug, Clone)]
pub enum ColumnBatch {
    Flat(FlatBatch),
    Nested(NestedBatch),
}

impl ColumnBatch {
    pub fn record_count(&self) -> usize {
        match self {
            ColumnBatch::Flat(b) => b.record_count,
            ColumnBatch::Nested(b) => b.record_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}
