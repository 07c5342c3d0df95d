//! Pulls decoded pages for one projected column off its [`PageCursor`] and packs
//! their values into fixed-size [`ColumnBatch`]es: [`FlatBatch`] for a column with no
//! repeated ancestors, [`NestedBatch`] otherwise, chosen once from the column's
//! `max_repetition_level`.

use crate::batch::{BatchValues, ColumnBatch, FlatBatch, NestedBatch};
use crate::cursor::PageCursor;
use crate::error::{oos, Result};
use crate::page::Page;
use crate::schema::ColumnDescriptor;

/// Appends `page`'s values in `range` onto `values`, which must already be the
/// matching physical-type variant (every page read through one [`ColumnIterator`]
/// shares its column's physical type).
fn extend_values(values: &mut BatchValues, page: &Page, range: std::ops::Range<usize>) -> Result<()> {
    match (values, page) {
        (BatchValues::Int(v), Page::Int(p)) => v.extend_from_slice(&p.values[range]),
        (BatchValues::Long(v), Page::Long(p)) => v.extend_from_slice(&p.values[range]),
        (BatchValues::Float(v), Page::Float(p)) => v.extend_from_slice(&p.values[range]),
        (BatchValues::Double(v), Page::Double(p)) => v.extend_from_slice(&p.values[range]),
        (BatchValues::Boolean(v), Page::Boolean(p)) => v.extend_from_slice(&p.values[range]),
        (BatchValues::ByteArray(v), Page::ByteArray(p)) => v.extend_from_slice(&p.values[range]),
        _ => return Err(oos!("column iterator encountered a page of an unexpected physical type")),
    }
    Ok(())
}

fn push_value(values: &mut BatchValues, page: &Page, index: usize) -> Result<()> {
    match (values, page) {
        (BatchValues::Int(v), Page::Int(p)) => v.push(p.values[index]),
        (BatchValues::Long(v), Page::Long(p)) => v.push(p.values[index]),
        (BatchValues::Float(v), Page::Float(p)) => v.push(p.values[index]),
        (BatchValues::Double(v), Page::Double(p)) => v.push(p.values[index]),
        (BatchValues::Boolean(v), Page::Boolean(p)) => v.push(p.values[index]),
        (BatchValues::ByteArray(v), Page::ByteArray(p)) => v.push(p.values[index].clone()),
        _ => return Err(oos!("column iterator encountered a page of an unexpected physical type")),
    }
    Ok(())
}

/// One column's decode-ahead page stream, repackaged into row batches.
pub struct ColumnIterator {
    column: ColumnDescriptor,
    cursor: PageCursor,
    current_page: Option<Page>,
    page_pos: usize,
}

impl ColumnIterator {
    pub fn new(column: ColumnDescriptor, cursor: PageCursor) -> Self {
        ColumnIterator {
            column,
            cursor,
            current_page: None,
            page_pos: 0,
        }
    }

    pub fn column(&self) -> &ColumnDescriptor {
        &self.column
    }

    /// Makes sure `current_page` holds a page with at least one unread value,
    /// pulling the next one off the cursor if needed. Returns `false` once the
    /// column is fully drained.
    async fn ensure_current_page(&mut self) -> Result<bool> {
        if self.current_page.is_none() {
            match self.cursor.next_page().await {
                Some(Ok(page)) => {
                    self.current_page = Some(page);
                    self.page_pos = 0;
                }
                Some(Err(e)) => return Err(e),
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Produces the next batch of up to `max_records` rows, or a batch with
    /// `record_count == 0` once every page has been consumed.
    pub async fn next_batch(&mut self, max_records: usize) -> Result<ColumnBatch> {
        if self.column.max_repetition_level == 0 {
            self.next_flat_batch(max_records).await
        } else {
            self.next_nested_batch(max_records).await
        }
    }

    async fn next_flat_batch(&mut self, max_records: usize) -> Result<ColumnBatch> {
        let max_def = self.column.max_definition_level;
        let mut values = BatchValues::empty_of(self.column.physical_type);
        let mut nulls: Option<Vec<bool>> = (max_def > 0).then(|| Vec::with_capacity(max_records));
        let mut copied = 0;

        while copied < max_records {
            if !self.ensure_current_page().await? {
                break;
            }
            let page = self.current_page.as_ref().unwrap();
            let page_len = page.num_values();
            let to_copy = (page_len - self.page_pos).min(max_records - copied);

            let range = self.page_pos..self.page_pos + to_copy;
            extend_values(&mut values, page, range.clone())?;
            if let Some(bitset) = nulls.as_mut() {
                match page.definition_levels() {
                    Some(defs) => bitset.extend(defs[range].iter().map(|&d| d < max_def as i32)),
                    None => bitset.extend(std::iter::repeat(false).take(to_copy)),
                }
            }

            self.page_pos += to_copy;
            copied += to_copy;
            if self.page_pos >= page_len {
                self.current_page = None;
            }
        }

        Ok(ColumnBatch::Flat(FlatBatch {
            values,
            nulls,
            record_count: copied,
        }))
    }

    /// Records are delimited by `repetition_level == 0`: a record consumes every
    /// value up to (but not including) the next value whose repetition level is 0.
    async fn next_nested_batch(&mut self, max_records: usize) -> Result<ColumnBatch> {
        let max_def = self.column.max_definition_level;
        let mut values = BatchValues::empty_of(self.column.physical_type);
        let mut definition_levels = Vec::new();
        let mut repetition_levels = Vec::new();
        let mut record_offsets = vec![0usize];
        let mut total = 0usize;
        let mut records = 0usize;

        while records < max_records {
            let mut started = false;
            loop {
                if !self.ensure_current_page().await? {
                    break;
                }
                let (rep, def) = {
                    let page = self.current_page.as_ref().unwrap();
                    let rep = page.repetition_levels().map(|r| r[self.page_pos]).unwrap_or(0);
                    let def = page.definition_levels().map(|d| d[self.page_pos]).unwrap_or(max_def as i32);
                    (rep, def)
                };
                if started && rep == 0 {
                    // this value belongs to the next record; leave it for the next pass.
                    break;
                }

                let page = self.current_page.as_ref().unwrap();
                push_value(&mut values, page, self.page_pos)?;
                definition_levels.push(def);
                repetition_levels.push(rep);
                total += 1;
                started = true;

                self.page_pos += 1;
                if self.page_pos >= page.num_values() {
                    self.current_page = None;
                }
            }
            if !started {
                break;
            }
            records += 1;
            record_offsets.push(total);
        }

        Ok(ColumnBatch::Nested(NestedBatch {
            values,
            definition_levels,
            repetition_levels,
            record_offsets,
            max_definition_level: max_def,
            record_count: records,
        }))
    }

    /// Drains every remaining row into batches of at most `batch_capacity` records.
    pub async fn drain(mut self, batch_capacity: usize) -> Result<Vec<ColumnBatch>> {
        let mut batches = Vec::new();
        loop {
            let batch = self.next_batch(batch_capacity).await?;
            if batch.is_empty() {
                break;
            }
            batches.push(batch);
        }
        Ok(batches)
    }

    /// Drains every remaining page without repacking it into batches, for consumers
    /// (the whole-file record assembler) that walk pages directly rather than through
    /// the batch API.
    pub async fn drain_pages(mut self) -> Result<Vec<Page>> {
        let mut pages = Vec::new();
        if let Some(page) = self.current_page.take() {
            pages.push(page);
        }
        while let Some(page) = self.cursor.next_page().await {
            pages.push(page?);
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::TypedPage;
    use crate::parquet_bridge::Repetition;
    use crate::properties::ReaderProperties;

    fn flat_column() -> ColumnDescriptor {
        ColumnDescriptor {
            path_in_schema: vec!["id".to_string()],
            physical_type: crate::schema::PhysicalType::Int32,
            logical_type: None,
            repetition: Repetition::Required,
            max_definition_level: 0,
            max_repetition_level: 0,
        }
    }

    fn nested_column() -> ColumnDescriptor {
        ColumnDescriptor {
            path_in_schema: vec!["tags".to_string()],
            physical_type: crate::schema::PhysicalType::Int32,
            logical_type: None,
            repetition: Repetition::Repeated,
            max_definition_level: 1,
            max_repetition_level: 1,
        }
    }

    fn cursor_over(pages: Vec<Page>) -> PageCursor {
        // PageCursor decodes PageInfo handles, not Pages directly; tests exercise
        // ColumnIterator's batching logic against pre-decoded pages via a trivial
        // cursor-shaped wrapper instead of a real file, so construct batches
        // directly from the iterator's internal helpers.
        let _ = pages;
        PageCursor::new(vec![], ReaderProperties::default())
    }

    #[tokio::test]
    async fn flat_batch_stops_at_max_records_and_marks_nulls() {
        let mut iterator = ColumnIterator::new(flat_column(), cursor_over(vec![]));
        // simulate a single already-available page without going through the cursor
        iterator.current_page = Some(Page::Int(TypedPage {
            values: vec![1, 2, 3],
            definition_levels: None,
            repetition_levels: None,
            max_definition_level: 0,
            num_values: 3,
        }));
        let batch = iterator.next_batch(2).await.unwrap();
        match batch {
            ColumnBatch::Flat(b) => {
                assert_eq!(b.record_count, 2);
                match b.values {
                    BatchValues::Int(v) => assert_eq!(v, vec![1, 2]),
                    _ => panic!("wrong variant"),
                }
                assert!(b.nulls.is_none());
            }
            _ => panic!("expected a flat batch"),
        }
        // the third value remains for the next batch
        let batch = iterator.next_batch(2).await.unwrap();
        match batch {
            ColumnBatch::Flat(b) => {
                assert_eq!(b.record_count, 1);
                match b.values {
                    BatchValues::Int(v) => assert_eq!(v, vec![3]),
                    _ => panic!("wrong variant"),
                }
            }
            _ => panic!("expected a flat batch"),
        }
    }

    #[tokio::test]
    async fn nested_batch_splits_on_repetition_level_zero() {
        let mut iterator = ColumnIterator::new(nested_column(), cursor_over(vec![]));
        // record 0: [1, 2]; record 1: [3]
        iterator.current_page = Some(Page::Int(TypedPage {
            values: vec![1, 2, 3],
            definition_levels: Some(vec![1, 1, 1]),
            repetition_levels: Some(vec![0, 1, 0]),
            max_definition_level: 1,
            num_values: 3,
        }));
        let batch = iterator.next_batch(10).await.unwrap();
        match batch {
            ColumnBatch::Nested(b) => {
                assert_eq!(b.record_count, 2);
                assert_eq!(b.record_offsets, vec![0, 2, 3]);
                match b.values {
                    BatchValues::Int(v) => assert_eq!(v, vec![1, 2, 3]),
                    _ => panic!("wrong variant"),
                }
            }
            _ => panic!("expected a nested batch"),
        }
    }
}
