//! A synchronous, typed, row-oriented view over assembled records: pulls decoded
//! files off an [`AssemblyBuffer`] and hands them out one record at a time.

mod accessors;

pub use accessors::{Decimal, Struct};

use crate::assembly_buffer::AssemblyBuffer;
use crate::error::Result;
use crate::file_manager::FileManager;
use crate::projection::Projection;
use crate::properties::ReaderProperties;
use crate::record::{self, Value};
use crate::schema::{ColumnDescriptor, SchemaTree};
use std::path::PathBuf;
use std::sync::Arc;

/// One assembled record, with typed accessors for its top-level fields.
#[derive(Debug, Clone)]
pub struct Row {
    schema: Arc<SchemaTree>,
    fields: Vec<(String, Value)>,
}

impl Row {
    pub(crate) fn new(schema: Arc<SchemaTree>, fields: Vec<(String, Value)>) -> Self {
        Row { schema, fields }
    }

    /// The raw assembled value for `name`, or `None` if it wasn't projected into this row.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// The column descriptor for top-level field `name`, if it exists in the file
    /// schema (regardless of whether it was projected into this row).
    fn schema_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.schema.column(name)
    }
}

/// Opens one or more Parquet files and iterates their rows, in file order.
///
/// Internally owns a small multi-threaded Tokio runtime driving the concurrent
/// [`FileManager`]/[`crate::cursor::PageCursor`] prefetch pipeline; the iterator
/// itself is a plain blocking `Iterator`, so callers don't need their own async
/// runtime.
pub struct Reader {
    // never read directly; its worker threads back `buffer`'s production task for
    // as long as the reader (and thus this field) is alive.
    _runtime: tokio::runtime::Runtime,
    buffer: AssemblyBuffer,
    pending: std::vec::IntoIter<Row>,
    done: bool,
}

impl Reader {
    /// Opens `paths` for a projected read. Files are opened lazily, one at a time,
    /// with the next file prefetched in the background as described in
    /// [`FileManager`].
    pub fn open(paths: Vec<PathBuf>, projection: Projection, properties: ReaderProperties) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(crate::error::Error::Io)?;
        let manager = Arc::new(FileManager::new(paths, properties, projection.clone()));
        let buffer = AssemblyBuffer::spawn(manager, projection, runtime.handle());
        Ok(Reader {
            _runtime: runtime,
            buffer,
            pending: Vec::new().into_iter(),
            done: false,
        })
    }

    /// Convenience constructor using [`ReaderProperties::default`] and [`Projection::All`].
    pub fn open_all(paths: Vec<PathBuf>) -> Result<Self> {
        Self::open(paths, Projection::All, ReaderProperties::default())
    }
}

impl Iterator for Reader {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.pending.next() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }
            let file_records = match self.buffer.recv() {
                Some(result) => result,
                None => {
                    self.done = true;
                    return None;
                }
            };
            let file_records = match file_records {
                Ok(fr) => fr,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            let schema = Arc::new(file_records.schema);
            let records = match record::assemble_records(&schema, &file_records.columns) {
                Ok(r) => r,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            let rows: Vec<Row> = records.into_iter().map(|fields| Row::new(schema.clone(), fields)).collect();
            self.pending = rows.into_iter();
        }
    }
}
