//! Bridges the async file/page pipeline to a synchronous consumer: a background task
//! walks the file list, fully decoding each file's projected columns, and hands the
//! result to the caller through a bounded [`std::sync::mpsc`] channel. The channel's
//! capacity (`ReaderProperties::assembly_queue_capacity`) is the number of files the
//! producer is allowed to read ahead of whichever one the consumer is assembling.

use crate::column_iterator::ColumnIterator;
use crate::cursor::PageCursor;
use crate::error::{oos, Result};
use crate::file_manager::FileManager;
use crate::page::Page;
use crate::projection::Projection;
use crate::schema::SchemaTree;
use std::collections::HashMap;
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Arc;

/// One file's fully decoded, projected columns, ready for record assembly.
pub struct FileRecords {
    pub file_index: usize,
    pub schema: SchemaTree,
    pub columns: HashMap<String, Vec<Page>>,
}

/// Drives the background production task and exposes its output as a blocking
/// iterator-like `recv`.
pub struct AssemblyBuffer {
    receiver: Receiver<Result<FileRecords>>,
}

impl AssemblyBuffer {
    /// Spawns the production task on `runtime` and returns the consumer handle.
    pub fn spawn(manager: Arc<FileManager>, projection: Projection, runtime: &tokio::runtime::Handle) -> Self {
        let capacity = manager.properties().assembly_queue_capacity.max(1);
        let (sender, receiver) = sync_channel(capacity);
        let file_count = manager.len();
        runtime.spawn(async move {
            for index in 0..file_count {
                let result = produce_one(&manager, index, &projection).await;
                if sender.send(result).is_err() {
                    // consumer dropped the receiver; stop reading ahead.
                    break;
                }
            }
        });
        AssemblyBuffer { receiver }
    }

    /// Blocks for the next file's decoded columns, or returns `None` once every file
    /// has been produced.
    pub fn recv(&self) -> Option<Result<FileRecords>> {
        self.receiver.recv().ok()
    }
}

async fn produce_one(manager: &Arc<FileManager>, index: usize, projection: &Projection) -> Result<FileRecords> {
    let opened = manager.open_projected(index, projection).await?;
    let schema = opened.file.metadata.schema.clone();
    let properties = manager.properties();

    let mut columns = HashMap::with_capacity(opened.columns.len());
    for (path, pages) in opened.columns {
        let descriptor = schema
            .column(&path)
            .cloned()
            .ok_or_else(|| oos!("projected column '{}' is missing from its own file's schema", path))?;
        let cursor = PageCursor::new(pages, properties);
        let iterator = ColumnIterator::new(descriptor, cursor);
        columns.insert(path, iterator.drain_pages().await?);
    }

    Ok(FileRecords { file_index: index, schema, columns })
}
