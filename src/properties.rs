//! Tunables for the concurrent reader: how aggressively it prefetches pages ahead of
//! the consumer, and how it sizes its internal buffers.

/// Configuration shared by every [`crate::cursor::PageCursor`] a
/// [`crate::file_manager::FileManager`] opens.
#[derive(Debug, Clone, Copy)]
pub struct ReaderProperties {
    /// The prefetch queue starts at this many pages decoded ahead of the consumer.
    pub initial_prefetch_depth: usize,
    /// The prefetch queue grows to this many pages ahead when the consumer is
    /// consistently waiting on decode (i.e. decode is the bottleneck, not I/O).
    pub max_prefetch_depth: usize,
    /// The number of record batches the assembly buffer is allowed to hold before
    /// the producer blocks.
    pub assembly_queue_capacity: usize,
    /// The number of rows assembled into a single batch handed to the consumer.
    pub batch_size: usize,
}

impl Default for ReaderProperties {
    fn default() -> Self {
        ReaderProperties {
            initial_prefetch_depth: 4,
            max_prefetch_depth: 8,
            assembly_queue_capacity: 4,
            batch_size: 1024,
        }
    }
}

impl ReaderProperties {
    pub fn builder() -> ReaderPropertiesBuilder {
        ReaderPropertiesBuilder::default()
    }
}

/// Builds a [`ReaderProperties`], defaulting every field a caller doesn't set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderPropertiesBuilder {
    properties: OptionalReaderProperties,
}

#[derive(Debug, Clone, Copy, Default)]
struct OptionalReaderProperties {
    initial_prefetch_depth: Option<usize>,
    max_prefetch_depth: Option<usize>,
    assembly_queue_capacity: Option<usize>,
    batch_size: Option<usize>,
}

impl ReaderPropertiesBuilder {
    pub fn initial_prefetch_depth(mut self, value: usize) -> Self {
        self.properties.initial_prefetch_depth = Some(value);
        self
    }

    pub fn max_prefetch_depth(mut self, value: usize) -> Self {
        self.properties.max_prefetch_depth = Some(value);
        self
    }

    pub fn assembly_queue_capacity(mut self, value: usize) -> Self {
        self.properties.assembly_queue_capacity = Some(value);
        self
    }

    pub fn batch_size(mut self, value: usize) -> Self {
        self.properties.batch_size = Some(value);
        self
    }

    pub fn build(self) -> ReaderProperties {
        let defaults = ReaderProperties::default();
        ReaderProperties {
            initial_prefetch_depth: self.properties.initial_prefetch_depth.unwrap_or(defaults.initial_prefetch_depth),
            max_prefetch_depth: self.properties.max_prefetch_depth.unwrap_or(defaults.max_prefetch_depth),
            assembly_queue_capacity: self
                .properties
                .assembly_queue_capacity
                .unwrap_or(defaults.assembly_queue_capacity),
            batch_size: self.properties.batch_size.unwrap_or(defaults.batch_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_only_set_fields() {
        let properties = ReaderProperties::builder().max_prefetch_depth(16).build();
        assert_eq!(properties.max_prefetch_depth, 16);
        assert_eq!(properties.initial_prefetch_depth, 4);
    }
}
