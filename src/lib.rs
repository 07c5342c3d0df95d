#![deny(unsafe_code)]
//! A lazy, concurrent reader for Apache Parquet files: memory-maps each file, scans
//! page headers without decoding page bodies, and decodes/prefetches pages on demand
//! as a consumer walks a projected set of columns.

#[macro_use]
pub mod error;
pub mod assembly_buffer;
pub mod batch;
pub mod column_iterator;
pub mod compression;
pub mod cursor;
pub mod decode;
pub mod encoding;
pub mod file_manager;
pub mod metadata;
pub mod page;
pub mod page_reader;
mod parquet_bridge;
pub mod projection;
pub mod properties;
pub mod record;
pub mod row;
pub mod scanner;
pub mod schema;
mod thrift_bridge;
pub mod types;

pub use error::{Error, Result};
pub use file_manager::FileManager;
pub use projection::Projection;
pub use properties::ReaderProperties;
pub use row::{Decimal, Reader, Row, Struct};

const FOOTER_SIZE: u64 = 8;
const PARQUET_MAGIC: [u8; 4] = [b'P', b'A', b'R', b'1'];
