//! Thrift compact-protocol parsing entry points: the file footer and individual page
//! headers. Both operate directly on byte slices carved out of the file's mmap, since
//! [`crate::file_manager`] never seeks a `File` once it has been mapped.

use crate::error::{oos, Result};
use crate::{FOOTER_SIZE, PARQUET_MAGIC};
use parquet_format_safe::thrift::protocol::TCompactInputProtocol;
use parquet_format_safe::{FileMetaData as TFileMetaData, PageHeader as TPageHeader};
use std::io::Cursor;

/// How many trailing bytes of a file to read speculatively before falling back to a
/// second, metadata-length-sized read. Large enough to cover the footer of the
/// overwhelming majority of files in a single mmap page.
pub const DEFAULT_FOOTER_READ_SIZE: u64 = 64 * 1024;

/// Locates and parses the Thrift-encoded `FileMetaData` footer within a fully mapped
/// file. Returns the parsed metadata and the byte offset at which the footer (the
/// `FileMetaData` struct itself, not the trailing length+magic) begins.
pub fn read_file_metadata(file: &[u8]) -> Result<TFileMetaData> {
    if (file.len() as u64) < FOOTER_SIZE {
        return Err(oos!("file of {} bytes is smaller than the footer", file.len()));
    }
    if file[file.len() - 4..] != PARQUET_MAGIC {
        return Err(oos!("missing PAR1 magic at the end of the file"));
    }
    let footer_len =
        i32::from_le_bytes(file[file.len() - 8..file.len() - 4].try_into().unwrap());
    if footer_len < 0 {
        return Err(oos!("negative footer length"));
    }
    let footer_len = footer_len as u64;
    if footer_len + FOOTER_SIZE > file.len() as u64 {
        return Err(oos!(
            "footer length {} makes the metadata start before the beginning of the file",
            footer_len
        ));
    }
    let metadata_start = file.len() - FOOTER_SIZE as usize - footer_len as usize;
    let metadata_bytes = &file[metadata_start..file.len() - FOOTER_SIZE as usize];

    let mut protocol = TCompactInputProtocol::new(Cursor::new(metadata_bytes));
    Ok(TFileMetaData::read_from_in_protocol(&mut protocol)?)
}

/// Parses a single page header out of `bytes` (the start of a page: header followed
/// by its compressed body). Returns the header and the number of bytes it occupied,
/// so the caller can locate the page body right after it.
pub fn read_page_header(bytes: &[u8]) -> Result<(TPageHeader, usize)> {
    let mut cursor = Cursor::new(bytes);
    let header = {
        let mut protocol = TCompactInputProtocol::new(&mut cursor);
        TPageHeader::read_from_in_protocol(&mut protocol)?
    };
    let consumed = cursor.position() as usize;
    Ok((header, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_files_without_magic() {
        let mut bytes = vec![0u8; 64];
        bytes[60..64].copy_from_slice(b"PAR1");
        bytes[56..60].copy_from_slice(&0i32.to_le_bytes());
        // corrupt the magic
        bytes[63] = b'X';
        assert!(read_file_metadata(&bytes).is_err());
    }

    #[test]
    fn rejects_truncated_files() {
        let bytes = vec![0u8; 4];
        assert!(read_file_metadata(&bytes).is_err());
    }
}
