//! Decompression codecs for column chunk data, behind a single
//! `decompress(codec, src, uncompressed_size) -> bytes` contract. Each non-trivial
//! codec lives behind its own Cargo feature so a consumer only pulls in the crates it
//! needs.

pub use crate::parquet_bridge::Compression;
use crate::error::{unsupported, Result};

/// Decompresses `src`, which is known to expand to exactly `uncompressed_size` bytes,
/// using `codec`. `Compression::Uncompressed` is a no-op copy.
pub fn decompress(codec: Compression, src: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
    Ok(match codec {
        Compression::Uncompressed => src.to_vec(),
        #[cfg(feature = "snappy")]
        Compression::Snappy => snappy::decompress(src, uncompressed_size)?,
        #[cfg(not(feature = "snappy"))]
        Compression::Snappy => return Err(unsupported!("snappy support is not compiled in")),
        #[cfg(any(feature = "gzip", feature = "gzip_zlib_ng"))]
        Compression::Gzip => gzip::decompress(src, uncompressed_size)?,
        #[cfg(not(any(feature = "gzip", feature = "gzip_zlib_ng")))]
        Compression::Gzip => return Err(unsupported!("gzip support is not compiled in")),
        #[cfg(feature = "brotli")]
        Compression::Brotli => brotli_codec::decompress(src, uncompressed_size)?,
        #[cfg(not(feature = "brotli"))]
        Compression::Brotli => return Err(unsupported!("brotli support is not compiled in")),
        #[cfg(feature = "zstd")]
        Compression::Zstd => zstd_codec::decompress(src, uncompressed_size)?,
        #[cfg(not(feature = "zstd"))]
        Compression::Zstd => return Err(unsupported!("zstd support is not compiled in")),
        #[cfg(feature = "lz4")]
        Compression::Lz4Raw => lz4_codec::decompress(src, uncompressed_size)?,
        #[cfg(not(feature = "lz4"))]
        Compression::Lz4Raw => return Err(unsupported!("lz4 support is not compiled in")),
        Compression::Lzo => return Err(unsupported!("LZO is not implemented")),
        Compression::Lz4 => {
            return Err(unsupported!(
                "the deprecated framed LZ4 codec is not implemented; files should use LZ4_RAW"
            ))
        }
    })
}

#[cfg(feature = "snappy")]
mod snappy {
    use crate::error::{oos, Result};

    pub fn decompress(src: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; uncompressed_size];
        let len = snap::raw::Decoder::new()
            .decompress(src, &mut out)
            .map_err(|e| oos!("snappy decompression failed: {}", e))?;
        out.truncate(len);
        Ok(out)
    }
}

#[cfg(any(feature = "gzip", feature = "gzip_zlib_ng"))]
mod gzip {
    use crate::error::Result;
    use std::io::Read;

    pub fn decompress(src: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(uncompressed_size);
        let mut decoder = flate2::read::MultiGzDecoder::new(src);
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}

#[cfg(feature = "brotli")]
mod brotli_codec {
    use crate::error::Result;
    use std::io::Read;

    const BUFFER_SIZE: usize = 4096;

    pub fn decompress(src: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(uncompressed_size);
        brotli::Decompressor::new(src, BUFFER_SIZE).read_to_end(&mut out)?;
        Ok(out)
    }
}

#[cfg(feature = "zstd")]
mod zstd_codec {
    use crate::error::Result;
    use std::io::Read;

    pub fn decompress(src: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(uncompressed_size);
        zstd::Decoder::new(src)?.read_to_end(&mut out)?;
        Ok(out)
    }
}

#[cfg(feature = "lz4")]
mod lz4_codec {
    use crate::error::{oos, Result};

    pub fn decompress(src: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        lz4_flex::decompress(src, uncompressed_size)
            .map_err(|e| oos!("lz4 decompression failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncompressed_is_a_copy() {
        let data = vec![1, 2, 3, 4];
        let out = decompress(Compression::Uncompressed, &data, data.len()).unwrap();
        assert_eq!(out, data);
    }

    #[cfg(feature = "snappy")]
    #[test]
    fn snappy_roundtrip() {
        let original = b"hello hello hello hello world".repeat(4);
        let compressed = snap::raw::Encoder::new().compress_vec(&original).unwrap();
        let out = decompress(Compression::Snappy, &compressed, original.len()).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn lzo_is_reported_unsupported() {
        assert!(decompress(Compression::Lzo, &[], 0).is_err());
    }
}
