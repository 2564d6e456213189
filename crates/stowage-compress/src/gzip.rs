use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{CompressError, CompressResult};
use crate::traits::Compressor;

/// gzip (DEFLATE) via `flate2`.
#[derive(Clone, Copy, Debug)]
pub struct GzipCompressor {
    level: u32,
}

impl GzipCompressor {
    pub const DEFAULT_LEVEL: i64 = 6;
    const MAX_LEVEL: i64 = 9;

    /// Create a compressor with a level in `0..=9`.
    pub fn new(level: i64) -> CompressResult<Self> {
        if !(0..=Self::MAX_LEVEL).contains(&level) {
            return Err(CompressError::InvalidLevel {
                algorithm: "gzip",
                level,
                min: 0,
                max: Self::MAX_LEVEL,
            });
        }
        Ok(Self {
            level: level as u32,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self {
            level: Self::DEFAULT_LEVEL as u32,
        }
    }
}

impl Compressor for GzipCompressor {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn compress(&self, data: &[u8]) -> CompressResult<Vec<u8>> {
        let fail = |e: std::io::Error| CompressError::CompressionFailed {
            algorithm: "gzip",
            reason: e.to_string(),
        };
        let mut encoder = GzEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(data).map_err(fail)?;
        encoder.finish().map_err(fail)
    }

    fn decompress(&self, data: &[u8]) -> CompressResult<Vec<u8>> {
        let mut out = Vec::new();
        GzDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|e| CompressError::DecompressionFailed {
                algorithm: "gzip",
                reason: e.to_string(),
            })?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_has_gzip_magic() {
        let out = GzipCompressor::default().compress(b"hello").unwrap();
        assert_eq!(&out[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn level_bounds() {
        assert!(GzipCompressor::new(0).is_ok());
        assert_eq!(GzipCompressor::new(9).unwrap().level(), 9);
        assert!(matches!(
            GzipCompressor::new(10).unwrap_err(),
            CompressError::InvalidLevel { algorithm: "gzip", level: 10, .. }
        ));
        assert!(GzipCompressor::new(-1).is_err());
    }

    #[test]
    fn garbage_fails_to_decompress() {
        let err = GzipCompressor::default()
            .decompress(b"definitely not gzip")
            .unwrap_err();
        assert!(matches!(err, CompressError::DecompressionFailed { .. }));
    }
}
