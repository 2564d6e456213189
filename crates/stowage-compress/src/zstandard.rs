use crate::error::{CompressError, CompressResult};
use crate::traits::Compressor;

/// Zstandard via the `zstd` crate.
#[derive(Clone, Copy, Debug)]
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    pub const DEFAULT_LEVEL: i64 = 3;
    const MAX_LEVEL: i64 = 22;

    /// Create a compressor with a level in `1..=22`.
    pub fn new(level: i64) -> CompressResult<Self> {
        if !(1..=Self::MAX_LEVEL).contains(&level) {
            return Err(CompressError::InvalidLevel {
                algorithm: "zstd",
                level,
                min: 1,
                max: Self::MAX_LEVEL,
            });
        }
        Ok(Self {
            level: level as i32,
        })
    }

    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self {
            level: Self::DEFAULT_LEVEL as i32,
        }
    }
}

impl Compressor for ZstdCompressor {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, data: &[u8]) -> CompressResult<Vec<u8>> {
        zstd::encode_all(data, self.level).map_err(|e| CompressError::CompressionFailed {
            algorithm: "zstd",
            reason: e.to_string(),
        })
    }

    fn decompress(&self, data: &[u8]) -> CompressResult<Vec<u8>> {
        zstd::decode_all(data).map_err(|e| CompressError::DecompressionFailed {
            algorithm: "zstd",
            reason: e.to_string(),
        })
    }
}
