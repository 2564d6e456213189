use crate::error::CompressResult;

/// Byte-level compression.
///
/// `decompress(compress(x)) == x` for every input.
pub trait Compressor: Send + Sync {
    /// Algorithm name used in errors and logs.
    fn name(&self) -> &'static str;

    fn compress(&self, data: &[u8]) -> CompressResult<Vec<u8>>;

    fn decompress(&self, data: &[u8]) -> CompressResult<Vec<u8>>;
}
