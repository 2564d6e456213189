//! Compressor capability for stowage.
//!
//! - [`GzipCompressor`] -- gzip via `flate2`, levels `0..=9`
//! - [`ZstdCompressor`] -- Zstandard, levels `1..=22`

pub mod error;
pub mod gzip;
pub mod traits;
pub mod zstandard;

pub use error::{CompressError, CompressResult};
pub use gzip::GzipCompressor;
pub use traits::Compressor;
pub use zstandard::ZstdCompressor;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn empty_input_roundtrips() {
        let all: Vec<Arc<dyn Compressor>> = vec![
            Arc::new(GzipCompressor::default()),
            Arc::new(ZstdCompressor::default()),
        ];
        for c in all {
            let packed = c.compress(b"").unwrap();
            assert!(c.decompress(&packed).unwrap().is_empty(), "{}", c.name());
        }
    }

    #[test]
    fn formats_are_not_interchangeable() {
        let packed = ZstdCompressor::default().compress(b"payload").unwrap();
        assert!(GzipCompressor::default().decompress(&packed).is_err());
    }
}
