use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("{algorithm} compression failed: {reason}")]
    CompressionFailed {
        algorithm: &'static str,
        reason: String,
    },

    #[error("{algorithm} decompression failed: {reason}")]
    DecompressionFailed {
        algorithm: &'static str,
        reason: String,
    },

    #[error("invalid {algorithm} level {level}: expected {min}..={max}")]
    InvalidLevel {
        algorithm: &'static str,
        level: i64,
        min: i64,
        max: i64,
    },
}

pub type CompressResult<T> = Result<T, CompressError>;
