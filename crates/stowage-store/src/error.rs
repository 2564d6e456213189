use std::io;

/// Boxed error from a collaborator (codec, compressor) surfaced through a
/// store operation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested path was not found where it was required to exist.
    ///
    /// The built-in transports report a missing path on read as `Ok(None)`
    /// and never raise this; it is for third-party transports whose
    /// backend signals absence as an error.
    #[error("not found: {0}")]
    NotFound(String),

    /// The path is empty, absolute, or escapes the store root.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// I/O error from the underlying storage backend.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A transient backend failure the caller may retry.
    ///
    /// Raised by third-party transports (throttling, lost connections).
    /// Local I/O failures arrive as [`StoreError::Io`] and are classified
    /// by their [`io::ErrorKind`].
    #[error("transient failure: {0}")]
    Transient(String),

    /// Stored data does not have the shape the store expects.
    #[error("corrupt entry {path:?}: {reason}")]
    Corrupt { path: String, reason: String },

    /// Serialization or deserialization failure from the codec.
    #[error("codec error: {0}")]
    Codec(#[source] BoxError),

    /// Compression or decompression failure.
    #[error("compression error: {0}")]
    Compression(#[source] BoxError),

    /// The value was rejected by the validation hook.
    #[error("validation failed: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    /// An internal lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

impl StoreError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the operation may succeed if retried unchanged.
    ///
    /// The engine never retries; this flag is for the calling application.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transient(_) => true,
            Self::Io { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    /// Whether this error means the path does not exist, including an
    /// entry that vanished under a concurrent delete while being written
    /// or listed.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
