use thiserror::Error;

/// Any error an application sees while using stowage.
#[derive(Debug, Error)]
pub enum StowageError {
    #[error("resolution failed: {0}")]
    Resolve(#[from] stowage_resolver::ResolveError),

    #[error("store operation failed: {0}")]
    Store(#[from] stowage_store::StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] stowage_facet::FacetError),
}

impl StowageError {
    /// Whether retrying the failed call could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StowageError::Store(e) => e.is_retryable(),
            StowageError::Resolve(_) | StowageError::Config(_) => false,
        }
    }
}

pub type StowageResult<T> = Result<T, StowageError>;
