use std::path::PathBuf;

/// Errors from the facet registry and configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum FacetError {
    /// No facets were registered for the contract.
    #[error("contract {contract} is not registered")]
    Unregistered { contract: String },

    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`EngineConfig`](crate::EngineConfig).
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result alias for facet operations.
pub type FacetResult<T> = Result<T, FacetError>;
