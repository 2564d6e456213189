use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use stowage_store::{BlobTransport, BoxError, TableTransport};
use stowage_types::{Literal, TypeError};

/// A problem with one argument handed to a factory.
#[derive(Debug, thiserror::Error)]
pub enum ArgError {
    #[error("argument {0:?} is not bound")]
    Missing(String),

    #[error("argument {parameter:?}: {source}")]
    Kind {
        parameter: String,
        #[source]
        source: TypeError,
    },

    #[error("argument {parameter:?}: {reason}")]
    Invalid { parameter: String, reason: String },
}

impl ArgError {
    pub fn invalid(parameter: &str, reason: impl fmt::Display) -> Self {
        Self::Invalid {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn parameter(&self) -> &str {
        match self {
            Self::Missing(p) => p,
            Self::Kind { parameter, .. } | Self::Invalid { parameter, .. } => parameter,
        }
    }
}

/// Why a factory could not produce its component.
#[derive(Debug, thiserror::Error)]
pub enum ActivateError {
    #[error(transparent)]
    Argument(#[from] ArgError),

    /// The component cannot work with the contract's key or value type.
    #[error("unsupported type {type_name}")]
    Unsupported { type_name: &'static str },

    /// Construction itself failed.
    #[error(transparent)]
    Failed(BoxError),
}

impl ActivateError {
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Failed(Box::new(err))
    }
}

/// Arguments bound for one component: literal values after precedence and
/// defaults have been applied, plus already-activated nested components.
#[derive(Default)]
pub struct BoundArgs {
    values: BTreeMap<String, Literal>,
    blobs: BTreeMap<String, Arc<dyn BlobTransport>>,
    tables: BTreeMap<String, Arc<dyn TableTransport>>,
}

impl BoundArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub(crate) fn insert_value(&mut self, name: &str, value: Literal) {
        self.values.insert(name.to_string(), value);
    }

    pub(crate) fn insert_blob(&mut self, name: &str, transport: Arc<dyn BlobTransport>) {
        self.blobs.insert(name.to_string(), transport);
    }

    pub(crate) fn insert_table(&mut self, name: &str, transport: Arc<dyn TableTransport>) {
        self.tables.insert(name.to_string(), transport);
    }

    pub fn value(&self, name: &str) -> Result<&Literal, ArgError> {
        self.values
            .get(name)
            .ok_or_else(|| ArgError::Missing(name.to_string()))
    }

    /// A string argument. Integers and booleans are rendered as text.
    pub fn str(&self, name: &str) -> Result<String, ArgError> {
        Ok(match self.value(name)? {
            Literal::Str(s) => s.clone(),
            Literal::Int(i) => i.to_string(),
            Literal::Bool(b) => b.to_string(),
        })
    }

    pub fn int(&self, name: &str) -> Result<i64, ArgError> {
        self.value(name)?.to_i64().map_err(|source| ArgError::Kind {
            parameter: name.to_string(),
            source,
        })
    }

    pub fn bool(&self, name: &str) -> Result<bool, ArgError> {
        self.value(name)?.to_bool().map_err(|source| ArgError::Kind {
            parameter: name.to_string(),
            source,
        })
    }

    /// A nested blob transport.
    pub fn blob(&self, name: &str) -> Result<Arc<dyn BlobTransport>, ArgError> {
        self.blobs
            .get(name)
            .cloned()
            .ok_or_else(|| ArgError::Missing(name.to_string()))
    }

    /// A nested table transport.
    pub fn table(&self, name: &str) -> Result<Arc<dyn TableTransport>, ArgError> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| ArgError::Missing(name.to_string()))
    }
}

impl fmt::Debug for BoundArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundArgs")
            .field("values", &self.values)
            .field("blobs", &self.blobs.keys().collect::<Vec<_>>())
            .field("tables", &self.tables.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors_parse_strings() {
        let args = BoundArgs::new()
            .with_value("level", "9")
            .with_value("pretty", true)
            .with_value("root", "/data");
        assert_eq!(args.int("level").unwrap(), 9);
        assert!(args.bool("pretty").unwrap());
        assert_eq!(args.str("root").unwrap(), "/data");
        assert_eq!(args.str("pretty").unwrap(), "true");
    }

    #[test]
    fn errors_name_the_parameter() {
        let args = BoundArgs::new().with_value("level", "high");
        let err = args.int("level").unwrap_err();
        assert_eq!(err.parameter(), "level");
        assert!(matches!(args.blob("transport"), Err(ArgError::Missing(p)) if p == "transport"));
    }
}
